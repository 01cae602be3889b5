use rtree3i::{query, BoundingBox, Entry, RTreeMap};
use rtree3i_int_test::test_util::{
    create_star_test_context, create_test_context, last_values, random_box, random_entries, run_test,
    verify_published, TestContext,
};

fn sorted(mut values: Vec<u32>) -> Vec<u32> {
    values.sort_unstable();
    values
}

fn populate(ctx: &TestContext) -> rtree3i::RTreeResult<(RTreeMap<BoundingBox, u32>, Vec<(BoundingBox, u32)>)> {
    let mut rng = ctx.rng();
    let entries = random_entries(&mut rng, 2000, 1000, 40);
    let map = ctx.map().put_all(entries.iter().cloned())?;
    ctx.shared().update(|_| Ok(map.clone()))?;
    Ok((map, last_values(&entries)))
}

fn brute_force<P>(expected: &[(BoundingBox, u32)], accept: P) -> Vec<u32>
where
    P: Fn(&BoundingBox) -> bool,
{
    sorted(expected.iter().filter(|(key, _)| accept(key)).map(|(_, v)| *v).collect())
}

fn check_pruning_is_sound(ctx: TestContext) -> rtree3i::RTreeResult<()> {
    let (map, expected) = populate(&ctx)?;
    let mut rng = ctx.rng();

    for _ in 0..50 {
        let region = random_box(&mut rng, 1000, 300);

        let found = sorted(map.values_matching(query::intersecting(region)).iter().copied().collect());
        assert_eq!(found, brute_force(&expected, |b| b.intersects_closed(&region)));

        let found = sorted(map.values_matching(query::touching(region)).iter().copied().collect());
        assert_eq!(found, brute_force(&expected, |b| b.intersects_open(&region)));

        let found = sorted(map.entries_within(region).iter().map(|e| *e.value()).collect());
        assert_eq!(found, brute_force(&expected, |b| region.contains(b)));
    }

    let probe = BoundingBox::point(0, 0, 0);
    let found = sorted(map.values_matching(query::containing(probe)).iter().copied().collect());
    assert_eq!(found, brute_force(&expected, |b| b.contains(&probe)));
    Ok(())
}

#[test]
fn test_guttman_pruning_is_sound() {
    run_test(create_test_context, check_pruning_is_sound, verify_published)
}

#[test]
fn test_rstar_pruning_is_sound() {
    run_test(create_star_test_context, check_pruning_is_sound, verify_published)
}

#[test]
fn test_terminal_operations_agree() {
    run_test(
        create_test_context,
        |ctx| {
            let (map, expected) = populate(&ctx)?;
            let region = BoundingBox::create(-500, -500, -500, 500, 500, 500)?;
            let selection = map.values_matching(query::intersecting(region));
            let reference = brute_force(&expected, |b| b.intersects_closed(&region));

            assert_eq!(selection.count(), reference.len());
            assert_eq!(selection.is_empty(), reference.is_empty());
            assert_eq!(selection.is_not_empty(), !reference.is_empty());

            let total: u64 = reference.iter().map(|v| *v as u64).sum();
            assert_eq!(selection.fold(0u64, |acc, v| acc + *v as u64), total);

            let largest = selection.reduce(&0, |a, b| if a >= b { a } else { b });
            assert_eq!(Some(largest), reference.iter().max().or(Some(&0)));

            let mut visited = Vec::new();
            selection.for_each(|v| visited.push(*v));
            assert_eq!(sorted(visited), reference);

            let collected = selection.collect_with(Vec::new, |acc: &mut Vec<u32>, v| acc.push(*v));
            assert_eq!(sorted(collected), reference);
            Ok(())
        },
        verify_published,
    )
}

#[test]
fn test_filters_compose() {
    run_test(
        create_test_context,
        |ctx| {
            let (map, expected) = populate(&ctx)?;
            let region = BoundingBox::create(0, 0, 0, 1000, 1000, 1000)?;

            let even_small = map
                .values_matching(query::touching(region))
                .filter(|v| **v % 2 == 0)
                .filter(|v| **v < 1000);
            let reference: Vec<u32> = brute_force(&expected, |b| b.intersects_open(&region))
                .into_iter()
                .filter(|v| v % 2 == 0 && *v < 1000)
                .collect();

            assert_eq!(sorted(even_small.iter().copied().collect()), reference);
            assert!(!even_small.any_match(|v| **v >= 1000));
            assert!(even_small.all_match(|v| **v % 2 == 0));
            assert!(even_small.none_match(|v| **v % 2 == 1));
            Ok(())
        },
        verify_published,
    )
}

#[test]
fn test_empty_selection_matches() {
    let map: RTreeMap<BoundingBox, u32> = RTreeMap::create(Default::default());
    let selection = map.entries();

    assert!(selection.is_empty());
    assert_eq!(selection.count(), 0);
    assert!(selection.all_match(|_| false));
    assert!(selection.none_match(|_| true));
    assert!(!selection.any_match(|_| true));

    let map = map.put(BoundingBox::point(1, 1, 1), 1).unwrap();
    let far = BoundingBox::create(100, 100, 100, 200, 200, 200).unwrap();
    let missed = map.entries_matching(query::touching(far));
    assert!(missed.is_empty());
    assert!(missed.all_match(|e: &&Entry<BoundingBox, u32>| *e.value() > 10));
}
