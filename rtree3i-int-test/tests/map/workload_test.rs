use rtree3i::BoundingBox;
use rtree3i_int_test::test_util::{
    create_star_test_context, create_test_context, depth_bound, last_values, random_entries, run_test,
    verify_published, TestContext,
};

fn grow_and_check(ctx: TestContext, count: u32) -> rtree3i::RTreeResult<()> {
    let mut rng = ctx.rng();
    let entries = random_entries(&mut rng, count, 10_000, 50);
    let expected = last_values(&entries);

    let mut map = ctx.map();
    for (i, entry) in entries.iter().enumerate() {
        map = map.put_entry(entry.clone())?;
        if i % 97 == 0 {
            assert!(map.calculate_depth() <= depth_bound(map.size()));
        }
    }

    assert_eq!(map.size(), expected.len());
    assert!(map.calculate_depth() <= depth_bound(map.size()));
    let keys: Vec<BoundingBox> = expected.iter().map(|(key, _)| *key).collect();
    assert_eq!(map.mbb(), BoundingBox::mbb(&keys));

    ctx.shared().update(|_| Ok(map))?;
    Ok(())
}

#[test]
fn test_guttman_workload() {
    run_test(create_test_context, |ctx| grow_and_check(ctx, 5000), verify_published)
}

#[test]
fn test_rstar_workload() {
    run_test(create_star_test_context, |ctx| grow_and_check(ctx, 5000), verify_published)
}

#[test]
fn test_rstar_shrinks_back() {
    run_test(
        create_star_test_context,
        |ctx| {
            let mut rng = ctx.rng();
            let entries = random_entries(&mut rng, 1000, 300, 10);
            let full = ctx.map().put_all(entries.iter().cloned())?;
            let expected = last_values(&entries);

            let kept = full.remove_all(entries.iter().skip(100))?;
            // Values are insertion indices, so only keys last written early survive
            let survivors: Vec<_> = expected.iter().filter(|(_, value)| *value < 100).collect();

            assert_eq!(kept.size(), survivors.len());
            for (key, value) in survivors {
                assert_eq!(kept.get(key), Some(value));
            }

            ctx.shared().update(|_| Ok(kept))?;
            Ok(())
        },
        verify_published,
    )
}
