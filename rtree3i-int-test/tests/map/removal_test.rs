use rtree3i::{BoundingBox, Entry};
use rtree3i_int_test::test_util::{
    create_narrow_test_context, create_test_context, last_values, random_box, random_entries, run_test,
    verify_published,
};

#[test]
fn test_remove_everything_empties_map() {
    run_test(
        create_test_context,
        |ctx| {
            let mut rng = ctx.rng();
            let entries = random_entries(&mut rng, 500, 200, 5);
            let map = ctx.map().put_all(entries.iter().cloned())?;
            let expected = last_values(&entries);

            let mut current = map;
            for (removed, (key, _)) in expected.iter().enumerate() {
                current = current.remove(key)?;
                assert_eq!(current.size(), expected.len() - removed - 1);
            }

            assert!(current.is_empty());
            assert_eq!(current.mbb(), None);
            assert_eq!(current.calculate_depth(), 0);
            assert_eq!(current.iter().count(), 0);
            Ok(())
        },
        verify_published,
    )
}

#[test]
fn test_removing_twice_is_idempotent() {
    run_test(
        create_test_context,
        |ctx| {
            let mut rng = ctx.rng();
            let entries = random_entries(&mut rng, 100, 100, 3);
            let map = ctx.map().put_all(entries.iter().cloned())?;

            for (key, _) in last_values(&entries).iter().take(20) {
                let once = map.remove(key)?;
                let twice = once.remove(key)?;
                assert!(twice.ptr_eq(&once));
                assert_eq!(once.size(), map.size() - 1);
            }

            let stranger = BoundingBox::create(10_000, 10_000, 10_000, 10_001, 10_001, 10_001)?;
            assert!(map.remove(&stranger)?.ptr_eq(&map));

            ctx.shared().update(|_| Ok(map))?;
            Ok(())
        },
        verify_published,
    )
}

#[test]
fn test_remove_exact_requires_matching_value() {
    run_test(
        create_test_context,
        |ctx| {
            let key = BoundingBox::create(1, 1, 1, 4, 4, 4)?;
            let map = ctx.map().put(key, 7)?;

            let same = map.remove_exact(&key, &8)?;
            assert!(same.ptr_eq(&map));
            assert!(same.contains(&Entry::new(key, 7)));

            let gone = map.remove_exact(&key, &7)?;
            assert!(gone.is_empty());
            Ok(())
        },
        verify_published,
    )
}

#[test]
fn test_interleaved_puts_and_removes() {
    run_test(
        create_narrow_test_context,
        |ctx| {
            let mut rng = ctx.rng();
            let mut map = ctx.map();
            let mut expected: Vec<(BoundingBox, u32)> = Vec::new();

            for round in 0..2000u32 {
                if round % 3 == 2 && !expected.is_empty() {
                    let (key, _) = expected.remove((round as usize * 7) % expected.len());
                    map = map.remove(&key)?;
                } else {
                    let key = random_box(&mut rng, 50, 4);
                    map = map.put(key, round)?;
                    match expected.iter_mut().find(|(k, _)| *k == key) {
                        Some(existing) => existing.1 = round,
                        None => expected.push((key, round)),
                    }
                }
                assert_eq!(map.size(), expected.len());
            }

            for (key, value) in &expected {
                assert_eq!(map.get(key), Some(value));
            }
            ctx.shared().update(|_| Ok(map))?;
            Ok(())
        },
        verify_published,
    )
}
