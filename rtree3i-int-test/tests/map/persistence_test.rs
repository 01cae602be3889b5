use rtree3i::{BoundingBox, Configuration, Entry, RTreeMap};
use rtree3i_int_test::test_util::{
    create_test_context, last_values, random_entries, run_test, verify_published,
};

#[test]
fn test_old_versions_survive_updates() {
    run_test(
        create_test_context,
        |ctx| {
            let mut rng = ctx.rng();
            let entries = random_entries(&mut rng, 300, 1000, 20);

            // Keep every intermediate version around
            let mut versions = vec![ctx.map()];
            for entry in &entries {
                let next = versions[versions.len() - 1].put_entry(entry.clone())?;
                versions.push(next);
            }

            for (i, version) in versions.iter().enumerate() {
                let expected = last_values(&entries[..i]);
                assert_eq!(version.size(), expected.len());
                for (key, value) in &expected {
                    assert_eq!(version.get(key), Some(value));
                }
            }

            let last = versions[versions.len() - 1].clone();
            ctx.shared().update(|_| Ok(last))?;
            Ok(())
        },
        verify_published,
    )
}

#[test]
fn test_removal_leaves_source_version_intact() {
    run_test(
        create_test_context,
        |ctx| {
            let mut rng = ctx.rng();
            let entries = random_entries(&mut rng, 200, 500, 10);
            let full = ctx.map().put_all(entries.iter().cloned())?;
            let expected = last_values(&entries);

            let half = expected
                .iter()
                .step_by(2)
                .try_fold(full.clone(), |map, (key, _)| map.remove(key))?;

            assert_eq!(full.size(), expected.len());
            assert_eq!(half.size(), expected.len() - expected.iter().step_by(2).count());
            for (i, (key, value)) in expected.iter().enumerate() {
                assert_eq!(full.get(key), Some(value));
                if i % 2 == 0 {
                    assert!(!half.contains_key(key));
                } else {
                    assert_eq!(half.get(key), Some(value));
                }
            }

            ctx.shared().update(|_| Ok(half))?;
            Ok(())
        },
        verify_published,
    )
}

#[test]
fn test_derived_keys_share_boxes() {
    // Block positions rounded down to 16-wide sections
    let map = RTreeMap::create_with(Configuration::default(), |pos: &(i32, i32, i32)| {
        let (x, y, z) = (pos.0 >> 4 << 4, pos.1 >> 4 << 4, pos.2 >> 4 << 4);
        BoundingBox::spanning([x, y, z], [x + 15, y + 15, z + 15])
    });

    let positions: Vec<(i32, i32, i32)> = (0..64).map(|i| (i * 3, i % 7, -i)).collect();
    let map = map
        .put_all(positions.iter().map(|pos| Entry::new(*pos, pos.0 + pos.1 + pos.2)))
        .unwrap();

    assert_eq!(map.size(), positions.len());
    for pos in &positions {
        assert_eq!(map.get(pos), Some(&(pos.0 + pos.1 + pos.2)));
    }

    let trimmed = positions
        .iter()
        .take(32)
        .try_fold(map.clone(), |map, pos| map.remove(pos))
        .unwrap();
    assert_eq!(trimmed.size(), 32);
    assert!(positions[..32].iter().all(|pos| !trimmed.contains_key(pos)));
    assert!(positions[32..].iter().all(|pos| trimmed.contains_key(pos)));
    assert_eq!(map.size(), 64);
}
