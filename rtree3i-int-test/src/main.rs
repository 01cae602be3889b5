use rand::rngs::StdRng;
use rand::SeedableRng;
use rtree3i::errors::RTreeResult;
use rtree3i::{query, BoundingBox, Configuration, RTreeMap};
use rtree3i_int_test::test_util::random_box;

fn stress(name: &str, configuration: Configuration, count: u32) -> RTreeResult<()> {
    println!("Starting {} stress test...", name);
    let mut rng = StdRng::seed_from_u64(2024);
    let keys: Vec<BoundingBox> = (0..count).map(|_| random_box(&mut rng, 100_000, 100)).collect();

    let start = std::time::Instant::now();
    let mut map = RTreeMap::create(configuration);
    for (i, key) in keys.iter().enumerate() {
        map = map.put(*key, i as u32)?;
    }
    let elapsed = start.elapsed();
    println!(
        "Inserted {} entries in {:?} (depth {})",
        map.size(),
        elapsed,
        map.calculate_depth()
    );

    let start = std::time::Instant::now();
    let mut found = 0;
    for key in keys.iter().take(100_000) {
        if map.contains_key(key) {
            found += 1;
        }
    }
    println!("Looked up {} keys in {:?}", found, start.elapsed());

    let start = std::time::Instant::now();
    let mut matched = 0;
    for _ in 0..1000 {
        let region = random_box(&mut rng, 100_000, 5_000);
        matched += map.keys_matching(query::intersecting(region)).count();
    }
    println!("Matched {} keys in 1000 region queries in {:?}", matched, start.elapsed());

    let start = std::time::Instant::now();
    let trimmed = keys
        .iter()
        .step_by(2)
        .try_fold(map.clone(), |map, key| map.remove(key))?;
    println!(
        "Removed {} entries in {:?}",
        map.size() - trimmed.size(),
        start.elapsed()
    );

    println!("{} stress test completed.", name);
    Ok(())
}

fn main() -> RTreeResult<()> {
    let count = 1000000;
    stress("guttman", Configuration::default(), count)?;
    stress("rstar", Configuration::builder().star().max_children(16).build()?, count)?;
    Ok(())
}
