use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rtree3i::errors::RTreeResult;
use rtree3i::{BoundingBox, Configuration, Entry, RTreeMap, SharedRTreeMap};
use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

/// Runs a test between a `before` step that builds the context and an
/// `after` step that verifies whatever the test published into it.
/// Failures and panics are reported with a banner before the test panics.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> RTreeResult<()>,
    B: Fn() -> RTreeResult<TestContext>,
    A: Fn(TestContext) -> RTreeResult<()>,
{
    let start_time = Instant::now();

    let result = std::panic::catch_unwind(AssertUnwindSafe(|| {
        let backtrace = Backtrace::capture();
        match before() {
            Ok(ctx) => match test(ctx.clone()) {
                Ok(_) => match after(ctx) {
                    Ok(_) => Ok(()),
                    Err(e) => Err((format!("After run failed: {:?}", e), backtrace.to_string())),
                },
                Err(e) => Err((format!("Test failed: {:?}", e), backtrace.to_string())),
            },
            Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
        }
    }));

    let elapsed = start_time.elapsed();

    let (error, backtrace) = match result {
        Ok(Ok(_)) => return,
        Ok(Err((e, bt))) => (e, bt),
        Err(panic_err) => {
            let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_err.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            (format!("Panic: {}", err_msg), Backtrace::capture().to_string())
        }
    };

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {:?}", elapsed);
    eprintln!("Error: {}", error);
    if !backtrace.is_empty() && !backtrace.contains("disabled") {
        eprintln!("\nBacktrace:\n{}", backtrace);
    }
    eprintln!("=====================================================\n");

    panic!("Test failed: {}", error);
}

/// A published map plus the seed its test draws random data from.
#[derive(Clone)]
pub struct TestContext {
    seed: u64,
    shared: Arc<SharedRTreeMap<BoundingBox, u32>>,
}

impl TestContext {
    pub fn new(seed: u64, configuration: Configuration) -> Self {
        Self {
            seed,
            shared: Arc::new(SharedRTreeMap::new(RTreeMap::create(configuration))),
        }
    }

    pub fn shared(&self) -> Arc<SharedRTreeMap<BoundingBox, u32>> {
        self.shared.clone()
    }

    pub fn map(&self) -> RTreeMap<BoundingBox, u32> {
        self.shared.snapshot()
    }

    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.seed)
    }
}

pub fn create_test_context() -> RTreeResult<TestContext> {
    Ok(TestContext::new(42, Configuration::default()))
}

pub fn create_star_test_context() -> RTreeResult<TestContext> {
    let configuration = Configuration::builder().star().max_children(8).build()?;
    Ok(TestContext::new(7, configuration))
}

pub fn create_narrow_test_context() -> RTreeResult<TestContext> {
    let configuration = Configuration::builder().min_children(1).max_children(3).build()?;
    Ok(TestContext::new(1234, configuration))
}

/// Checks the published map through its public surface: every entry is
/// reachable by key, sizes agree and the cached box covers exactly the keys.
pub fn verify_published(ctx: TestContext) -> RTreeResult<()> {
    let map = ctx.map();
    let entries: Vec<&Entry<BoundingBox, u32>> = map.iter().collect();
    assert_eq!(entries.len(), map.size());
    assert_eq!(map.is_empty(), entries.is_empty());
    for entry in &entries {
        assert_eq!(map.get(entry.key()), Some(entry.value()));
    }
    let keys: Vec<BoundingBox> = entries.iter().map(|e| *e.key()).collect();
    assert_eq!(map.mbb(), BoundingBox::mbb(&keys));
    Ok(())
}

pub fn no_verification(_ctx: TestContext) -> RTreeResult<()> {
    Ok(())
}

/// Largest depth a tree built only by insertion may reach when every split
/// leaves at least two children on each side.
pub fn depth_bound(size: usize) -> usize {
    if size <= 1 {
        return 1;
    }
    1 + (usize::BITS - (size - 1).leading_zeros()) as usize
}

pub fn random_box(rng: &mut StdRng, extent: i32, max_side: i32) -> BoundingBox {
    let x = rng.random_range(-extent..extent);
    let y = rng.random_range(-extent..extent);
    let z = rng.random_range(-extent..extent);
    BoundingBox::spanning(
        [x, y, z],
        [
            x + rng.random_range(0..=max_side),
            y + rng.random_range(0..=max_side),
            z + rng.random_range(0..=max_side),
        ],
    )
}

pub fn random_entries(rng: &mut StdRng, count: u32, extent: i32, max_side: i32) -> Vec<Entry<BoundingBox, u32>> {
    (0..count)
        .map(|i| Entry::new(random_box(rng, extent, max_side), i))
        .collect()
}

/// Keeps only the last value put for each box, the way the map does.
pub fn last_values(entries: &[Entry<BoundingBox, u32>]) -> Vec<(BoundingBox, u32)> {
    let mut result: Vec<(BoundingBox, u32)> = Vec::new();
    for entry in entries {
        match result.iter_mut().find(|(key, _)| key == entry.key()) {
            Some(existing) => existing.1 = *entry.value(),
            None => result.push((*entry.key(), *entry.value())),
        }
    }
    result
}
