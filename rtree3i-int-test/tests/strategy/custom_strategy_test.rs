use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rtree3i::{
    BoundingBox, Configuration, Entry, Group, Groups, QuadraticSplitter, RTreeError, RTreeMap, RTreeResult, Selector,
    Splitter,
};
use rtree3i_int_test::test_util::{last_values, random_entries, run_test, verify_published, TestContext};

/// Always descends into the last child and counts how often it was asked.
#[derive(Debug, Default)]
struct LastSelector {
    calls: AtomicUsize,
}

impl Selector for LastSelector {
    fn select(&self, _target: &BoundingBox, candidates: &[BoundingBox], _leaves: bool) -> usize {
        self.calls.fetch_add(1, Ordering::Relaxed);
        candidates.len() - 1
    }
}

/// Splits by position, first half against second half.
#[derive(Debug)]
struct HalvingSplitter;

impl Splitter for HalvingSplitter {
    fn split(&self, boxes: &[BoundingBox], _min_size: usize) -> RTreeResult<Groups<usize>> {
        let middle = boxes.len() / 2;
        let first = Group::of((0..middle).collect(), |&i| boxes[i]);
        let second = Group::of((middle..boxes.len()).collect(), |&i| boxes[i]);
        match (first, second) {
            (Some(first), Some(second)) => Ok(Groups::new(first, second)),
            _ => Err(RTreeError::InvalidSplit("not enough boxes".into())),
        }
    }
}

/// Loses the last box of every split.
#[derive(Debug)]
struct LossySplitter;

impl Splitter for LossySplitter {
    fn split(&self, boxes: &[BoundingBox], min_size: usize) -> RTreeResult<Groups<usize>> {
        let groups = QuadraticSplitter.split(boxes, min_size)?;
        let last = boxes.len() - 1;
        let (first, second) = groups.into_groups();
        let keep = |group: Group<usize>| {
            let items: Vec<usize> = group.into_items().into_iter().filter(|&i| i != last).collect();
            Group::of(items, |&i| boxes[i])
        };
        match (keep(first), keep(second)) {
            (Some(first), Some(second)) => Ok(Groups::new(first, second)),
            _ => Err(RTreeError::InvalidSplit("group emptied".into())),
        }
    }
}

fn create_custom_test_context() -> RTreeResult<TestContext> {
    let configuration = Configuration::new(2, 5, Arc::new(LastSelector::default()), Arc::new(HalvingSplitter))?;
    Ok(TestContext::new(5, configuration))
}

#[test]
fn test_custom_strategies_keep_map_correct() {
    run_test(
        create_custom_test_context,
        |ctx| {
            let mut rng = ctx.rng();
            let entries = random_entries(&mut rng, 400, 500, 10);
            let map = ctx.map().put_all(entries.iter().cloned())?;

            let expected = last_values(&entries);
            assert_eq!(map.size(), expected.len());
            for (key, value) in &expected {
                assert_eq!(map.get(key), Some(value));
            }
            assert!(map.calculate_depth() > 1);

            ctx.shared().update(|_| Ok(map))?;
            Ok(())
        },
        verify_published,
    )
}

#[test]
fn test_selector_is_consulted() {
    let selector = Arc::new(LastSelector::default());
    let configuration = Configuration::new(1, 3, selector.clone(), Arc::new(HalvingSplitter)).unwrap();
    let boxes: Vec<BoundingBox> = (0..50).map(|i| BoundingBox::point(i * 10, 0, 0)).collect();

    let map = RTreeMap::create(configuration)
        .put_all(boxes.iter().map(|b| Entry::new(*b, ())))
        .unwrap();

    assert_eq!(map.size(), 50);
    assert!(selector.calls.load(Ordering::Relaxed) > 0);
}

#[test]
fn test_lossy_splitter_is_reported() {
    let configuration = Configuration::new(1, 3, Arc::new(LastSelector::default()), Arc::new(LossySplitter)).unwrap();
    let map = RTreeMap::create(configuration);
    let result = (0..10).try_fold(map, |map, i| map.put(BoundingBox::point(i, i, i), i));
    assert!(matches!(result, Err(RTreeError::InvalidSplit(_))));
}
