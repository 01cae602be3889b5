use rand::rngs::StdRng;
use rand::SeedableRng;
use rtree3i::{BoundingBox, Groups, QuadraticSplitter, RStarSplitter, RTreeError, Splitter};
use rtree3i_int_test::test_util::random_box;

/// Checks that `groups` is a partition of `0..boxes.len()` whose group
/// boxes are exactly the bounds of their members.
fn assert_partition(boxes: &[BoundingBox], groups: &Groups<usize>) {
    let mut seen = vec![false; boxes.len()];
    for group in [groups.first(), groups.second()] {
        assert!(!group.is_empty());
        let members: Vec<BoundingBox> = group.items().iter().map(|&i| boxes[i]).collect();
        assert_eq!(Some(*group.mbb()), BoundingBox::mbb(&members));
        for &index in group.items() {
            assert!(!seen[index], "index {} used twice", index);
            seen[index] = true;
        }
    }
    assert!(seen.iter().all(|&used| used));
}

#[test]
fn test_splitters_partition_random_boxes() {
    let mut rng = StdRng::seed_from_u64(99);
    let splitters: [(&dyn Splitter, &str); 2] = [(&QuadraticSplitter, "quadratic"), (&RStarSplitter, "rstar")];

    for len in 2..=17 {
        let boxes: Vec<BoundingBox> = (0..len).map(|_| random_box(&mut rng, 100, 30)).collect();
        let min_size = (len / 3).max(1);
        for (splitter, name) in splitters {
            let groups = splitter.split(&boxes, min_size).unwrap();
            assert_partition(&boxes, &groups);
            let smaller = groups.first().len().min(groups.second().len());
            assert!(smaller >= min_size.min(len / 2), "{} split {} boxes unevenly", name, len);
        }
    }
}

#[test]
fn test_quadratic_split_keeps_half() {
    let boxes: Vec<BoundingBox> = (0..9).map(|i| BoundingBox::point(i * i, 0, 0)).collect();
    let groups = QuadraticSplitter.split(&boxes, 1).unwrap();
    assert_partition(&boxes, &groups);
    assert!(groups.first().len() >= 4);
    assert!(groups.second().len() >= 4);
}

#[test]
fn test_rstar_split_separates_clusters() {
    let mut boxes = Vec::new();
    for i in 0..4 {
        boxes.push(BoundingBox::create(i, 0, 0, i + 1, 1, 1).unwrap());
        boxes.push(BoundingBox::create(100 + i, 0, 0, 101 + i, 1, 1).unwrap());
    }
    let groups = RStarSplitter.split(&boxes, 2).unwrap();
    assert_partition(&boxes, &groups);
    assert_eq!(groups.intersection_volume(), 0);
    assert_eq!(groups.first().len(), 4);
    assert_eq!(groups.second().len(), 4);
}

#[test]
fn test_too_few_boxes_cannot_split() {
    let one = [BoundingBox::point(0, 0, 0)];
    for splitter in [&QuadraticSplitter as &dyn Splitter, &RStarSplitter] {
        assert!(matches!(splitter.split(&one, 1), Err(RTreeError::InvalidSplit(_))));
        assert!(matches!(splitter.split(&[], 1), Err(RTreeError::InvalidSplit(_))));
    }
}
