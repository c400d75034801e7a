use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing_test::traced_test;

use super::*;
use crate::{
    algorithms::IntervalTreeAlgorithms,
    config::StackPoolConfig,
    predicate::{Contains, Intersects, Overlaps, SpanPredicate},
    span::{Span, SpanIntrospector},
};

type SpanTree = FlatIntervalTree<Span, SpanIntrospector>;

fn random_spans(rng: &mut StdRng, count: usize) -> Vec<Span> {
    std::iter::repeat_with(|| Span::new(rng.gen_range(0..1000), rng.gen_range(0..30)))
        .take(count)
        .collect()
}

impl<T, I: IntervalIntrospector<T>> FlatIntervalTree<T, I> {
    fn check_max(&self) {
        for slot in 0..self.slots.len() {
            let mut expect = self.introspector.end(&self.slots[slot].value);
            for child in [left_child(slot), right_child(slot)] {
                if let Some(c) = self.slots.get(child) {
                    expect = expect.max(self.introspector.end(&self.slots[c.max_end_index].value));
                }
            }
            let max_end_index = self.slots[slot].max_end_index;
            assert_eq!(self.introspector.end(&self.slots[max_end_index].value), expect);
        }
    }

    /// An in-order walk of the slots visits every value, ascending by start.
    fn check_sorted(&self) {
        let starts: Vec<_> = self.iter().map(|v| self.introspector.start(v)).collect();
        assert_eq!(starts.len(), self.len());
        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
    }
}

#[test]
fn layout_is_complete_for_every_size() {
    for n in 0..200 {
        let tree = SpanTree::create_from_sorted(SpanIntrospector, (0..n).map(|s| Span::new(s, 1)));
        assert_eq!(tree.len(), n);
        assert_eq!(tree.height(), if n == 0 { 0 } else { n.ilog2() as usize + 1 });
        tree.check_sorted();
        tree.check_max();
    }
}

#[test]
fn layout_of_six_values() {
    let tree = SpanTree::create_from_sorted(SpanIntrospector, (0..6).map(|s| Span::new(s, 1)));
    let starts: Vec<_> = tree.slots.iter().map(|s| s.value.start).collect();
    assert_eq!(starts, vec![3, 1, 5, 0, 2, 4]);
}

#[test]
fn complete_left_len_matches_shape() {
    assert_eq!(complete_left_len(0), 0);
    assert_eq!(complete_left_len(1), 0);
    assert_eq!(complete_left_len(2), 1);
    assert_eq!(complete_left_len(3), 1);
    assert_eq!(complete_left_len(4), 2);
    assert_eq!(complete_left_len(5), 3);
    assert_eq!(complete_left_len(6), 3);
    assert_eq!(complete_left_len(7), 3);
    assert_eq!(complete_left_len(11), 7);
    assert_eq!(complete_left_len(12), 7);
}

#[test]
fn max_end_ties_prefer_the_slot_itself() {
    let tree = SpanTree::create_from_sorted(
        SpanIntrospector,
        [
            Span::from_bounds(0, 10),
            Span::from_bounds(5, 10),
            Span::from_bounds(7, 10),
        ],
    );
    assert_eq!(tree.slots[0].value, Span::from_bounds(5, 10));
    assert_eq!(tree.slots[0].max_end_index, 0);
}

#[test]
fn max_end_ties_prefer_left_subtree() {
    let tree = SpanTree::create_from_sorted(
        SpanIntrospector,
        [
            Span::from_bounds(0, 10),
            Span::from_bounds(1, 2),
            Span::from_bounds(5, 10),
        ],
    );
    assert_eq!(tree.slots[0].value, Span::from_bounds(1, 2));
    assert_eq!(tree.slots[1].value, Span::from_bounds(0, 10));
    assert_eq!(tree.slots[0].max_end_index, 1);
}

#[test]
fn slots_are_allocated_once() {
    for n in [1_usize, 3, 1000, 10_000] {
        let values: Vec<_> = (0..n).map(|s| Span::new(s, 1)).collect();
        let slots = build_complete_tree(&SpanIntrospector, values);
        assert_eq!(slots.len(), n);
        assert_eq!(slots.capacity(), n, "slot array of {n} values was resized");
    }
}

#[test]
fn create_from_unsorted_sorts_first() {
    let mut rng = StdRng::from_seed([3; 32]);
    let mut spans = random_spans(&mut rng, 500);
    let tree = SpanTree::create_from_unsorted(SpanIntrospector, spans.iter().copied());
    tree.check_sorted();
    tree.check_max();
    spans.sort_unstable();
    let mut result: Vec<_> = tree.iter().copied().collect();
    result.sort_unstable();
    assert_eq!(result, spans);
}

#[test]
fn try_create_reports_first_unsorted_value() {
    let result = SpanTree::try_create_from_sorted(
        SpanIntrospector,
        [Span::new(1, 1), Span::new(5, 1), Span::new(3, 1)],
    );
    assert_eq!(
        result.unwrap_err(),
        IntervalTreeError::Unsorted {
            index: 2,
            start: 3,
            previous_start: 5
        }
    );
    let tree = SpanTree::try_create_from_sorted(
        SpanIntrospector,
        [Span::new(1, 1), Span::new(1, 4), Span::new(3, 1)],
    )
    .unwrap();
    assert_eq!(tree.len(), 3);
}

#[test]
fn config_constructors_validate_config() {
    let invalid = IntervalTreeConfig::new(0, StackPoolConfig::builder().max_pooled_stacks(0).build());
    let values = || [Span::new(1, 1), Span::new(2, 1)];
    assert!(matches!(
        SpanTree::create_from_sorted_with_config(SpanIntrospector, values(), invalid),
        Err(IntervalTreeError::InvalidConfig(_))
    ));
    assert!(matches!(
        SpanTree::create_from_unsorted_with_config(SpanIntrospector, values(), invalid),
        Err(IntervalTreeError::InvalidConfig(_))
    ));
    assert!(matches!(
        SpanTree::try_create_from_sorted_with_config(SpanIntrospector, values(), invalid),
        Err(IntervalTreeError::InvalidConfig(_))
    ));

    let valid = IntervalTreeConfig::new(0, StackPoolConfig::builder().max_pooled_stacks(1).build());
    let tree =
        SpanTree::try_create_from_sorted_with_config(SpanIntrospector, values(), valid).unwrap();
    assert_eq!(tree.len(), 2);
    assert!(tree.has_intersecting_position(3));
    assert_eq!(tree.stacks.pooled(), 1);
    let err = SpanTree::try_create_from_sorted_with_config(
        SpanIntrospector,
        [Span::new(2, 1), Span::new(1, 1)],
        valid,
    )
    .unwrap_err();
    assert_eq!(
        err,
        IntervalTreeError::Unsorted {
            index: 1,
            start: 1,
            previous_start: 2
        }
    );
}

#[cfg(debug_assertions)]
#[test]
#[should_panic(expected = "values must be sorted by start")]
fn unsorted_input_is_caught_in_debug_builds() {
    let _tree = SpanTree::create_from_sorted(SpanIntrospector, [Span::new(9, 1), Span::new(1, 1)]);
}

#[test]
fn empty_tree_answers_every_query() {
    let tree = SpanTree::default();
    assert!(tree.is_empty());
    assert_eq!(tree.height(), 0);
    assert_eq!(tree.iter().count(), 0);
    assert!(!tree.has_intersecting(0, 100));
    assert!(!tree.has_containing(0, 0));
    assert!(tree.get_overlapping(0, 100).is_empty());
    let built = SpanTree::create(SpanIntrospector, Vec::new());
    assert!(built.is_empty());
}

fn check_query<P: SpanPredicate>(spans: &[Span], query: Span, predicate: &P, result: Vec<&Span>) {
    assert!(result.windows(2).all(|w| w[0].start <= w[1].start));
    let mut expect: Vec<_> = spans.iter().filter(|s| predicate.test(**s, query)).collect();
    let mut result = result;
    expect.sort_unstable();
    result.sort_unstable();
    assert_eq!(expect, result);
}

#[test]
fn find_all_matches_is_ok() {
    for seed in [[0; 32], [1; 32], [2; 32]] {
        let mut rng = StdRng::from_seed(seed);
        let spans = random_spans(&mut rng, 1000);
        let tree = SpanTree::create(SpanIntrospector, spans.iter().copied());
        for _ in 0..500 {
            let q = Span::new(rng.gen_range(0..1030), rng.gen_range(0..20));
            check_query(&spans, q, &Intersects, tree.get_intersecting(q.start, q.length));
            check_query(&spans, q, &Overlaps, tree.get_overlapping(q.start, q.length));
            check_query(&spans, q, &Contains, tree.get_containing(q.start, q.length));
            assert_eq!(
                tree.has_intersecting(q.start, q.length),
                spans.iter().any(|s| Intersects.test(*s, q))
            );
        }
    }
}

#[test]
fn shared_readers_query_concurrently() {
    let mut rng = StdRng::from_seed([4; 32]);
    let spans = random_spans(&mut rng, 1000);
    let tree = SpanTree::create(SpanIntrospector, spans.iter().copied());
    let expect = tree.get_intersecting(100, 50).len();
    std::thread::scope(|s| {
        for _ in 0..4 {
            let _handle = s.spawn(|| {
                for _ in 0..100 {
                    assert_eq!(tree.get_intersecting(100, 50).len(), expect);
                }
            });
        }
    });
}

#[traced_test]
#[test]
fn build_logs_size_and_height() {
    let tree = SpanTree::create_from_sorted(SpanIntrospector, (0..7).map(|s| Span::new(s, 2)));
    assert_eq!(tree.height(), 3);
    assert!(logs_contain("built flat interval tree of 7 values, height 3"));
}
