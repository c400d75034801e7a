use interval_tree::{
    AvlIntervalTree, Contains, FlatIntervalTree, FnPredicate, IntervalTreeAlgorithms,
    IntervalTreeConfig, IntervalTreeError, Span, SpanIntrospector, SpanPredicate,
    StackPoolConfig,
};

fn spans() -> Vec<Span> {
    (0..100).map(|i| Span::new(i * 3, 5)).collect()
}

#[test]
fn iteration_is_sorted_on_both_trees() {
    let mut input = spans();
    input.reverse();
    let avl = AvlIntervalTree::create(SpanIntrospector, input.iter().copied());
    let flat = FlatIntervalTree::create(SpanIntrospector, input);
    let from_avl: Vec<_> = avl.iter().copied().collect();
    let from_flat: Vec<_> = (&flat).into_iter().copied().collect();
    assert_eq!(from_avl, spans());
    assert_eq!(from_flat, spans());
}

#[test]
fn fill_methods_append_and_count() {
    let tree = FlatIntervalTree::create_from_sorted(SpanIntrospector, spans());
    let mut out = Vec::new();
    assert_eq!(tree.fill_intersecting(10, 0, &mut out), 2);
    assert_eq!(tree.fill_containing(10, 0, &mut out), 2);
    assert_eq!(tree.fill_overlapping(10, 1, &mut out), 2);
    assert_eq!(out.len(), 6);
    assert_eq!(out[0], &Span::new(6, 5));
    assert_eq!(out[1], &Span::new(9, 5));
}

#[test]
fn custom_predicate_is_pruned_by_intersection() {
    let tree = AvlIntervalTree::create(SpanIntrospector, spans());
    let starts_even = FnPredicate::new(|candidate: Span, query: Span| {
        candidate.start % 2 == 0 && Contains.test(candidate, query)
    });
    let mut out = Vec::new();
    let count = tree.fill_matches(12, 1, starts_even, &mut out);
    assert_eq!(count, 1);
    assert_eq!(out, vec![&Span::new(12, 5)]);
}

#[test]
fn configured_trees_answer_queries() {
    let config = IntervalTreeConfig::new(
        128,
        StackPoolConfig::builder()
            .max_pooled_stacks(1)
            .stack_capacity(8)
            .build(),
    );
    assert!(config.validate().is_ok());
    let mut avl: AvlIntervalTree<Span, SpanIntrospector> =
        AvlIntervalTree::with_config(SpanIntrospector, config).unwrap();
    avl.extend(spans());
    assert_eq!(avl.len(), 100);
    assert_eq!(avl.get_intersecting(0, 0).len(), 1);
    let flat = avl.freeze();
    assert_eq!(flat.get_intersecting(0, 0).len(), 1);
    let unsorted =
        FlatIntervalTree::create_from_unsorted_with_config(SpanIntrospector, spans(), config)
            .unwrap();
    assert_eq!(unsorted.len(), 100);
}

#[test]
fn invalid_config_is_rejected() {
    let config = IntervalTreeConfig::new(0, StackPoolConfig::builder().max_pooled_stacks(0).build());
    assert!(matches!(
        config.validate(),
        Err(IntervalTreeError::InvalidConfig(_))
    ));
    let avl: Result<AvlIntervalTree<Span, SpanIntrospector>, _> =
        AvlIntervalTree::with_config(SpanIntrospector, config);
    assert!(matches!(avl, Err(IntervalTreeError::InvalidConfig(_))));
    assert!(matches!(
        FlatIntervalTree::create_from_sorted_with_config(SpanIntrospector, spans(), config),
        Err(IntervalTreeError::InvalidConfig(_))
    ));
}

#[test]
fn checked_constructor_rejects_unsorted_input() {
    let err = FlatIntervalTree::try_create_from_sorted(
        SpanIntrospector,
        [Span::new(4, 1), Span::new(2, 1)],
    )
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "values are not sorted by start: value at index 1 starts at 2, before its predecessor at 4"
    );
}
