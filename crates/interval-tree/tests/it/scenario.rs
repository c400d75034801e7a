use interval_tree::{
    AvlIntervalTree, FlatIntervalTree, FnIntrospector, IntervalTreeAlgorithms, Span,
};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Marker {
    name: &'static str,
    span: Span,
}

fn marker(name: &'static str, start: usize, end: usize) -> Marker {
    Marker {
        name,
        span: Span::from_bounds(start, end),
    }
}

fn markers() -> Vec<Marker> {
    vec![
        marker("A", 0, 5),
        marker("B", 10, 20),
        marker("C", 15, 25),
        marker("D", 30, 35),
    ]
}

fn names(found: Vec<&Marker>) -> Vec<&'static str> {
    found.into_iter().map(|m| m.name).collect()
}

fn check_scenario<Tr>(tree: &Tr)
where
    Tr: IntervalTreeAlgorithms<Value = Marker>,
{
    assert_eq!(names(tree.get_intersecting(12, 6)), vec!["B", "C"]);
    assert_eq!(names(tree.get_containing(11, 3)), vec!["B"]);
    assert!(names(tree.get_overlapping(5, 5)).is_empty());
    assert!(!tree.has_overlapping(5, 5));
    assert_eq!(names(tree.get_overlapping(15, 0)), vec!["B"]);

    assert!(tree.has_intersecting_position(5));
    assert!(!tree.has_intersecting_position(7));
    assert_eq!(names(tree.get_intersecting(5, 0)), vec!["A"]);
    assert!(tree.has_containing(30, 5));
    assert!(!tree.has_containing(35, 0));
}

#[test]
fn scenario_on_avl_tree() {
    let tree = AvlIntervalTree::create(FnIntrospector::new(|m: &Marker| m.span), markers());
    check_scenario(&tree);
}

#[test]
fn scenario_on_flat_tree() {
    let tree = FlatIntervalTree::create(FnIntrospector::new(|m: &Marker| m.span), markers());
    check_scenario(&tree);
}

#[test]
fn scenario_on_frozen_tree() {
    let mut tree = AvlIntervalTree::new(FnIntrospector::new(|m: &Marker| m.span));
    for m in markers().into_iter().rev() {
        tree.insert(m);
    }
    check_scenario(&tree.freeze());
}
