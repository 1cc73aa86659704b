//! Integration tests for page closure resolution.

mod support;

use confluence_export::hierarchy::{HierarchyResolver, PageSelection, SpaceTarget};
use support::{FakeGateway, page};

fn ids(closure: &confluence_export::hierarchy::Closure) -> Vec<&str> {
    closure.pages.iter().map(|p| p.id.as_str()).collect()
}

#[tokio::test]
async fn test_whole_space_returns_listing_in_order() {
    let gateway = FakeGateway::new().with_space(
        "ENG",
        vec![page("1", "Home", &[]), page("2", "Guide", &[("1", "Home")])],
    );
    let closure = HierarchyResolver::new(&gateway)
        .resolve(&SpaceTarget::new("ENG", PageSelection::WholeSpace))
        .await;

    assert_eq!(ids(&closure), vec!["1", "2"]);
    assert!(closure.missing.is_empty());
    assert!(gateway.child_listings().is_empty(), "whole-space mode must not walk children");
}

#[tokio::test]
async fn test_named_pages_expand_depth_first_pre_order() {
    // A
    // ├── B
    // │   └── D
    // └── C
    let gateway = FakeGateway::new()
        .with_space("ENG", vec![page("a", "A", &[]), page("x", "X", &[])])
        .with_children("a", vec![page("b", "B", &[]), page("c", "C", &[])])
        .with_children("b", vec![page("d", "D", &[])]);

    let closure = HierarchyResolver::new(&gateway)
        .resolve(&SpaceTarget::new(
            "ENG",
            PageSelection::Named(vec!["A".to_string(), "X".to_string()]),
        ))
        .await;

    assert_eq!(ids(&closure), vec!["a", "b", "d", "c", "x"]);
}

#[tokio::test]
async fn test_missing_named_page_is_skipped_and_reported() {
    let gateway = FakeGateway::new().with_space("ENG", vec![page("a", "A", &[])]);

    let closure = HierarchyResolver::new(&gateway)
        .resolve(&SpaceTarget::new(
            "ENG",
            PageSelection::Named(vec!["Ghost".to_string(), "A".to_string()]),
        ))
        .await;

    assert_eq!(ids(&closure), vec!["a"]);
    assert_eq!(closure.missing, vec!["Ghost".to_string()]);
}

#[tokio::test]
async fn test_cycle_in_children_terminates() {
    let gateway = FakeGateway::new()
        .with_space("ENG", vec![page("a", "A", &[])])
        .with_children("a", vec![page("b", "B", &[])])
        .with_children("b", vec![page("a", "A", &[]), page("c", "C", &[])]);

    let closure = HierarchyResolver::new(&gateway)
        .resolve(&SpaceTarget::new("ENG", PageSelection::Named(vec!["A".to_string()])))
        .await;

    assert_eq!(ids(&closure), vec!["a", "b", "c"]);
    assert_eq!(closure.pruned, 1);
}

#[tokio::test]
async fn test_depth_bound_stops_expansion() {
    let gateway = FakeGateway::new()
        .with_space("ENG", vec![page("0", "Root", &[])])
        .with_children("0", vec![page("1", "L1", &[])])
        .with_children("1", vec![page("2", "L2", &[])])
        .with_children("2", vec![page("3", "L3", &[])]);

    let closure = HierarchyResolver::new(&gateway)
        .with_max_depth(2)
        .resolve(&SpaceTarget::new("ENG", PageSelection::Named(vec!["Root".to_string()])))
        .await;

    assert_eq!(ids(&closure), vec!["0", "1", "2"]);
    assert_eq!(closure.pruned, 1);
    assert!(!gateway.child_listings().contains(&"2".to_string()));
}

#[tokio::test]
async fn test_shared_descendant_under_two_roots_is_kept_twice() {
    let gateway = FakeGateway::new()
        .with_space("ENG", vec![page("a", "A", &[]), page("b", "B", &[])])
        .with_children("a", vec![page("s", "Shared", &[])])
        .with_children("b", vec![page("s", "Shared", &[])]);

    let closure = HierarchyResolver::new(&gateway)
        .resolve(&SpaceTarget::new(
            "ENG",
            PageSelection::Named(vec!["A".to_string(), "B".to_string()]),
        ))
        .await;

    assert_eq!(ids(&closure), vec!["a", "s", "b", "s"]);
}

#[tokio::test]
async fn test_interrupted_space_listing_keeps_partial_pages() {
    let gateway = FakeGateway::new()
        .with_space("ENG", vec![page("1", "Home", &[])])
        .with_interrupted_space("ENG");

    let closure = HierarchyResolver::new(&gateway)
        .resolve(&SpaceTarget::new("ENG", PageSelection::WholeSpace))
        .await;

    assert_eq!(ids(&closure), vec!["1"]);
    assert_eq!(closure.interrupted_listings, 1);
}
