//! Join path resolution over a hand-built schema where the first-found and
//! shortest strategies disagree.

use intentql::semantic::relation_graph::{
    GraphError, JoinPath, JoinPathStrategy, Relation, RelationGraph,
};

/// a -> x -> y -> d, plus b linking a and d directly.
fn detour_graph() -> RelationGraph {
    RelationGraph::new(vec![
        Relation::parse("a.x_id", "x.id").unwrap(),
        Relation::parse("x.y_id", "y.id").unwrap(),
        Relation::parse("y.d_id", "d.id").unwrap(),
        Relation::parse("b.a_id", "a.id").unwrap(),
        Relation::parse("b.d_id", "d.id").unwrap(),
    ])
    .unwrap()
}

fn hops(path: &JoinPath) -> Vec<String> {
    path.iter()
        .map(|s| format!("{}.{}={}.{}", s.from_table, s.from_column, s.to_table, s.to_column))
        .collect()
}

#[test]
fn test_first_found_follows_declaration_order() {
    let path = detour_graph()
        .find_join_path("a", "d", JoinPathStrategy::FirstFound)
        .unwrap();

    assert_eq!(path.tables(), vec!["a", "x", "y", "d"]);
    assert_eq!(
        hops(&path),
        vec!["a.x_id=x.id", "x.y_id=y.id", "y.d_id=d.id"]
    );
}

#[test]
fn test_shortest_takes_fewest_joins() {
    let path = detour_graph()
        .find_join_path("a", "d", JoinPathStrategy::Shortest)
        .unwrap();

    assert_eq!(path.len(), 2);
    assert_eq!(hops(&path), vec!["a.id=b.a_id", "b.d_id=d.id"]);
}

#[test]
fn test_direct_edge_beats_longer_first_branch() {
    let graph = RelationGraph::new(vec![
        Relation::parse("a.x_id", "x.id").unwrap(),
        Relation::parse("x.d_id", "d.id").unwrap(),
        Relation::parse("a.d_id", "d.id").unwrap(),
    ])
    .unwrap();

    let path = graph
        .find_join_path("a", "d", JoinPathStrategy::FirstFound)
        .unwrap();
    assert_eq!(hops(&path), vec!["a.d_id=d.id"]);
}

#[test]
fn test_paths_are_symmetric_in_length() {
    let graph = detour_graph();
    for strategy in [JoinPathStrategy::FirstFound, JoinPathStrategy::Shortest] {
        let there = graph.find_join_path("a", "d", strategy).unwrap();
        let back = graph.find_join_path("d", "a", strategy).unwrap();
        assert_eq!(there.tables().first(), Some(&"a"));
        assert_eq!(back.tables().last(), Some(&"a"));
    }
}

#[test]
fn test_no_path_cases() {
    let graph = RelationGraph::new(vec![
        Relation::parse("a.b_id", "b.id").unwrap(),
        Relation::parse("c.d_id", "d.id").unwrap(),
    ])
    .unwrap();

    for strategy in [JoinPathStrategy::FirstFound, JoinPathStrategy::Shortest] {
        assert!(graph.find_join_path("a", "d", strategy).is_none());
        assert!(graph.find_join_path("a", "a", strategy).is_none());
        assert!(graph.find_join_path("a", "zzz", strategy).is_none());
    }
    assert!(graph.has_path("a", "b"));
    assert!(!graph.has_path("b", "c"));
}

#[test]
fn test_related_table_lookup() {
    let graph = detour_graph();
    assert_eq!(graph.get_related_table("b", "d_id"), Some(("d", "id")));
    assert_eq!(graph.get_related_table("d", "id"), None);
}

#[test]
fn test_invalid_relations_rejected() {
    assert!(matches!(
        Relation::parse("orders", "customers.id"),
        Err(GraphError::MalformedReference(_))
    ));
    assert!(matches!(
        RelationGraph::new(vec![Relation::parse("a.parent_id", "a.id").unwrap()]),
        Err(GraphError::SelfReference(_))
    ));
    assert!(matches!(
        RelationGraph::new(vec![Relation::new("a", "b id", "b", "id")]),
        Err(GraphError::InvalidIdentifier(_))
    ));
}
