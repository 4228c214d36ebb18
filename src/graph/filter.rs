// src/graph/filter.rs
//! Search projection: matching nodes plus their direct successors.

use tracing::debug;

use super::model::FilmGraph;

/// Returns the subgraph of nodes whose label contains `query`
/// (case-insensitive), each matched node's direct successors, and the edges
/// from matched nodes to those successors.
///
/// Ancestors are never pulled in: matching a film yields the film alone.
/// The input is untouched; the result owns copies of every node.
#[must_use]
pub fn filter(graph: &FilmGraph, query: &str) -> FilmGraph {
    let mut out = FilmGraph::new();
    let mut matched = 0usize;

    for (idx, node) in graph.nodes().iter().enumerate() {
        if !matches(&node.label, query) {
            continue;
        }
        matched += 1;
        let from = out.upsert(node.clone());

        for &succ in graph.successor_indices(idx) {
            let Some(target) = graph.nodes().get(succ) else {
                continue;
            };
            let to = out.upsert(target.clone());
            out.link(from, to);
        }
    }

    debug!(
        query,
        matched,
        nodes = out.node_count(),
        edges = out.edge_count(),
        "filtered graph"
    );
    out
}

/// True when `label` would be kept as a direct match for `query`.
#[must_use]
pub fn matches(label: &str, query: &str) -> bool {
    label.to_lowercase().contains(&query.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::builder::{build, GroupKey};
    use crate::graph::node::Level;
    use crate::records::FilmRecord;

    fn tree() -> FilmGraph {
        let rows = vec![
            FilmRecord::titled("A").genre("Drama").budget(100.0),
            FilmRecord::titled("B").genre("Drama").budget(200.0),
            FilmRecord::titled("C").genre("Comedy").budget(50.0),
        ];
        build(&rows, GroupKey::Genre).unwrap().graph
    }

    #[test]
    fn test_film_match_is_isolated() {
        let rows = vec![
            FilmRecord::titled("A").genre("Horror"),
            FilmRecord::titled("C").genre("Comedy"),
        ];
        let g = build(&rows, GroupKey::Genre).unwrap().graph;
        let f = filter(&g, "a");
        assert_eq!(f.node_count(), 1);
        assert!(f.contains("A"));
        assert_eq!(f.edge_count(), 0);
    }

    #[test]
    fn test_matching_category_pulls_its_films() {
        // "Drama" contains an "a" too, so its films come along with it.
        let f = filter(&tree(), "a");
        let labels: Vec<&str> = f.nodes().iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Drama", "A", "B"]);
    }

    #[test]
    fn test_category_match_brings_direct_children_only() {
        let f = filter(&tree(), "drama");
        let labels: Vec<&str> = f.nodes().iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["Drama", "A", "B"]);
        assert_eq!(f.edge_count(), 2);
        assert!(!f.contains("Movies by Genre"));
    }

    #[test]
    fn test_root_match_brings_categories_not_films() {
        let f = filter(&tree(), "movies");
        assert_eq!(f.node_count(), 3);
        assert_eq!(f.at_level(Level::Item).count(), 0);
    }

    #[test]
    fn test_no_match_is_empty() {
        let f = filter(&tree(), "zzz");
        assert!(f.is_empty());
        assert_eq!(f.edge_count(), 0);
    }

    #[test]
    fn test_empty_query_is_identity() {
        let g = tree();
        assert_eq!(filter(&g, ""), g);
    }

    #[test]
    fn test_idempotent() {
        let g = tree();
        for q in ["", "a", "DRAMA", "genre", "c", "nothing"] {
            let once = filter(&g, q);
            assert_eq!(filter(&once, q), once, "query {q:?}");
        }
    }

    #[test]
    fn test_input_untouched() {
        let g = tree();
        let before = g.clone();
        let _ = filter(&g, "drama");
        assert_eq!(g, before);
    }

    #[test]
    fn test_matches_is_case_insensitive() {
        assert!(matches("The Dark Knight", "dark"));
        assert!(!matches("Up", "down"));
    }
}
