// tests/integration_pipeline.rs
//! Build → filter → layout → projection, end to end.

use reeltree_core::error::ReelError;
use reeltree_core::graph::{build, filter, GroupKey};
use reeltree_core::layout::{self, LayoutAlgorithm, LayoutOptions};
use reeltree_core::records::FilmRecord;
use reeltree_core::render;
use std::f64::consts::PI;

fn rows() -> Vec<FilmRecord> {
    vec![
        FilmRecord::titled("A").genre("Drama"),
        FilmRecord::titled("B").genre("Drama"),
        FilmRecord::titled("C").genre("Comedy"),
    ]
}

#[test]
fn test_every_layout_projects_every_node() {
    let g = build(&rows(), GroupKey::Genre).unwrap().graph;
    for algorithm in LayoutAlgorithm::ALL {
        let positions = layout::compute(&g, &LayoutOptions::new(algorithm).with_seed(Some(5))).unwrap();
        assert_eq!(positions.len(), g.node_count(), "{algorithm}");
        assert!(positions.values().all(|p| p.x.is_finite() && p.y.is_finite()));

        let projection = render::project(&g, &positions).unwrap();
        assert_eq!(projection.nodes.len(), 6);
        assert_eq!(projection.edges.len(), 5);
    }
}

#[test]
fn test_circular_four_nodes_quarter_turns() {
    let g = build(
        &[
            FilmRecord::titled("A").genre("Drama"),
            FilmRecord::titled("B").genre("Drama"),
        ],
        GroupKey::Genre,
    )
    .unwrap()
    .graph;
    assert_eq!(g.node_count(), 4);

    let positions = layout::layout(&g, LayoutAlgorithm::Circular, None).unwrap();
    let mut angles: Vec<f64> = g
        .nodes()
        .iter()
        .map(|n| positions[&n.label].y.atan2(positions[&n.label].x).rem_euclid(2.0 * PI))
        .collect();
    angles.sort_by(f64::total_cmp);
    for pair in angles.windows(2) {
        assert!((pair[1] - pair[0] - PI / 2.0).abs() < 1e-9);
    }
    for p in positions.values() {
        assert!((p.x.hypot(p.y) - 1.0).abs() < 1e-9);
    }
}

#[test]
fn test_search_then_layout() {
    let g = build(&rows(), GroupKey::Genre).unwrap().graph;
    let sub = filter(&g, "comedy");
    let positions = layout::layout(&sub, LayoutAlgorithm::KamadaKawai, None).unwrap();
    let projection = render::project(&sub, &positions).unwrap();
    let labels: Vec<&str> = projection.nodes.iter().map(|n| n.label.as_str()).collect();
    assert_eq!(labels, vec!["Comedy", "C"]);
    assert_eq!(projection.edges.len(), 1);
}

#[test]
fn test_no_match_cannot_be_laid_out() {
    let g = build(&rows(), GroupKey::Genre).unwrap().graph;
    let sub = filter(&g, "western");
    assert!(sub.is_empty());
    assert!(matches!(
        layout::layout(&sub, LayoutAlgorithm::Spring, Some(1)),
        Err(ReelError::EmptyGraph)
    ));
}

#[test]
fn test_seeded_spring_projection_is_stable() {
    let g = build(&rows(), GroupKey::Genre).unwrap().graph;
    let first = render::project(&g, &layout::layout(&g, LayoutAlgorithm::Spring, Some(42)).unwrap()).unwrap();
    let second = render::project(&g, &layout::layout(&g, LayoutAlgorithm::Spring, Some(42)).unwrap()).unwrap();
    assert_eq!(first, second);
}
