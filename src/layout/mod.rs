// src/layout/mod.rs
//! 2-D layouts for a film graph.
//!
//! Every algorithm works on index-aligned coordinate vectors (index `i` is
//! the graph's `i`-th node) and the result is keyed by label at the end.
//! Positions are recomputed on every call; nothing is cached.

pub mod circular;
pub mod kamada_kawai;
pub mod shell;
pub mod spring;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ReelError, Result};
use crate::graph::FilmGraph;

/// Default iteration budget for the iterative layouts.
pub const DEFAULT_ITERATIONS: usize = 50;

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from `center` in direction `angle` (radians).
    #[must_use]
    pub fn polar(center: Position, radius: f64, angle: f64) -> Self {
        Self::new(
            center.x + radius * angle.cos(),
            center.y + radius * angle.sin(),
        )
    }

    #[must_use]
    pub fn distance(self, other: Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Angle of this point as seen from `center`, in `(-π, π]`.
    #[must_use]
    pub fn angle_from(self, center: Position) -> f64 {
        (self.y - center.y).atan2(self.x - center.x)
    }
}

/// Node label → position. Holds exactly one entry per graph node.
pub type PositionMap = HashMap<String, Position>;

/// Supported placement algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutAlgorithm {
    #[default]
    Spring,
    Circular,
    Shell,
    KamadaKawai,
}

impl LayoutAlgorithm {
    pub const ALL: [LayoutAlgorithm; 4] = [
        Self::Spring,
        Self::Circular,
        Self::Shell,
        Self::KamadaKawai,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Circular => "circular",
            Self::Shell => "shell",
            Self::KamadaKawai => "kamada_kawai",
        }
    }
}

impl fmt::Display for LayoutAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutAlgorithm {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spring" => Ok(Self::Spring),
            "circular" => Ok(Self::Circular),
            "shell" => Ok(Self::Shell),
            "kamada_kawai" | "kamada-kawai" => Ok(Self::KamadaKawai),
            _ => Err(ReelError::UnsupportedLayout(s.to_string())),
        }
    }
}

/// Parameters for a layout run.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    pub algorithm: LayoutAlgorithm,
    /// Seed for the spring layout's initial placement. `None` draws a fresh
    /// seed, so repeated runs differ visually but not topologically.
    pub seed: Option<u64>,
    /// Iteration budget. Spring runs at most this many sweeps; Kamada-Kawai
    /// at most this many moves per node.
    pub iterations: usize,
    /// Radius (circular, outer shell) or half-extent (spring, Kamada-Kawai).
    pub scale: f64,
    pub center: Position,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            algorithm: LayoutAlgorithm::default(),
            seed: None,
            iterations: DEFAULT_ITERATIONS,
            scale: 1.0,
            center: Position::default(),
        }
    }
}

impl LayoutOptions {
    #[must_use]
    pub fn new(algorithm: LayoutAlgorithm) -> Self {
        Self {
            algorithm,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }
}

/// Lays out `graph` with default options for `algorithm`.
///
/// # Errors
/// Returns `EmptyGraph` if the graph has no nodes.
pub fn layout(graph: &FilmGraph, algorithm: LayoutAlgorithm, seed: Option<u64>) -> Result<PositionMap> {
    compute(graph, &LayoutOptions::new(algorithm).with_seed(seed))
}

/// Computes one position per node of `graph`.
///
/// # Errors
/// Returns `EmptyGraph` if the graph has no nodes.
pub fn compute(graph: &FilmGraph, opts: &LayoutOptions) -> Result<PositionMap> {
    let n = graph.node_count();
    if n == 0 {
        return Err(ReelError::EmptyGraph);
    }

    let coords = if n == 1 {
        vec![opts.center]
    } else {
        place(graph, opts)
    };

    debug!(algorithm = %opts.algorithm, nodes = n, "computed layout");
    Ok(graph
        .nodes()
        .iter()
        .zip(coords)
        .map(|(node, pos)| (node.label.clone(), pos))
        .collect())
}

fn place(graph: &FilmGraph, opts: &LayoutOptions) -> Vec<Position> {
    match opts.algorithm {
        LayoutAlgorithm::Circular => circular::place(graph.node_count(), opts.scale, opts.center),
        LayoutAlgorithm::Shell => shell::place(graph, opts.scale, opts.center),
        LayoutAlgorithm::Spring => {
            let seed = opts.seed.unwrap_or_else(rand::random);
            debug!(seed, "spring layout seed");
            let mut coords = spring::place(graph, opts.iterations, seed);
            rescale(&mut coords, opts.scale, opts.center);
            coords
        }
        LayoutAlgorithm::KamadaKawai => {
            let mut coords = kamada_kawai::place(graph, opts.iterations);
            rescale(&mut coords, opts.scale, opts.center);
            coords
        }
    }
}

/// Centres the coordinates on their mean and scales them so the largest
/// absolute coordinate equals `scale`, then shifts them to `center`.
pub fn rescale(coords: &mut [Position], scale: f64, center: Position) {
    if coords.is_empty() {
        return;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = coords.len() as f64;
    let mean_x = coords.iter().map(|p| p.x).sum::<f64>() / n;
    let mean_y = coords.iter().map(|p| p.y).sum::<f64>() / n;

    let lim = coords
        .iter()
        .map(|p| (p.x - mean_x).abs().max((p.y - mean_y).abs()))
        .fold(0.0_f64, f64::max);
    let factor = if lim > 0.0 { scale / lim } else { 0.0 };

    for p in coords.iter_mut() {
        p.x = (p.x - mean_x) * factor + center.x;
        p.y = (p.y - mean_y) * factor + center.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build, GroupKey, Node};
    use crate::records::FilmRecord;

    fn tree() -> FilmGraph {
        let rows = vec![
            FilmRecord::titled("A").genre("Drama"),
            FilmRecord::titled("B").genre("Drama"),
            FilmRecord::titled("C").genre("Comedy"),
        ];
        build(&rows, GroupKey::Genre).unwrap().graph
    }

    #[test]
    fn test_every_algorithm_positions_every_node_once() {
        let g = tree();
        for algorithm in LayoutAlgorithm::ALL {
            let pos = layout(&g, algorithm, Some(7)).unwrap();
            assert_eq!(pos.len(), g.node_count(), "{algorithm}");
            for node in g.nodes() {
                let p = pos.get(&node.label).unwrap();
                assert!(p.x.is_finite() && p.y.is_finite(), "{algorithm}: {}", node.label);
            }
        }
    }

    #[test]
    fn test_empty_graph_fails() {
        let g = FilmGraph::new();
        assert!(matches!(
            layout(&g, LayoutAlgorithm::Circular, None),
            Err(ReelError::EmptyGraph)
        ));
    }

    #[test]
    fn test_single_node_sits_at_center() {
        let mut g = FilmGraph::new();
        g.upsert(Node::root("Movies by Genre"));
        for algorithm in LayoutAlgorithm::ALL {
            let pos = layout(&g, algorithm, None).unwrap();
            assert_eq!(pos.get("Movies by Genre"), Some(&Position::default()));
        }
    }

    #[test]
    fn test_unknown_algorithm_is_rejected() {
        assert!(matches!(
            "radial".parse::<LayoutAlgorithm>(),
            Err(ReelError::UnsupportedLayout(name)) if name == "radial"
        ));
        assert_eq!(
            "Kamada-Kawai".parse::<LayoutAlgorithm>().unwrap(),
            LayoutAlgorithm::KamadaKawai
        );
    }

    #[test]
    fn test_seeded_spring_is_reproducible() {
        let g = tree();
        let a = layout(&g, LayoutAlgorithm::Spring, Some(42)).unwrap();
        let b = layout(&g, LayoutAlgorithm::Spring, Some(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_rescale_bounds_to_scale() {
        let mut coords = vec![Position::new(0.0, 0.0), Position::new(4.0, 2.0)];
        rescale(&mut coords, 1.0, Position::new(10.0, 10.0));
        assert_eq!(coords[0], Position::new(9.0, 9.5));
        assert_eq!(coords[1], Position::new(11.0, 10.5));
    }
}
