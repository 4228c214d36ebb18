// src/layout/shell.rs
//! Concentric shells, one per hierarchy level.

use std::collections::BTreeMap;
use std::f64::consts::{PI, TAU};

use super::Position;
use crate::graph::{FilmGraph, Level};

/// Places each level present in `graph` on its own circle, lowest level
/// innermost. A lone innermost node sits at `center`; radii grow by
/// `scale / shells` and each shell is rotated by `π / shells` against the
/// one inside it.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn place(graph: &FilmGraph, scale: f64, center: Position) -> Vec<Position> {
    let shells = group_by_level(graph);
    let count = shells.len().max(1) as f64;
    let bump = scale / count;
    let rotate = PI / count;

    let mut radius = match shells.values().next() {
        Some(first) if first.len() == 1 => 0.0,
        _ => bump,
    };
    let mut offset = 0.0;
    let mut coords = vec![center; graph.node_count()];

    for members in shells.values() {
        let step = TAU / members.len() as f64;
        for (slot, &idx) in members.iter().enumerate() {
            if let Some(p) = coords.get_mut(idx) {
                *p = Position::polar(center, radius, offset + step * slot as f64);
            }
        }
        radius += bump;
        offset += rotate;
    }
    coords
}

fn group_by_level(graph: &FilmGraph) -> BTreeMap<Level, Vec<usize>> {
    let mut shells: BTreeMap<Level, Vec<usize>> = BTreeMap::new();
    for (idx, node) in graph.nodes().iter().enumerate() {
        shells.entry(node.level).or_default().push(idx);
    }
    shells
}
