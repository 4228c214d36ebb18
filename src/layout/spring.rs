// src/layout/spring.rs
//! Fruchterman-Reingold force-directed placement.
//!
//! Every pair of nodes repels with `k²/d`; every edge, taken undirected,
//! pulls its endpoints together with `d²/k`. Each sweep moves a node along
//! its net force by at most the current temperature, which cools linearly
//! to zero over the iteration budget, so the loop always terminates.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::Position;
use crate::graph::FilmGraph;

const INITIAL_TEMPERATURE: f64 = 0.1;
const THRESHOLD: f64 = 1e-4;
const MIN_DISTANCE: f64 = 0.01;

/// Runs the simulation from a seeded random start in the unit square.
/// The result is unscaled.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn place(graph: &FilmGraph, iterations: usize, seed: u64) -> Vec<Position> {
    let n = graph.node_count();
    let mut rng = StdRng::seed_from_u64(seed);
    let mut coords: Vec<Position> = (0..n)
        .map(|_| Position::new(rng.gen::<f64>(), rng.gen::<f64>()))
        .collect();
    if n < 2 {
        return coords;
    }

    let springs = adjacency(graph);
    let k = (1.0 / n as f64).sqrt();
    let mut temperature = INITIAL_TEMPERATURE;
    let cooling = temperature / (iterations as f64 + 1.0);

    for sweep in 0..iterations {
        let forces = net_forces(&coords, &springs, k);
        let moved = apply_forces(&mut coords, &forces, temperature);
        temperature -= cooling;

        if moved / (n as f64) < THRESHOLD {
            debug!(sweep, "spring layout converged");
            break;
        }
    }
    coords
}

/// Symmetric 0/1 matrix, row-major.
fn adjacency(graph: &FilmGraph) -> Vec<Vec<bool>> {
    let n = graph.node_count();
    let mut springs = vec![vec![false; n]; n];
    for (a, b) in graph.edge_indices() {
        if let Some(row) = springs.get_mut(a) {
            row[b] = true;
        }
        if let Some(row) = springs.get_mut(b) {
            row[a] = true;
        }
    }
    springs
}

#[allow(clippy::indexing_slicing)] // Guarded: all vectors are length n
fn net_forces(coords: &[Position], springs: &[Vec<bool>], k: f64) -> Vec<(f64, f64)> {
    let n = coords.len();
    let mut forces = vec![(0.0, 0.0); n];

    for i in 0..n {
        for j in 0..n {
            if i == j {
                continue;
            }
            let dx = coords[i].x - coords[j].x;
            let dy = coords[i].y - coords[j].y;
            let d = dx.hypot(dy).max(MIN_DISTANCE);

            let mut magnitude = k * k / (d * d);
            if springs[i][j] {
                magnitude -= d / k;
            }
            forces[i].0 += dx * magnitude;
            forces[i].1 += dy * magnitude;
        }
    }
    forces
}

/// Moves each node by at most `temperature`; returns the Frobenius norm of
/// the displacement.
fn apply_forces(coords: &mut [Position], forces: &[(f64, f64)], temperature: f64) -> f64 {
    let mut total = 0.0;
    for (p, &(fx, fy)) in coords.iter_mut().zip(forces) {
        let length = fx.hypot(fy).max(MIN_DISTANCE);
        let step_x = fx * temperature / length;
        let step_y = fy * temperature / length;
        p.x += step_x;
        p.y += step_y;
        total += step_x * step_x + step_y * step_y;
    }
    total.sqrt()
}
