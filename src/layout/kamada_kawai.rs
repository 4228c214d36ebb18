// src/layout/kamada_kawai.rs
//! Kamada-Kawai stress minimisation.
//!
//! Target distance between two nodes is their hop count in the undirected
//! graph. Starting from the circular layout, the node with the largest
//! energy gradient takes one Newton-Raphson step at a time until the
//! gradient vanishes or the move budget runs out.

use std::collections::VecDeque;

use tracing::debug;

use super::{circular, Position};
use crate::graph::FilmGraph;

const EPSILON: f64 = 1e-4;
const MIN_SEPARATION: f64 = 1e-9;

/// Returns unscaled positions after at most `iterations * n` node moves.
#[must_use]
pub fn place(graph: &FilmGraph, iterations: usize) -> Vec<Position> {
    let n = graph.node_count();
    let mut coords = circular::place(n, 1.0, Position::default());
    if n < 2 {
        return coords;
    }

    let dist = hop_distances(graph);
    let max_step = dist
        .iter()
        .flatten()
        .copied()
        .fold(1.0_f64, f64::max);
    let budget = iterations.saturating_mul(n);

    let moves = minimise(&mut coords, &dist, max_step, budget);
    debug!(moves, budget, "kamada-kawai finished");
    coords
}

/// Moves the steepest node until the gradient vanishes or `budget` moves
/// are spent. Returns the number of moves made.
fn minimise(coords: &mut [Position], dist: &[Vec<f64>], max_step: f64, budget: usize) -> usize {
    let mut gradients = Gradients::new(coords, dist);
    for step in 0..budget {
        let Some((m, norm)) = gradients.steepest() else {
            return step;
        };
        if norm < EPSILON {
            return step;
        }
        let Some(&before) = coords.get(m) else {
            return step;
        };
        newton_move(coords, dist, m, max_step);
        gradients.shift(coords, dist, m, before);
    }
    budget
}

/// Sum over pairs of `(|p_i - p_j| - d_ij)² / d_ij²`.
#[must_use]
pub fn stress(coords: &[Position], dist: &[Vec<f64>]) -> f64 {
    let mut total = 0.0;
    for (i, row) in dist.iter().enumerate() {
        for (j, &d) in row.iter().enumerate().skip(i + 1) {
            let (Some(a), Some(b)) = (coords.get(i), coords.get(j)) else {
                continue;
            };
            let gap = a.distance(*b) - d;
            total += gap * gap / (d * d);
        }
    }
    total
}

/// All-pairs hop distance by BFS over edges taken undirected. Pairs in
/// different components get one more than the largest finite distance.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn hop_distances(graph: &FilmGraph) -> Vec<Vec<f64>> {
    let n = graph.node_count();
    let mut neighbours = vec![Vec::new(); n];
    for (a, b) in graph.edge_indices() {
        if let Some(list) = neighbours.get_mut(a) {
            list.push(b);
        }
        if let Some(list) = neighbours.get_mut(b) {
            list.push(a);
        }
    }

    let hops: Vec<Vec<Option<usize>>> = (0..n).map(|s| bfs(&neighbours, s)).collect();
    let longest = hops.iter().flatten().flatten().copied().max().unwrap_or(0);
    let unreachable = (longest + 1) as f64;

    hops.into_iter()
        .map(|row| {
            row.into_iter()
                .map(|h| h.map_or(unreachable, |h| h as f64))
                .collect()
        })
        .collect()
}

fn bfs(neighbours: &[Vec<usize>], source: usize) -> Vec<Option<usize>> {
    let mut hops = vec![None; neighbours.len()];
    let mut queue = VecDeque::new();
    if let Some(slot) = hops.get_mut(source) {
        *slot = Some(0);
        queue.push_back(source);
    }
    while let Some(current) = queue.pop_front() {
        let depth = hops.get(current).copied().flatten().unwrap_or(0);
        for &next in neighbours.get(current).map_or(&[][..], Vec::as_slice) {
            if let Some(slot) = hops.get_mut(next) {
                if slot.is_none() {
                    *slot = Some(depth + 1);
                    queue.push_back(next);
                }
            }
        }
    }
    hops
}

/// Energy gradient of every node, kept current one move at a time.
struct Gradients {
    gx: Vec<f64>,
    gy: Vec<f64>,
}

impl Gradients {
    fn new(coords: &[Position], dist: &[Vec<f64>]) -> Self {
        let (gx, gy) = (0..coords.len())
            .map(|m| {
                let d = derivatives(coords, dist, m);
                (d.gx, d.gy)
            })
            .unzip();
        Self { gx, gy }
    }

    fn steepest(&self) -> Option<(usize, f64)> {
        self.gx
            .iter()
            .zip(&self.gy)
            .map(|(x, y)| x.hypot(*y))
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Node `m` moved from `before`: swap its old term for the new one in
    /// every other gradient, then recompute its own. O(n).
    #[allow(clippy::indexing_slicing)] // Guarded: dist is n x n, coords and gradients are n
    fn shift(&mut self, coords: &[Position], dist: &[Vec<f64>], m: usize, before: Position) {
        let after = coords[m];
        for (i, &pi) in coords.iter().enumerate() {
            if i == m {
                continue;
            }
            let target = dist[i][m];
            let (ox, oy) = pair_gradient(pi, before, target);
            let (nx, ny) = pair_gradient(pi, after, target);
            self.gx[i] += nx - ox;
            self.gy[i] += ny - oy;
        }
        let d = derivatives(coords, dist, m);
        self.gx[m] = d.gx;
        self.gy[m] = d.gy;
    }
}

/// Gradient at `p` of the spring between `p` and `q`.
fn pair_gradient(p: Position, q: Position, target: f64) -> (f64, f64) {
    let strength = 1.0 / (target * target);
    let dx = p.x - q.x;
    let dy = p.y - q.y;
    let len = dx.hypot(dy).max(MIN_SEPARATION);
    (
        strength * (dx - target * dx / len),
        strength * (dy - target * dy / len),
    )
}

/// Partial derivatives and Hessian entries of the energy at node `m`.
struct Derivatives {
    gx: f64,
    gy: f64,
    xx: f64,
    xy: f64,
    yy: f64,
}

#[allow(clippy::indexing_slicing)] // Guarded: dist is n x n, coords is n
fn derivatives(coords: &[Position], dist: &[Vec<f64>], m: usize) -> Derivatives {
    let mut d = Derivatives { gx: 0.0, gy: 0.0, xx: 0.0, xy: 0.0, yy: 0.0 };
    let pm = coords[m];
    for (i, &pi) in coords.iter().enumerate() {
        if i == m {
            continue;
        }
        let target = dist[m][i];
        let strength = 1.0 / (target * target);
        let (gx, gy) = pair_gradient(pm, pi, target);
        let dx = pm.x - pi.x;
        let dy = pm.y - pi.y;
        let len = dx.hypot(dy).max(MIN_SEPARATION);
        let cube = len * len * len;

        d.gx += gx;
        d.gy += gy;
        d.xx += strength * (1.0 - target * dy * dy / cube);
        d.xy += strength * (target * dx * dy / cube);
        d.yy += strength * (1.0 - target * dx * dx / cube);
    }
    d
}

/// Solves the 2x2 Newton system for node `m` and moves it, capping the step
/// at `max_step`. Falls back to a short gradient step on a singular Hessian.
fn newton_move(coords: &mut [Position], dist: &[Vec<f64>], m: usize, max_step: f64) {
    let d = derivatives(coords, dist, m);
    let det = d.xx * d.yy - d.xy * d.xy;

    let (mut sx, mut sy) = if det.abs() > MIN_SEPARATION {
        (
            (-d.gx * d.yy + d.xy * d.gy) / det,
            (-d.gy * d.xx + d.xy * d.gx) / det,
        )
    } else {
        (-d.gx * 0.1, -d.gy * 0.1)
    };

    let len = sx.hypot(sy);
    if len > max_step {
        sx *= max_step / len;
        sy *= max_step / len;
    }
    if let Some(p) = coords.get_mut(m) {
        p.x += sx;
        p.y += sy;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{build, GroupKey};
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
    fn test_hop_distances_on_tree() {
        let g = tree();
        let dist = hop_distances(&g);
        let at = |a: &str, b: &str| dist[g.index_of(a).unwrap()][g.index_of(b).unwrap()];
        assert_eq!(at("A", "A"), 0.0);
        assert_eq!(at("Drama", "A"), 1.0);
        assert_eq!(at("A", "Drama"), 1.0);
        assert_eq!(at("A", "B"), 2.0);
        assert_eq!(at("A", "C"), 4.0);
    }

    #[test]
    fn test_disconnected_pairs_get_longest_plus_one() {
        let mut g = FilmGraph::new();
        let x = g.upsert(crate::graph::Node::category("X"));
        let a = g.upsert(crate::graph::Node::item("A", crate::graph::FilmMeta::default()));
        let b = g.upsert(crate::graph::Node::item("B", crate::graph::FilmMeta::default()));
        let lone = g.upsert(crate::graph::Node::category("Y"));
        g.link(x, a);
        g.link(x, b);

        let dist = hop_distances(&g);
        assert_eq!(dist[a][b], 2.0);
        assert_eq!(dist[lone][a], 3.0);
        assert_eq!(dist[x][lone], 3.0);
    }

    #[test]
    fn test_minimisation_lowers_stress() {
        let g = tree();
        let dist = hop_distances(&g);
        let start = circular::place(g.node_count(), 1.0, Position::default());
        let end = place(&g, 50);
        assert!(
            stress(&end, &dist) < stress(&start, &dist),
            "{} !< {}",
            stress(&end, &dist),
            stress(&start, &dist)
        );
    }

    #[test]
    fn test_cached_gradients_track_moves() {
        let g = tree();
        let dist = hop_distances(&g);
        let mut coords = circular::place(g.node_count(), 1.0, Position::default());
        let mut cached = Gradients::new(&coords, &dist);
        for _ in 0..20 {
            let (m, _) = cached.steepest().unwrap();
            let before = coords[m];
            newton_move(&mut coords, &dist, m, 4.0);
            cached.shift(&coords, &dist, m, before);
        }
        let fresh = Gradients::new(&coords, &dist);
        for i in 0..coords.len() {
            assert!((cached.gx[i] - fresh.gx[i]).abs() < 1e-9, "gx[{i}]");
            assert!((cached.gy[i] - fresh.gy[i]).abs() < 1e-9, "gy[{i}]");
        }
    }

    #[test]
    fn test_catalogue_sized_graph_finishes_quickly() {
        let rows: Vec<FilmRecord> = (0..380)
            .map(|i| FilmRecord::titled(format!("Film {i}")).genre(format!("Genre {}", i % 10)))
            .collect();
        let g = build(&rows, GroupKey::Genre).unwrap().graph;
        assert_eq!(g.node_count(), 391);

        let dist = hop_distances(&g);
        let mut coords = circular::place(g.node_count(), 1.0, Position::default());
        let budget = 50 * g.node_count();
        let started = std::time::Instant::now();
        let moves = minimise(&mut coords, &dist, 4.0, budget);
        let elapsed = started.elapsed();

        assert!(moves <= budget);
        assert!(coords.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
        assert!(elapsed.as_secs() < 30, "took {elapsed:?}");
    }

    #[test]
    fn test_deterministic() {
        let g = tree();
        assert_eq!(place(&g, 50), place(&g, 50));
    }
}
