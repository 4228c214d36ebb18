// src/layout/circular.rs
//! Evenly spaced placement on one circle.

use std::f64::consts::TAU;

use super::Position;

/// Places `n` points on a circle of radius `scale`, point `i` at angle
/// `2πi/n`, in the given order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn place(n: usize, scale: f64, center: Position) -> Vec<Position> {
    if n == 1 {
        return vec![center];
    }
    let step = TAU / n as f64;
    (0..n)
        .map(|i| Position::polar(center, scale, step * i as f64))
        .collect()
}
