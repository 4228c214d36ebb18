// src/render.rs
//! Projection of a laid-out graph into plot-ready series.
//!
//! No styling happens here: the output is edge segments and node points
//! with hover text, ready for a scatter/line plotting front end.

use std::fmt::Write;

use serde::Serialize;

use crate::error::{ReelError, Result};
use crate::graph::{FilmGraph, FilmMeta, Node};
use crate::layout::{Position, PositionMap};

/// Line separator used inside hover text.
pub const LINE_BREAK: &str = "<br>";

/// One straight edge, source to target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EdgeSegment {
    pub from: Position,
    pub to: Position,
}

/// One marker with its label, colour index and hover text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodePoint {
    pub position: Position,
    pub label: String,
    /// The node's level rank, used as a colour-scale value.
    pub level_color: u8,
    pub hover: String,
}

/// Edge and node series, in graph iteration order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Projection {
    pub edges: Vec<EdgeSegment>,
    pub nodes: Vec<NodePoint>,
}

impl Projection {
    /// Flattens the edges into x and y series where each segment is
    /// followed by a `None` gap, the shape line traces expect.
    #[must_use]
    pub fn edge_polyline(&self) -> (Vec<Option<f64>>, Vec<Option<f64>>) {
        let mut xs = Vec::with_capacity(self.edges.len() * 3);
        let mut ys = Vec::with_capacity(self.edges.len() * 3);
        for seg in &self.edges {
            xs.extend([Some(seg.from.x), Some(seg.to.x), None]);
            ys.extend([Some(seg.from.y), Some(seg.to.y), None]);
        }
        (xs, ys)
    }
}

/// Maps `graph` and its positions into plot series.
///
/// # Errors
/// Returns `MissingPosition` if any node lacks a position.
pub fn project(graph: &FilmGraph, positions: &PositionMap) -> Result<Projection> {
    let lookup = |label: &str| {
        positions
            .get(label)
            .copied()
            .ok_or_else(|| ReelError::MissingPosition(label.to_string()))
    };

    let edges = graph
        .edges()
        .map(|(from, to)| {
            Ok(EdgeSegment {
                from: lookup(&from.label)?,
                to: lookup(&to.label)?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let nodes = graph
        .nodes()
        .iter()
        .map(|node| {
            Ok(NodePoint {
                position: lookup(&node.label)?,
                label: node.label.clone(),
                level_color: node.level.rank(),
                hover: hover_text(node),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(Projection { edges, nodes })
}

/// Hover text: the bare label for root and category nodes, the full film
/// card for items.
#[must_use]
pub fn hover_text(node: &Node) -> String {
    match &node.meta {
        Some(meta) => film_card(&node.label, meta),
        None => node.label.clone(),
    }
}

fn film_card(label: &str, meta: &FilmMeta) -> String {
    let lines = [
        label.to_string(),
        format!("Genre: {}", meta.genre),
        format!(
            "Rating: Rotten Tomatoes {}%, Audience {}%",
            meta.critic_score, meta.audience_score
        ),
        format!("Domestic Gross: ${}m", format_thousands(meta.domestic_gross)),
        format!("Foreign Gross: ${}m", format_thousands(meta.foreign_gross)),
        format!("Worldwide Gross: ${}m", format_thousands(meta.worldwide_gross)),
        format!("Budget: ${}m", format_thousands(meta.budget)),
        format!("Oscar: {}", meta.oscar),
        format!("Bafta: {}", meta.bafta),
    ];
    lines.join(LINE_BREAK)
}

/// Rounds to a whole number (ties to even) and groups digits by thousands.
#[must_use]
pub fn format_thousands(value: f64) -> String {
    let rounded = format!("{value:.0}");
    let (sign, digits) = match rounded.strip_prefix('-') {
        Some(rest) if rest.chars().any(|c| c != '0') => ("-", rest),
        Some(rest) => ("", rest),
        None => ("", rounded.as_str()),
    };

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push_str(sign);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Plain-text rendering of a projection, one node per line, with hover
/// lines indented beneath it.
#[must_use]
pub fn describe(projection: &Projection) -> String {
    let mut out = String::new();
    for point in &projection.nodes {
        let indent = "  ".repeat(usize::from(point.level_color));
        let _ = writeln!(
            out,
            "{indent}{} ({:.3}, {:.3})",
            point.label, point.position.x, point.position.y
        );
        for line in point.hover.split(LINE_BREAK).skip(1) {
            let _ = writeln!(out, "{indent}    {line}");
        }
    }
    out
}
