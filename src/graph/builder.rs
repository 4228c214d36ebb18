// src/graph/builder.rs
//! Hierarchy construction: records grouped under a root by genre or studio.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use tracing::debug;

use super::model::FilmGraph;
use super::node::{FilmMeta, Node};
use crate::error::{ReelError, Result};
use crate::records::FilmRecord;

/// Column used to form the category level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKey {
    Genre,
    Studio,
}

impl GroupKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Genre => "genre",
            Self::Studio => "studio",
        }
    }

    /// Label given to the root node of a tree grouped by this key.
    #[must_use]
    pub fn root_label(self) -> &'static str {
        match self {
            Self::Genre => "Movies by Genre",
            Self::Studio => "Movies by Studio",
        }
    }

    /// The record's category under this key, or `None` if the row must be
    /// skipped. Genre rows need a non-blank value; studio rows only need the
    /// value to be present.
    #[must_use]
    pub fn category_of(self, record: &FilmRecord) -> Option<&str> {
        match self {
            Self::Genre => record.genre.as_deref().filter(|g| !g.trim().is_empty()),
            Self::Studio => record.major_studio.as_deref(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupKey {
    type Err = ReelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "genre" => Ok(Self::Genre),
            "studio" | "major_studio" => Ok(Self::Studio),
            _ => Err(ReelError::InvalidGroupKey(s.to_string())),
        }
    }
}

/// Counts of rows the builder did not attach as-is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    /// Rows examined.
    pub rows: usize,
    /// Rows without a usable group value.
    pub missing_group: usize,
    /// Rows without a film title.
    pub missing_film: usize,
    /// Repeats of a film within the same category (later row won).
    pub overwritten: usize,
    /// Repeats of a film under a different category (later row dropped).
    pub cross_category: usize,
    /// Films or categories whose label clashes with a node of another level.
    pub label_collisions: usize,
}

impl BuildStats {
    /// Total rows that produced no new item node.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.missing_group
            + self.missing_film
            + self.overwritten
            + self.cross_category
            + self.label_collisions
    }
}

/// A built tree together with its build statistics.
#[derive(Debug, Clone)]
pub struct Hierarchy {
    pub graph: FilmGraph,
    pub stats: BuildStats,
}

/// Builds the root → category → film tree.
///
/// # Errors
/// Returns `EmptyInput` if `records` is empty or every row lacks either a
/// usable group value or a film title.
pub fn build(records: &[FilmRecord], key: GroupKey) -> Result<Hierarchy> {
    if records.is_empty() {
        return Err(ReelError::EmptyInput);
    }

    let mut stats = BuildStats {
        rows: records.len(),
        ..BuildStats::default()
    };
    let groups = group_rows(records, key, &mut stats);
    if groups.is_empty() {
        return Err(ReelError::EmptyInput);
    }

    let root_label = key.root_label();
    let category_labels: HashSet<&str> = groups.iter().map(|(c, _)| *c).collect();

    let mut graph = FilmGraph::new();
    let root = graph.upsert(Node::root(root_label));
    let mut owner: HashMap<&str, usize> = HashMap::new();

    for (category, rows) in &groups {
        if *category == root_label {
            stats.label_collisions += rows.len();
            continue;
        }
        let cat = graph.upsert(Node::category(*category));
        graph.link(root, cat);

        let ctx = AttachContext {
            root_label,
            category_labels: &category_labels,
            category: cat,
        };
        for record in rows {
            attach_film(&mut graph, &mut owner, &mut stats, *record, &ctx);
        }
    }

    if stats.missing_group + stats.missing_film == stats.rows {
        return Err(ReelError::EmptyInput);
    }

    debug!(
        group = %key,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        ?stats,
        "built hierarchy"
    );
    Ok(Hierarchy { graph, stats })
}

/// Distinct usable group values in first-seen order.
#[must_use]
pub fn category_options(records: &[FilmRecord], key: GroupKey) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|r| key.category_of(r))
        .filter(|c| seen.insert(*c))
        .map(str::to_string)
        .collect()
}

fn group_rows<'r>(
    records: &'r [FilmRecord],
    key: GroupKey,
    stats: &mut BuildStats,
) -> Vec<(&'r str, Vec<&'r FilmRecord>)> {
    let mut order: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Vec<&FilmRecord>)> = Vec::new();

    for record in records {
        let Some(category) = key.category_of(record) else {
            stats.missing_group += 1;
            continue;
        };
        let slot = *order.entry(category).or_insert_with(|| {
            groups.push((category, Vec::new()));
            groups.len() - 1
        });
        if let Some((_, rows)) = groups.get_mut(slot) {
            rows.push(record);
        }
    }
    groups
}

struct AttachContext<'a> {
    root_label: &'a str,
    category_labels: &'a HashSet<&'a str>,
    category: usize,
}

fn attach_film<'r>(
    graph: &mut FilmGraph,
    owner: &mut HashMap<&'r str, usize>,
    stats: &mut BuildStats,
    record: &'r FilmRecord,
    ctx: &AttachContext<'_>,
) {
    let Some(film) = record.film.as_deref().filter(|f| !f.trim().is_empty()) else {
        stats.missing_film += 1;
        return;
    };
    if film == ctx.root_label || ctx.category_labels.contains(film) {
        debug!(film, "film title collides with a category label, skipped");
        stats.label_collisions += 1;
        return;
    }

    match owner.get(film) {
        Some(&first) if first != ctx.category => {
            debug!(film, "film already attached under another category, skipped");
            stats.cross_category += 1;
        }
        Some(_) => {
            stats.overwritten += 1;
            graph.upsert(Node::item(film, FilmMeta::from_record(record)));
        }
        None => {
            let idx = graph.upsert(Node::item(film, FilmMeta::from_record(record)));
            graph.link(ctx.category, idx);
            owner.insert(film, ctx.category);
        }
    }
}
