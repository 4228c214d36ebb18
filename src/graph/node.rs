// src/graph/node.rs
//! Node types: hierarchy level and the fixed film metadata record.

use serde::Serialize;
use std::fmt;

use crate::records::FilmRecord;

/// Sentinel for missing text metadata.
pub const NOT_AVAILABLE: &str = "N/A";

/// Depth of a node in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Root,
    Category,
    Item,
}

impl Level {
    /// Numeric rank: 0 for the root, 1 for categories, 2 for films.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::Root => 0,
            Self::Category => 1,
            Self::Item => 2,
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Root => "root",
            Self::Category => "category",
            Self::Item => "item",
        };
        f.write_str(name)
    }
}

/// Metadata carried by every film node. Each field always has a value;
/// missing source cells become `"N/A"` or `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilmMeta {
    pub genre: String,
    pub critic_score: String,
    pub audience_score: String,
    pub domestic_gross: f64,
    pub foreign_gross: f64,
    pub worldwide_gross: f64,
    pub budget: f64,
    pub oscar: String,
    pub bafta: String,
}

impl Default for FilmMeta {
    fn default() -> Self {
        Self {
            genre: NOT_AVAILABLE.to_string(),
            critic_score: NOT_AVAILABLE.to_string(),
            audience_score: NOT_AVAILABLE.to_string(),
            domestic_gross: 0.0,
            foreign_gross: 0.0,
            worldwide_gross: 0.0,
            budget: 0.0,
            oscar: NOT_AVAILABLE.to_string(),
            bafta: NOT_AVAILABLE.to_string(),
        }
    }
}

impl FilmMeta {
    /// Copies the metadata columns out of a record, substituting sentinels.
    #[must_use]
    pub fn from_record(record: &FilmRecord) -> Self {
        Self {
            genre: text_or_sentinel(record.genre.as_deref()),
            critic_score: text_or_sentinel(record.rotten_tomatoes.as_deref()),
            audience_score: text_or_sentinel(record.audience_score.as_deref()),
            domestic_gross: record.domestic_gross.unwrap_or(0.0),
            foreign_gross: record.foreign_gross.unwrap_or(0.0),
            worldwide_gross: record.worldwide_gross.unwrap_or(0.0),
            budget: record.budget.unwrap_or(0.0),
            oscar: text_or_sentinel(record.oscar.as_deref()),
            bafta: text_or_sentinel(record.bafta.as_deref()),
        }
    }
}

fn text_or_sentinel(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// A labelled vertex. `meta` is `Some` exactly for [`Level::Item`] nodes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    pub label: String,
    pub level: Level,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<FilmMeta>,
}

impl Node {
    #[must_use]
    pub fn root(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            level: Level::Root,
            meta: None,
        }
    }

    #[must_use]
    pub fn category(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            level: Level::Category,
            meta: None,
        }
    }

    #[must_use]
    pub fn item(label: impl Into<String>, meta: FilmMeta) -> Self {
        Self {
            label: label.into(),
            level: Level::Item,
            meta: Some(meta),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_metadata_uses_sentinels() {
        let record = FilmRecord::titled("D").genre("Horror");
        let meta = FilmMeta::from_record(&record);
        assert_eq!(meta.genre, "Horror");
        assert_eq!(meta.domestic_gross, 0.0);
        assert_eq!(meta.budget, 0.0);
        assert_eq!(meta.oscar, NOT_AVAILABLE);
        assert_eq!(meta.critic_score, NOT_AVAILABLE);
    }

    #[test]
    fn test_level_ranks() {
        assert_eq!(Level::Root.rank(), 0);
        assert_eq!(Level::Category.rank(), 1);
        assert_eq!(Level::Item.rank(), 2);
        assert!(Level::Root < Level::Item);
    }
}
