// src/records.rs
//! The record table: one cleaned row per film.
//!
//! Rows arrive from JSON lines produced by the preprocessing step, where
//! numbers may still be strings (`"$1,200"`) and any cell may be null. The
//! deserializers here accept all of those shapes so a malformed cell never
//! aborts a load; the builder decides what a missing value means.

use serde::{Deserialize, Deserializer, Serialize};

/// A single film row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilmRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub film: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub major_studio: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub rotten_tomatoes: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub audience_score: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub domestic_gross: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub foreign_gross: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub worldwide_gross: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub budget: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub oscar: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub bafta: Option<String>,
    /// Source year. Carried for the loader; the graph ignores it.
    #[serde(default, deserialize_with = "lenient_year")]
    pub year: Option<i32>,
}

impl FilmRecord {
    /// Starts a record with only a title set.
    #[must_use]
    pub fn titled(film: impl Into<String>) -> Self {
        Self {
            film: Some(film.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    #[must_use]
    pub fn studio(mut self, studio: impl Into<String>) -> Self {
        self.major_studio = Some(studio.into());
        self
    }

    #[must_use]
    pub fn scores(mut self, critic: impl Into<String>, audience: impl Into<String>) -> Self {
        self.rotten_tomatoes = Some(critic.into());
        self.audience_score = Some(audience.into());
        self
    }

    #[must_use]
    pub fn grosses(mut self, domestic: f64, foreign: f64, worldwide: f64) -> Self {
        self.domestic_gross = Some(domestic);
        self.foreign_gross = Some(foreign);
        self.worldwide_gross = Some(worldwide);
        self
    }

    #[must_use]
    pub fn budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    #[must_use]
    pub fn awards(mut self, oscar: impl Into<String>, bafta: impl Into<String>) -> Self {
        self.oscar = Some(oscar.into());
        self.bafta = Some(bafta.into());
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Number(f64),
    Text(String),
    Flag(bool),
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<RawCell>::deserialize(deserializer)?;
    Ok(cell.and_then(|c| match c {
        RawCell::Number(n) if n.is_finite() => Some(format_plain_number(n)),
        RawCell::Number(_) => None,
        RawCell::Text(s) => Some(s),
        RawCell::Flag(b) => Some(b.to_string()),
    }))
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<RawCell>::deserialize(deserializer)?;
    Ok(cell.and_then(|c| match c {
        RawCell::Number(n) => Some(n).filter(|n| n.is_finite()),
        RawCell::Text(s) => parse_money(&s),
        RawCell::Flag(_) => None,
    }))
}

#[allow(clippy::cast_possible_truncation)]
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let cell = Option::<RawCell>::deserialize(deserializer)?;
    Ok(cell.and_then(|c| match c {
        RawCell::Number(n) if n.is_finite() => Some(n as i32),
        RawCell::Text(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

/// Parses a money cell such as `"$1,234.5"`; returns `None` when the text
/// is not a number once `$` and `,` are removed.
#[must_use]
pub fn parse_money(raw: &str) -> Option<f64> {
    let cleaned: String = raw.chars().filter(|c| *c != '$' && *c != ',').collect();
    cleaned
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Renders a number without a trailing `.0` for whole values.
#[must_use]
pub fn format_plain_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}
