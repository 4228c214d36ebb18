// src/loader.rs
//! Yearly data ingest and CSV cleanup.
//!
//! Raw yearly CSVs (`Most Profitable Hollywood Stories - US {year}.csv`)
//! are cleaned into `{year}_data.json` JSON-lines files, which are then
//! loaded and concatenated into a record table for a range of years.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use regex::Regex;
use serde_json::{Map, Number, Value};
use tracing::{debug, info, warn};

use crate::error::{ReelError, Result};
use crate::records::{parse_money, FilmRecord};

/// Path of the cleaned JSON-lines file for `year`.
#[must_use]
pub fn json_path(dir: &Path, year: i32) -> PathBuf {
    dir.join(format!("{year}_data.json"))
}

/// Path of the raw CSV export for `year`.
#[must_use]
pub fn csv_path(dir: &Path, year: i32) -> PathBuf {
    dir.join(format!("Most Profitable Hollywood Stories - US {year}.csv"))
}

/// Records loaded for a year range, with the years that had no file.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub records: Vec<FilmRecord>,
    pub loaded_years: Vec<i32>,
    pub missing_years: Vec<i32>,
}

/// Loads every `{year}_data.json` in `start..=end`, in year order.
///
/// # Errors
/// Returns `EmptyInput` if no file exists in the range, or the first read
/// or parse error encountered.
pub fn load_years(dir: &Path, start: i32, end: i32) -> Result<LoadReport> {
    let years: Vec<i32> = (start..=end).collect();
    let loaded: Vec<(i32, Option<Result<Vec<FilmRecord>>>)> = years
        .par_iter()
        .map(|&year| (year, load_year(dir, year)))
        .collect();

    let mut report = LoadReport::default();
    for (year, outcome) in loaded {
        match outcome {
            None => {
                warn!(year, path = %json_path(dir, year).display(), "data file not found");
                report.missing_years.push(year);
            }
            Some(rows) => {
                let rows = rows?;
                debug!(year, rows = rows.len(), "loaded year");
                report.records.extend(rows);
                report.loaded_years.push(year);
            }
        }
    }

    if report.loaded_years.is_empty() {
        return Err(ReelError::EmptyInput);
    }
    info!(
        rows = report.records.len(),
        years = report.loaded_years.len(),
        "loaded records"
    );
    Ok(report)
}

fn load_year(dir: &Path, year: i32) -> Option<Result<Vec<FilmRecord>>> {
    let path = json_path(dir, year);
    if !path.is_file() {
        return None;
    }
    Some(
        fs::read_to_string(&path)
            .map_err(|e| ReelError::io(e, &path))
            .and_then(|content| parse_json_lines(&content, Some(year))),
    )
}

/// Parses JSON lines into records, normalising keys first. When `year` is
/// given it overrides any year in the rows.
///
/// # Errors
/// Returns a JSON error for a line that is not a valid object.
pub fn parse_json_lines(content: &str, year: Option<i32>) -> Result<Vec<FilmRecord>> {
    let mut records = Vec::new();
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        let value: Value = serde_json::from_str(line)?;
        let value = match value {
            Value::Object(map) => Value::Object(normalize_keys(map)),
            other => other,
        };
        let mut record: FilmRecord = serde_json::from_value(value)?;
        if year.is_some() {
            record.year = year;
        }
        records.push(record);
    }
    Ok(records)
}

/// `" Major Studio "` → `"major_studio"`.
#[must_use]
pub fn normalize_key(key: &str) -> String {
    key.trim().replace(' ', "_").to_lowercase()
}

fn normalize_keys(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter().map(|(k, v)| (normalize_key(&k), v)).collect()
}

/// Reads a raw CSV export and returns cleaned rows.
///
/// Headers are trimmed, lowercased, spaces become `_` and `$ , ( )` are
/// dropped; a repeated header keeps its first column. Columns whose name
/// contains `gross` or `budget` are parsed as money, anything unparseable
/// becoming null.
///
/// # Errors
/// Returns an error if the file cannot be read as CSV.
pub fn preprocess_csv(path: &Path) -> Result<Vec<Map<String, Value>>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::None)
        .from_path(path)?;

    let strip = Regex::new(r"[$,()]")?;
    let mut seen = HashSet::new();
    let columns: Vec<(usize, String, bool)> = reader
        .headers()?
        .iter()
        .map(|h| clean_header(h, &strip))
        .enumerate()
        .filter(|(_, name)| seen.insert(name.clone()))
        .map(|(idx, name)| {
            let money = name.contains("gross") || name.contains("budget");
            (idx, name, money)
        })
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row: Map<String, Value> = columns
            .iter()
            .map(|(idx, name, money)| {
                let cell = record.get(*idx).unwrap_or("");
                let value = if *money { money_cell(cell) } else { infer_cell(cell) };
                (name.clone(), value)
            })
            .collect();
        rows.push(row);
    }
    debug!(path = %path.display(), rows = rows.len(), columns = columns.len(), "cleaned csv");
    Ok(rows)
}

fn clean_header(raw: &str, strip: &Regex) -> String {
    let lowered = raw.trim().to_lowercase().replace(' ', "_");
    strip.replace_all(&lowered, "").into_owned()
}

fn money_cell(cell: &str) -> Value {
    parse_money(cell)
        .and_then(Number::from_f64)
        .map_or(Value::Null, Value::Number)
}

fn infer_cell(cell: &str) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return Value::Number(i.into());
    }
    if let Some(n) = trimmed.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(cell.to_string())
}

/// Writes rows as JSON lines.
///
/// # Errors
/// Returns an error if serialisation or the write fails.
pub fn write_json_lines(rows: &[Map<String, Value>], path: &Path) -> Result<()> {
    let mut out = String::new();
    for row in rows {
        out.push_str(&serde_json::to_string(row)?);
        out.push('\n');
    }
    fs::write(path, out).map_err(|e| ReelError::io(e, path))
}

/// Converts each raw yearly CSV found in `start..=end` into its JSON-lines
/// file. Returns the years converted.
///
/// # Errors
/// Returns the first read, parse or write error.
pub fn preprocess_years(dir: &Path, start: i32, end: i32) -> Result<Vec<i32>> {
    let mut converted = Vec::new();
    for year in start..=end {
        let source = csv_path(dir, year);
        if !source.is_file() {
            warn!(year, path = %source.display(), "raw csv not found");
            continue;
        }
        let rows = preprocess_csv(&source)?;
        let target = json_path(dir, year);
        write_json_lines(&rows, &target)?;
        info!(year, rows = rows.len(), path = %target.display(), "wrote cleaned data");
        converted.push(year);
    }
    Ok(converted)
}
