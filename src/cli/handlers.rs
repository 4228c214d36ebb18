// src/cli/handlers.rs
use crate::cli::args::{SourceArgs, TreeArgs};
use crate::config::Config;
use crate::exit::ReelExit;
use crate::graph::{build, category_options, filter, BuildStats, GroupKey, Hierarchy};
use crate::layout::{self, LayoutAlgorithm};
use crate::loader;
use crate::records::FilmRecord;
use crate::render::{self, Projection};
use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

/// JSON document printed by `tree --json`.
#[derive(Serialize)]
struct TreeReport<'a> {
    group: GroupKey,
    layout: LayoutAlgorithm,
    query: Option<&'a str>,
    stats: &'a BuildStats,
    projection: &'a Projection,
}

fn load_config() -> Result<Config> {
    Config::load().context("reading reeltree.toml")
}

/// Applies `--dir`, `--start` and `--end` over the config file's values.
fn apply_source(config: &mut Config, source: &SourceArgs) {
    if let Some(dir) = &source.dir {
        config.data.dir.clone_from(dir);
    }
    if let Some(start) = source.start {
        config.data.start_year = start;
    }
    if let Some(end) = source.end {
        config.data.end_year = end;
    }
}

/// Layers every `tree` flag over the config file's values.
fn apply_overrides(config: &mut Config, args: &TreeArgs) {
    apply_source(config, &args.source);
    if let Some(group) = &args.group {
        config.tree.group.clone_from(group);
    }
    if let Some(algorithm) = &args.layout {
        config.layout.algorithm.clone_from(algorithm);
    }
    if args.seed.is_some() {
        config.layout.seed = args.seed;
    }
}

fn load_records(config: &Config) -> Result<Vec<FilmRecord>> {
    let data = &config.data;
    let report = loader::load_years(&data.dir, data.start_year, data.end_year)
        .with_context(|| {
            format!(
                "loading {}-{} data from {}",
                data.start_year,
                data.end_year,
                data.dir.display()
            )
        })?;
    if !report.missing_years.is_empty() {
        let years: Vec<String> = report.missing_years.iter().map(ToString::to_string).collect();
        eprintln!("{}", format!("[WARN] No data for {}", years.join(", ")).yellow());
    }
    Ok(report.records)
}

/// Handles the tree command: load, build, filter, lay out and project.
///
/// # Errors
/// Returns error if config, data, group key or layout name is invalid.
pub fn handle_tree(args: &TreeArgs) -> Result<ReelExit> {
    let mut config = load_config()?;
    apply_overrides(&mut config, args);
    run_tree(&config, args.search.as_deref(), args.json, &mut io::stdout().lock())
}

/// Runs the tree pipeline with resolved settings, writing to `out`.
///
/// # Errors
/// Returns error if data, group key or layout name is invalid.
pub fn run_tree<W: Write>(
    config: &Config,
    search: Option<&str>,
    json: bool,
    out: &mut W,
) -> Result<ReelExit> {
    let key = config.group_key()?;
    let opts = config.layout_options()?;
    let records = load_records(config)?;

    let Hierarchy { graph, stats } = build(&records, key)?;
    let query = search.filter(|q| !q.is_empty());
    let graph = match query {
        Some(q) => filter(&graph, q),
        None => graph,
    };

    if graph.is_empty() {
        if json {
            write_json(
                out,
                &TreeReport {
                    group: key,
                    layout: opts.algorithm,
                    query,
                    stats: &stats,
                    projection: &Projection::default(),
                },
            )?;
        } else {
            writeln!(
                out,
                "{}",
                format!("No node matches '{}'", query.unwrap_or_default()).yellow()
            )?;
        }
        return Ok(ReelExit::EmptyResult);
    }

    let positions = layout::compute(&graph, &opts)?;
    let projection = render::project(&graph, &positions)?;

    if json {
        write_json(
            out,
            &TreeReport {
                group: key,
                layout: opts.algorithm,
                query,
                stats: &stats,
                projection: &projection,
            },
        )?;
    } else {
        writeln!(
            out,
            "{} {} nodes, {} edges ({} layout)",
            key.root_label().green().bold(),
            graph.node_count(),
            graph.edge_count(),
            opts.algorithm
        )?;
        if stats.skipped() > 0 {
            writeln!(
                out,
                "{}",
                format!("[WARN] {} of {} rows not attached", stats.skipped(), stats.rows).yellow()
            )?;
        }
        write!(out, "{}", render::describe(&projection))?;
    }
    Ok(ReelExit::Success)
}

fn write_json<W: Write, T: Serialize>(out: &mut W, value: &T) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string_pretty(value)?)?;
    Ok(())
}

/// Handles the options command: distinct categories for the grouping.
///
/// # Errors
/// Returns error if config, data or group key is invalid.
pub fn handle_options(source: &SourceArgs, group: Option<&str>, json: bool) -> Result<ReelExit> {
    let mut config = load_config()?;
    apply_source(&mut config, source);
    let key = match group {
        Some(g) => g.parse::<GroupKey>()?,
        None => config.group_key()?,
    };
    let records = load_records(&config)?;
    let options = category_options(&records, key);

    if json {
        write_json(&mut io::stdout().lock(), &options)?;
    } else {
        for option in &options {
            println!("{option}");
        }
    }
    if options.is_empty() {
        return Ok(ReelExit::EmptyResult);
    }
    Ok(ReelExit::Success)
}

/// Handles the preprocess command.
///
/// # Errors
/// Returns error if a CSV cannot be read or its output written.
pub fn handle_preprocess(source: &SourceArgs) -> Result<ReelExit> {
    let mut config = load_config()?;
    apply_source(&mut config, source);
    let (dir, start, end) = (&config.data.dir, config.data.start_year, config.data.end_year);
    let converted = loader::preprocess_years(dir, start, end)
        .with_context(|| format!("preprocessing CSVs in {}", dir.display()))?;

    if converted.is_empty() {
        println!(
            "{}",
            format!("No raw CSVs for {start}-{end} in {}", dir.display()).yellow()
        );
        return Ok(ReelExit::EmptyResult);
    }
    let years: Vec<String> = converted.iter().map(ToString::to_string).collect();
    println!("{} {}", "[OK] Converted".green().bold(), years.join(", "));
    Ok(ReelExit::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn data_dir() -> TempDir {
        let d = tempfile::tempdir().unwrap();
        fs::write(
            loader::json_path(d.path(), 2010),
            "{\"film\":\"A\",\"genre\":\"Drama\",\"major_studio\":\"Fox\"}\n\
             {\"film\":\"C\",\"genre\":\"Comedy\",\"major_studio\":\"Sony\"}\n",
        )
        .unwrap();
        d
    }

    fn config_for(dir: &Path, algorithm: &str) -> Config {
        let mut config = Config::default();
        config.data.dir = dir.to_path_buf();
        config.data.start_year = 2010;
        config.data.end_year = 2010;
        config.layout.algorithm = algorithm.to_string();
        config
    }

    fn run_json(config: &Config, search: Option<&str>) -> (ReelExit, serde_json::Value) {
        let mut out = Vec::new();
        let exit = run_tree(config, search, true, &mut out).unwrap();
        (exit, serde_json::from_slice(&out).unwrap())
    }

    #[test]
    fn test_flags_override_config_values() {
        let mut config = Config::parse(
            "[data]\ndir = \"from-file\"\nstart_year = 2007\nend_year = 2011\n\
             [tree]\ngroup = \"genre\"\n[layout]\nalgorithm = \"spring\"\nseed = 1\n",
        )
        .unwrap();
        let args = TreeArgs {
            source: SourceArgs {
                dir: Some("from-flag".into()),
                start: Some(2009),
                end: None,
            },
            group: Some("studio".into()),
            layout: Some("shell".into()),
            seed: Some(9),
            ..TreeArgs::default()
        };
        apply_overrides(&mut config, &args);

        assert_eq!(config.data.dir, Path::new("from-flag"));
        assert_eq!(config.data.start_year, 2009);
        assert_eq!(config.data.end_year, 2011);
        assert_eq!(config.tree.group, "studio");
        assert_eq!(config.layout.algorithm, "shell");
        assert_eq!(config.layout.seed, Some(9));
    }

    #[test]
    fn test_unset_flags_keep_config_values() {
        let mut config = Config::parse("[layout]\nalgorithm = \"circular\"\nseed = 4\n").unwrap();
        apply_overrides(&mut config, &TreeArgs::default());
        assert_eq!(config.layout.algorithm, "circular");
        assert_eq!(config.layout.seed, Some(4));
        assert_eq!(config.tree.group, "genre");
    }

    #[test]
    fn test_tree_json_report() {
        let d = data_dir();
        let (exit, report) = run_json(&config_for(d.path(), "circular"), None);
        assert_eq!(exit, ReelExit::Success);
        assert_eq!(report["group"], "genre");
        assert_eq!(report["layout"], "circular");
        assert!(report["query"].is_null());
        assert_eq!(report["projection"]["nodes"].as_array().unwrap().len(), 5);
        assert_eq!(report["projection"]["edges"].as_array().unwrap().len(), 4);
        assert_eq!(report["projection"]["nodes"][0]["label"], "Movies by Genre");
    }

    #[test]
    fn test_search_without_matches_is_empty_result() {
        let d = data_dir();
        let (exit, report) = run_json(&config_for(d.path(), "spring"), Some("western"));
        assert_eq!(exit, ReelExit::EmptyResult);
        assert_eq!(report["query"], "western");
        assert!(report["projection"]["nodes"].as_array().unwrap().is_empty());
        assert!(report["projection"]["edges"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_grouping_from_config_drives_tree() {
        let d = data_dir();
        let mut config = config_for(d.path(), "shell");
        config.tree.group = "studio".into();
        let (exit, report) = run_json(&config, Some("fox"));
        assert_eq!(exit, ReelExit::Success);
        let labels: Vec<&str> = report["projection"]["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|n| n["label"].as_str())
            .collect();
        assert_eq!(labels, vec!["Fox", "A"]);
    }

    #[test]
    fn test_text_summary() {
        let d = data_dir();
        let mut out = Vec::new();
        let exit = run_tree(&config_for(d.path(), "kamada_kawai"), None, false, &mut out).unwrap();
        assert_eq!(exit, ReelExit::Success);
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("5 nodes, 4 edges (kamada_kawai layout)"));
        assert!(text.contains("Comedy"));
    }

    #[test]
    fn test_unknown_layout_is_rejected_before_loading() {
        let config = config_for(Path::new("/nonexistent"), "grid");
        let err = run_tree(&config, None, true, &mut Vec::<u8>::new()).unwrap_err();
        assert_eq!(ReelExit::for_error(&err), ReelExit::InvalidInput);
    }
}
