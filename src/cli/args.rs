// src/cli/args.rs
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reeltree", version, about = "Hollywood film hierarchies, laid out and searchable")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
    /// Enable debug logging (overridden by `RUST_LOG`)
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build, filter and lay out the film tree
    Tree {
        #[command(flatten)]
        source: SourceArgs,
        /// Category column: genre or studio
        #[arg(long, short)]
        group: Option<String>,
        /// spring, circular, shell or kamada_kawai
        #[arg(long, short)]
        layout: Option<String>,
        /// Seed for the spring layout
        #[arg(long)]
        seed: Option<u64>,
        /// Case-insensitive label search
        #[arg(long, short)]
        search: Option<String>,
        /// Print the projection as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the categories available for a grouping
    Options {
        #[command(flatten)]
        source: SourceArgs,
        #[arg(long, short)]
        group: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Convert raw yearly CSV exports into JSON-lines data files
    Preprocess {
        #[command(flatten)]
        source: SourceArgs,
    },
}

/// Where the yearly data lives; unset fields fall back to `reeltree.toml`.
#[derive(Args, Debug, Clone, Default)]
pub struct SourceArgs {
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,
    /// First year to load (inclusive)
    #[arg(long)]
    pub start: Option<i32>,
    /// Last year to load (inclusive)
    #[arg(long)]
    pub end: Option<i32>,
}

/// Options for the tree command (used by handlers)
#[derive(Debug, Clone, Default)]
pub struct TreeArgs {
    pub source: SourceArgs,
    pub group: Option<String>,
    pub layout: Option<String>,
    pub seed: Option<u64>,
    pub search: Option<String>,
    pub json: bool,
}
