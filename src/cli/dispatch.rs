// src/cli/dispatch.rs
//! Command dispatch, kept out of the binary.

use super::args::{Commands, TreeArgs};
use super::handlers::{handle_options, handle_preprocess, handle_tree};
use crate::exit::ReelExit;
use anyhow::Result;

/// Executes the parsed command.
///
/// # Errors
/// Returns error if the command handler fails.
pub fn execute(command: Commands) -> Result<ReelExit> {
    match command {
        Commands::Tree {
            source,
            group,
            layout,
            seed,
            search,
            json,
        } => handle_tree(&TreeArgs {
            source,
            group,
            layout,
            seed,
            search,
            json,
        }),
        Commands::Options {
            source,
            group,
            json,
        } => handle_options(&source, group.as_deref(), json),
        Commands::Preprocess { source } => handle_preprocess(&source),
    }
}
