// src/lib.rs
//! Film hierarchies grouped by genre or studio, with 2-D layouts, search
//! filtering and a plot-ready projection.

pub mod cli;
pub mod config;
pub mod error;
pub mod exit;
pub mod graph;
pub mod layout;
pub mod loader;
pub mod records;
pub mod render;
