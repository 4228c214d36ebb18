// src/graph/mod.rs
//! The root → category → film hierarchy: model, builder and search filter.

pub mod builder;
pub mod filter;
pub mod model;
pub mod node;

pub use builder::{build, category_options, BuildStats, GroupKey, Hierarchy};
pub use filter::filter;
pub use model::FilmGraph;
pub use node::{FilmMeta, Level, Node, NOT_AVAILABLE};
