//! CLI commands

pub mod export;
pub mod graph;
pub mod kinds;
pub mod new;
pub mod validate;
