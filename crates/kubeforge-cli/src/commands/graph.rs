//! Graph command - infer relationships between resources

use clap::ValueEnum;
use kubeforge_core::{ForgeConfig, GraphBuilder};
use std::path::PathBuf;

use crate::display;
use crate::error::Result;
use crate::util;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// Layers with outgoing edges
    Text,
    /// Nodes and edges for a topology view
    Json,
}

pub fn run(files: &[PathBuf], format: GraphFormat, config: &ForgeConfig) -> Result<()> {
    let resources: Vec<_> = util::load_resources(files)?
        .into_iter()
        .map(|loaded| loaded.resource)
        .collect();
    let graph = GraphBuilder::new(config.layout).build(&resources)?;

    match format {
        GraphFormat::Json => println!("{}", serde_json::to_string_pretty(&graph)?),
        GraphFormat::Text => display::print_graph(&graph),
    }
    Ok(())
}
