//! Layered layout

use std::collections::BTreeMap;

use super::{GraphNode, Position};
use crate::config::LayoutConfig;

/// Place every node at `(layer * column_width, row * row_height)`, where
/// `row` is the node's index among the nodes of its layer in input order.
pub fn assign_positions(nodes: &mut [GraphNode], config: &LayoutConfig) {
    let mut rows: BTreeMap<u32, u32> = BTreeMap::new();
    for node in nodes.iter_mut() {
        let row = rows.entry(node.layer).or_insert(0);
        node.position = Position {
            x: f64::from(node.layer) * config.column_width,
            y: f64::from(*row) * config.row_height,
        };
        *row += 1;
    }
}

/// Node ids grouped by layer, front to back
pub fn layers(nodes: &[GraphNode]) -> BTreeMap<u32, Vec<&str>> {
    let mut layers: BTreeMap<u32, Vec<&str>> = BTreeMap::new();
    for node in nodes {
        layers.entry(node.layer).or_default().push(&node.id);
    }
    layers
}
