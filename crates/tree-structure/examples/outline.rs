//! CLI example that sorts a structure dump and prints it as an outline
//!
//! Usage:
//!   cargo run --example outline structure.json
//!
//! The file holds the JSON array served by `get_tree_structure`, with names.

use std::env;
use tree_structure::prelude::*;

fn main() {
    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: outline <structure.json>");
        std::process::exit(2);
    };

    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let edges: Vec<EdgeRecord> = match serde_json::from_str(&text) {
        Ok(edges) => edges,
        Err(e) => {
            eprintln!("Error parsing {}: {}", path, e);
            std::process::exit(1);
        }
    };

    let tree = StructureTree::new(&edges);
    println!("Edges: {} ({} reachable)", edges.len(), tree.node_count());
    println!("Roots: {}", tree.roots().len());
    println!("Leaves: {}", tree.leaves().len());
    println!();
    println!("{}", render_outline(&edges));
}
