use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use super::build::{build_from_edges, build_from_nested};
use super::parse::{LineagePayload, parse_payload};
use super::tree::LineageTree;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineageSource {
    File(PathBuf),
    Stdin,
}

impl LineageSource {
    pub fn from_arg(arg: &str) -> Self {
        if arg == "-" {
            Self::Stdin
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Stdin => "<stdin>".to_owned(),
        }
    }

    fn read(&self) -> Result<String> {
        match self {
            Self::File(path) => std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display())),
            Self::Stdin => {
                let mut raw = String::new();
                std::io::stdin()
                    .read_to_string(&mut raw)
                    .context("failed to read lineage JSON from stdin")?;
                Ok(raw)
            }
        }
    }
}

pub fn load_lineage(source: &LineageSource, initial_depth: usize) -> Result<LineageTree> {
    let raw = source.read()?;
    tree_from_json(&raw, initial_depth)
        .with_context(|| format!("failed to load lineage from {}", source.label()))
}

pub fn tree_from_json(raw: &str, initial_depth: usize) -> Result<LineageTree> {
    let tree = match parse_payload(raw)? {
        LineagePayload::Edges(edges) => build_from_edges(&edges, initial_depth)?,
        LineagePayload::Nested(root) => build_from_nested(&root, initial_depth)?,
        LineagePayload::Empty => build_from_edges(&[], initial_depth)?,
    };

    info!(
        nodes = tree.node_count(),
        max_depth = tree.max_depth(),
        "loaded lineage tree"
    );
    Ok(tree)
}
