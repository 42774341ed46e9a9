use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use super::{ExportOptions, GraphExport};
use crate::graph::{GraphEdge, GraphNode, SocialGraph};

#[derive(Serialize)]
struct Document<'a> {
    nodes: &'a [GraphNode],
    edges: &'a [GraphEdge],
    options: &'a ExportOptions,
}

pub struct JsonExport {
    path: PathBuf,
}

impl JsonExport {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl GraphExport for JsonExport {
    fn export(&self, graph: &SocialGraph, options: &ExportOptions) -> Result<()> {
        let file = File::create(&self.path)
            .with_context(|| format!("failed to create {}", self.path.display()))?;
        let mut writer = BufWriter::new(file);

        let document = Document {
            nodes: &graph.nodes,
            edges: &graph.edges,
            options,
        };
        serde_json::to_writer_pretty(&mut writer, &document)
            .with_context(|| format!("failed to write graph to {}", self.path.display()))?;
        writer
            .flush()
            .with_context(|| format!("failed to flush {}", self.path.display()))?;

        info!(path = %self.path.display(), "graph exported");
        Ok(())
    }
}
