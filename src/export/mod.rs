mod json;
mod options;

pub use json::JsonExport;
pub use options::{ExportOptions, PhysicsOptions, Solver, SolverParams, load_options};

use crate::graph::SocialGraph;

pub trait GraphExport {
    fn export(&self, graph: &SocialGraph, options: &ExportOptions) -> anyhow::Result<()>;
}
