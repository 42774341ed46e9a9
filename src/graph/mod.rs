mod build;
mod model;

pub use build::{OverlapGraphBuilder, candidate_pairs, server_groups};
pub use model::{GraphEdge, GraphNode, SocialGraph, node_size};
