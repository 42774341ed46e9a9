use std::collections::HashMap;
use std::path::PathBuf;

use serde::Serialize;

use crate::dataset::Person;

pub fn node_size(mutual_count: usize) -> f32 {
    (mutual_count as f32 * 5.0) + 10.0
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphNode {
    pub id: String,
    pub name: String,
    pub mutual_count: usize,
    pub label: String,
    pub image: Option<PathBuf>,
    pub size: f32,
    pub tooltip: String,
}

impl GraphNode {
    pub fn from_person(person: &Person) -> Self {
        let mutual_count = person.mutual_count();
        Self {
            id: person.id.clone(),
            name: person.name.clone(),
            mutual_count,
            label: format!("{}\n({mutual_count} mutual)", person.name),
            image: None,
            size: node_size(mutual_count),
            tooltip: format!("Mutual servers: {mutual_count}"),
        }
    }
}

/// Undirected; `source` is always the endpoint that comes first in node order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: usize,
    pub tooltip: String,
}

impl GraphEdge {
    pub fn new(source: String, target: String, weight: usize) -> Self {
        Self {
            source,
            target,
            weight,
            tooltip: format!("Shared servers: {weight}"),
        }
    }

    pub fn other(&self, id: &str) -> Option<&str> {
        if self.source == id {
            Some(&self.target)
        } else if self.target == id {
            Some(&self.source)
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SocialGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl SocialGraph {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn index_by_id(&self) -> HashMap<&str, usize> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.as_str(), index))
            .collect()
    }

    pub fn weight(&self, a: &str, b: &str) -> Option<usize> {
        self.edges
            .iter()
            .find(|edge| edge.other(a) == Some(b))
            .map(|edge| edge.weight)
    }

    pub fn neighbors(&self, id: &str) -> Vec<(&str, usize)> {
        let mut neighbors = self
            .edges
            .iter()
            .filter_map(|edge| edge.other(id).map(|other| (other, edge.weight)))
            .collect::<Vec<_>>();
        neighbors.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        neighbors
    }

    pub fn with_images(mut self, mut image_for: impl FnMut(&str) -> Option<PathBuf>) -> Self {
        for node in &mut self.nodes {
            node.image = image_for(&node.id);
        }
        self
    }
}
