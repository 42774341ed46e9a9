use std::collections::{HashMap, HashSet};

use eframe::egui::{Vec2, vec2};

use crate::util::stable_pair;

use super::super::render_utils::node_radius;
use super::super::{PhysicsScratch, RenderEdge, RenderGraph, RenderNode, ViewModel, ViewScratch};

impl RenderGraph {
    pub(in crate::app) fn new(nodes: Vec<RenderNode>, edges: Vec<RenderEdge>) -> Self {
        let index_by_id = nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.clone(), index))
            .collect::<HashMap<_, _>>();

        let mut incident = vec![Vec::new(); nodes.len()];
        for (edge_index, edge) in edges.iter().enumerate() {
            incident[edge.source].push(edge_index);
            incident[edge.target].push(edge_index);
        }

        Self {
            nodes,
            edges,
            index_by_id,
            incident,
            physics_scratch: PhysicsScratch {
                forces: Vec::new(),
                positions: Vec::new(),
                masses: Vec::new(),
            },
            view_scratch: ViewScratch {
                screen_positions: Vec::new(),
                screen_radii: Vec::new(),
                visible_indices: Vec::new(),
                visible_mask: Vec::new(),
                draw_order: Vec::new(),
                draw_order_dirty: true,
            },
        }
    }
}

pub(in crate::app) fn seed_position(id: &str, index: usize, spread: f32) -> Vec2 {
    let (jx, jy) = stable_pair(id);
    let mut direction = vec2(jx, jy);
    if direction.length_sq() <= 0.0001 {
        let angle = ((index as f32) * 0.618_034 + 0.11) * std::f32::consts::TAU;
        direction = vec2(angle.cos(), angle.sin());
    } else {
        direction = direction.normalized();
    }

    direction * (spread * 0.25 + (index as f32).sqrt() * spread * 0.4)
}

impl ViewModel {
    fn filtered_edges(&self, index_of: &HashMap<&str, usize>) -> Vec<(usize, usize, usize)> {
        self.graph
            .edges
            .iter()
            .filter(|edge| edge.weight >= self.min_edge_weight)
            .filter_map(|edge| {
                let source = *index_of.get(edge.source.as_str())?;
                let target = *index_of.get(edge.target.as_str())?;
                (source != target).then_some((source, target, edge.weight))
            })
            .collect()
    }

    pub(in crate::app) fn rebuild_render_graph(&mut self) {
        self.render_graph_revision = self.render_graph_revision.wrapping_add(1);
        self.search_match_cache = None;
        self.physics_sleeping = false;

        let index_of = self.graph.index_by_id();
        let edges = self.filtered_edges(&index_of);

        let mut connected = HashSet::new();
        for &(source, target, _) in &edges {
            connected.insert(source);
            connected.insert(target);
        }

        let kept = self
            .graph
            .nodes
            .iter()
            .enumerate()
            .filter(|(index, node)| {
                !self.hide_isolated
                    || connected.contains(index)
                    || self.selected.as_deref() == Some(node.id.as_str())
            })
            .map(|(index, _)| index)
            .collect::<Vec<_>>();

        if kept.is_empty() {
            self.graph_cache = None;
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            self.graph_dirty = false;
            return;
        }

        let render_index = kept
            .iter()
            .enumerate()
            .map(|(render, &graph_index)| (graph_index, render))
            .collect::<HashMap<_, _>>();
        let render_edges = edges
            .iter()
            .filter_map(|&(source, target, weight)| {
                Some(RenderEdge {
                    source: *render_index.get(&source)?,
                    target: *render_index.get(&target)?,
                    weight,
                })
            })
            .collect::<Vec<_>>();

        let mut degree = vec![0usize; kept.len()];
        for edge in &render_edges {
            degree[edge.source] += 1;
            degree[edge.target] += 1;
        }

        let mut prior = self
            .graph_cache
            .take()
            .map(|cache| {
                cache
                    .nodes
                    .into_iter()
                    .map(|node| (node.id.clone(), node))
                    .collect::<HashMap<_, _>>()
            })
            .unwrap_or_default();

        let spread = self.physics.active().spring_length.max(20.0);
        let nodes = kept
            .iter()
            .enumerate()
            .map(|(render, &graph_index)| {
                let node = &self.graph.nodes[graph_index];
                let base_radius = node_radius(node.size);
                match prior.remove(&node.id) {
                    Some(previous) => RenderNode {
                        base_radius,
                        degree: degree[render],
                        ..previous
                    },
                    None => RenderNode {
                        id: node.id.clone(),
                        world_pos: seed_position(&node.id, graph_index, spread),
                        velocity: Vec2::ZERO,
                        base_radius,
                        degree: degree[render],
                    },
                }
            })
            .collect::<Vec<_>>();

        let cache = RenderGraph::new(nodes, render_edges);
        self.visible_node_count = cache.nodes.len();
        self.visible_edge_count = cache.edges.len();
        self.graph_cache = Some(cache);
        self.graph_dirty = false;
    }
}
