use std::collections::HashSet;

use super::{HighlightState, RenderGraph};

pub(super) fn build_highlight_state(cache: &RenderGraph, selected_id: &str) -> Option<HighlightState> {
    let &selected = cache.index_by_id.get(selected_id)?;

    let mut related_nodes = HashSet::from([selected]);
    let mut related_edges = HashSet::new();
    for &edge_index in cache.incident.get(selected).into_iter().flatten() {
        let edge = cache.edges[edge_index];
        related_edges.insert(edge_index);
        related_nodes.insert(if edge.source == selected { edge.target } else { edge.source });
    }

    Some(HighlightState {
        related_nodes,
        related_edges,
    })
}
