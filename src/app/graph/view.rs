use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, Vec2, pos2, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use super::super::highlight::build_highlight_state;
use super::super::physics::step_physics;
use super::super::render_utils::{
    NEUTRAL_NODE, blend_color, dim_color, draw_background, edge_visible, edge_width, world_to_screen,
};
use super::super::{RenderGraph, SearchMatchCache, ViewModel};

pub(in crate::app) fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_lowercase(), &query.to_lowercase()))
}

impl ViewModel {
    fn update_screen_space(rect: Rect, pan: Vec2, zoom: f32, cache: &mut RenderGraph) {
        let scratch = &mut cache.view_scratch;
        scratch.screen_positions.clear();
        scratch.screen_radii.clear();
        for node in &cache.nodes {
            scratch
                .screen_positions
                .push(world_to_screen(rect, pan, zoom, node.world_pos));
            scratch
                .screen_radii
                .push((node.base_radius * zoom.powf(0.6)).clamp(3.0, 64.0));
        }
    }

    fn ensure_draw_order(cache: &mut RenderGraph) {
        if !cache.view_scratch.draw_order_dirty && cache.view_scratch.draw_order.len() == cache.nodes.len() {
            return;
        }

        let nodes = &cache.nodes;
        let order = &mut cache.view_scratch.draw_order;
        order.clear();
        order.extend(0..nodes.len());
        order.sort_by(|a, b| nodes[*a].base_radius.total_cmp(&nodes[*b].base_radius));
        cache.view_scratch.draw_order_dirty = false;
    }

    pub(in crate::app) fn cached_search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        if let Some(cached) = &self.search_match_cache
            && cached.graph_revision == self.render_graph_revision
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let cache = self.graph_cache.as_ref()?;
        let matcher = SkimMatcherV2::default();
        let matches = cache
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, render_node)| {
                let name = self
                    .graph
                    .node(&render_node.id)
                    .map(|node| node.name.as_str())
                    .unwrap_or_default();
                fuzzy_match_score(&matcher, name, query).is_some()
                    || fuzzy_match_score(&matcher, &render_node.id, query).is_some()
            })
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            graph_revision: self.render_graph_revision,
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        draw_background(&painter, rect);

        self.handle_graph_zoom(ui, rect, &response);
        self.handle_graph_pan(&response);

        let search_matches = self.cached_search_matches();
        let pan = self.pan;
        let zoom = self.zoom;
        let frame_delta_seconds = ui
            .ctx()
            .input(|input| input.stable_dt)
            .clamp(1.0 / 240.0, 1.0 / 20.0);

        let Some(cache) = self.graph_cache.as_mut() else {
            self.visible_node_count = 0;
            self.visible_edge_count = 0;
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "No people match the current filters.",
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
            return;
        };

        if self.live_physics && self.physics.enabled {
            let moving = step_physics(cache, &self.physics, frame_delta_seconds);
            self.physics_sleeping = !moving;
            if moving {
                ui.ctx().request_repaint();
            }
        }
        if response.dragged() {
            ui.ctx().request_repaint();
        }

        Self::update_screen_space(rect, pan, zoom, cache);
        Self::visible_indices_into(
            rect,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
            &mut cache.view_scratch.visible_indices,
        );
        cache.view_scratch.visible_mask.clear();
        cache.view_scratch.visible_mask.resize(cache.nodes.len(), false);
        for &index in &cache.view_scratch.visible_indices {
            cache.view_scratch.visible_mask[index] = true;
        }
        self.visible_node_count = cache.view_scratch.visible_indices.len();

        let hovered = Self::hovered_index(
            ui,
            &cache.view_scratch.visible_indices,
            &cache.view_scratch.screen_positions,
            &cache.view_scratch.screen_radii,
        );
        if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        let pending_selection = response
            .clicked_by(egui::PointerButton::Primary)
            .then(|| hovered.map(|index| cache.nodes[index].id.clone()));

        let highlight = self
            .selected
            .as_deref()
            .and_then(|id| build_highlight_state(cache, id));
        let search_active = search_matches.as_ref().is_some_and(|matches| !matches.is_empty());

        let zoom_sqrt = zoom.sqrt();
        let max_weight = self.max_weight;
        let mut visible_edge_count = 0usize;
        for (edge_index, edge) in cache.edges.iter().enumerate() {
            let start = cache.view_scratch.screen_positions[edge.source];
            let end = cache.view_scratch.screen_positions[edge.target];
            let any_end_visible =
                cache.view_scratch.visible_mask[edge.source] || cache.view_scratch.visible_mask[edge.target];
            if !any_end_visible && !edge_visible(rect, start, end, 2.5) {
                continue;
            }

            let related = highlight
                .as_ref()
                .is_some_and(|state| state.related_edges.contains(&edge_index));
            let color = if related {
                Color32::from_rgb(241, 186, 94)
            } else if highlight.is_some() || search_active {
                Color32::from_rgba_unmultiplied(90, 96, 108, 70)
            } else {
                Color32::from_rgba_unmultiplied(150, 156, 170, 150)
            };
            let width = edge_width(edge.weight, max_weight, zoom_sqrt) * if related { 1.4 } else { 1.0 };

            painter.line_segment([start, end], Stroke::new(width, color));
            visible_edge_count += 1;

            let is_hovered_edge = hovered.is_some_and(|index| index == edge.source || index == edge.target);
            if related && is_hovered_edge && zoom > 0.6 {
                painter.text(
                    start + (end - start) * 0.5,
                    Align2::CENTER_CENTER,
                    edge.weight.to_string(),
                    FontId::proportional(11.0),
                    Color32::from_gray(230),
                );
            }
        }
        self.visible_edge_count = visible_edge_count;

        let selected_color = Color32::from_rgb(245, 206, 93);
        let mut selection_animating = false;

        Self::ensure_draw_order(cache);
        for &index in &cache.view_scratch.draw_order {
            if !cache.view_scratch.visible_mask[index] {
                continue;
            }

            let render_node = &cache.nodes[index];
            let position = cache.view_scratch.screen_positions[index];
            let radius = cache.view_scratch.screen_radii[index];

            let is_selected = self.selected.as_deref() == Some(render_node.id.as_str());
            let is_hovered = hovered == Some(index);
            let is_related = highlight
                .as_ref()
                .is_some_and(|state| state.related_nodes.contains(&index));
            let is_search_match = search_matches
                .as_ref()
                .is_some_and(|matches| matches.contains(&index));
            let faded = (highlight.is_some() && !is_related) || (search_active && !is_search_match);

            let selection_mix = ui.ctx().animate_bool(
                ui.make_persistent_id(("person-selection", render_node.id.as_str())),
                is_selected,
            );
            if selection_mix > 0.0 && selection_mix < 1.0 {
                selection_animating = true;
            }

            match self.textures.get(&render_node.id) {
                Some(texture) => {
                    let tint = if faded { Color32::from_gray(90) } else { Color32::WHITE };
                    painter.image(
                        texture.id(),
                        Rect::from_center_size(position, Vec2::splat(radius * 2.0)),
                        Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0)),
                        tint,
                    );
                }
                None => {
                    let fill = if faded { dim_color(NEUTRAL_NODE, 0.45) } else { NEUTRAL_NODE };
                    painter.circle_filled(position, radius, fill);
                }
            }

            let ring = if is_hovered {
                Color32::from_rgb(255, 164, 101)
            } else if is_search_match {
                Color32::from_rgb(103, 196, 255)
            } else if is_related {
                Color32::from_rgb(241, 186, 94)
            } else {
                Color32::from_rgba_unmultiplied(15, 15, 15, 190)
            };
            let ring = blend_color(ring, selected_color, selection_mix);
            painter.circle_stroke(position, radius, Stroke::new(1.2 + selection_mix * 1.6, ring));

            if selection_mix > 0.0 {
                let halo_strength = (selection_mix * (1.0 - selection_mix) * 4.0).clamp(0.0, 1.0);
                let halo_alpha = (30.0 + (halo_strength * 145.0)) as u8;
                painter.circle_stroke(
                    position,
                    radius + 4.0 + ((1.0 - selection_mix) * 6.0),
                    Stroke::new(
                        1.0 + (halo_strength * 1.6),
                        Color32::from_rgba_unmultiplied(245, 206, 93, halo_alpha),
                    ),
                );
            }

            let should_draw_label = is_selected
                || is_hovered
                || (is_related && highlight.is_some())
                || (self.show_labels && !faded && zoom > 0.55);
            if should_draw_label && let Some(node) = self.graph.node(&render_node.id) {
                painter.text(
                    position + vec2(0.0, radius + 4.0),
                    Align2::CENTER_TOP,
                    node.label.as_str(),
                    FontId::proportional(12.0),
                    Color32::WHITE,
                );
            }
        }

        if selection_animating {
            ui.ctx().request_repaint();
        }

        if let Some(index) = hovered
            && let Some(node) = self.graph.node(&cache.nodes[index].id)
        {
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}", node.name, node.tooltip),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if let Some(selected) = pending_selection {
            self.set_selected(selected);
        }
    }
}
