use eframe::egui::{self, Align, Context, Layout, Vec2};

use crate::export::PhysicsOptions;
use crate::graph::SocialGraph;

use super::super::textures::AvatarTextures;
use super::super::ViewModel;

impl ViewModel {
    pub(in crate::app) fn new(graph: SocialGraph, physics: PhysicsOptions, textures: AvatarTextures) -> Self {
        let max_weight = graph.edges.iter().map(|edge| edge.weight).max().unwrap_or(1);

        Self {
            graph,
            live_physics: physics.enabled,
            physics,
            physics_sleeping: false,
            search: String::new(),
            selected: None,
            min_edge_weight: 1,
            hide_isolated: false,
            show_labels: true,
            pan: Vec2::ZERO,
            zoom: 1.0,
            graph_dirty: true,
            render_graph_revision: 0,
            graph_cache: None,
            search_match_cache: None,
            textures,
            max_weight,
            visible_node_count: 0,
            visible_edge_count: 0,
        }
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        if self.graph_dirty {
            self.rebuild_render_graph();
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("mutual-graph");
                    ui.separator();
                    ui.label(format!("people: {}", self.graph.node_count()));
                    ui.label(format!("connections: {}", self.graph.edge_count()));

                    let (loaded, expected) = self.textures.progress();
                    if self.textures.is_loading() {
                        ui.spinner();
                        ui.label(format!("avatars: {loaded}/{expected}"));
                    } else {
                        ui.label(format!("avatars: {loaded}"));
                    }

                    if ui.button("Rebuild graph").clicked() {
                        self.graph_dirty = true;
                    }
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(self.visible_graph_text());
                        if self.live_physics && self.physics_sleeping {
                            ui.label("layout settled");
                        }
                    });
                });
            });

        egui::SidePanel::left("controls")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }

    fn visible_graph_text(&self) -> String {
        format!(
            "visible: {} people, {} connections",
            self.visible_node_count, self.visible_edge_count
        )
    }

    pub(in crate::app) fn set_selected(&mut self, selected: Option<String>) {
        if self.selected == selected {
            return;
        }

        self.selected = selected;
        if self.hide_isolated {
            self.graph_dirty = true;
        }
    }
}
