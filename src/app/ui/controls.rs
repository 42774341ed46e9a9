use eframe::egui::{self, Align, Layout, Ui};
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::export::{PhysicsOptions, Solver};

use super::super::graph::fuzzy_match_score;
use super::super::ViewModel;

const SEARCH_RESULT_ROWS: usize = 40;

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Graph Controls");
        ui.separator();
        ui.add_space(4.0);

        ui.label("Search (name or id)")
            .on_hover_text("Fuzzy-highlight matching people without changing the rendered graph.");
        ui.text_edit_singleline(&mut self.search)
            .on_hover_text("Type to highlight matching people, then pick one below to select it.");
        self.draw_search_results(ui);

        ui.separator();

        let mut changed = false;
        let max_weight = self.max_weight.max(1);
        changed |= ui
            .add(egui::Slider::new(&mut self.min_edge_weight, 1..=max_weight).text("Min shared servers"))
            .on_hover_text("Hide connections with fewer shared servers than this.")
            .changed();
        changed |= ui
            .checkbox(&mut self.hide_isolated, "Hide people without connections")
            .changed();
        ui.checkbox(&mut self.show_labels, "Show labels")
            .on_hover_text("Label every person once zoomed in far enough.");

        if changed {
            self.graph_dirty = true;
        }

        ui.separator();
        self.draw_physics_controls(ui);
    }

    fn draw_search_results(&mut self, ui: &mut Ui) {
        let query = self.search.trim();
        if query.is_empty() {
            return;
        }

        let matcher = SkimMatcherV2::default();
        let mut hits = self
            .graph
            .nodes
            .iter()
            .filter_map(|node| {
                let score = fuzzy_match_score(&matcher, &node.name, query)
                    .max(fuzzy_match_score(&matcher, &node.id, query))?;
                Some((score, node.id.clone(), node.name.clone(), node.mutual_count))
            })
            .collect::<Vec<_>>();
        hits.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.2.cmp(&b.2)));
        hits.truncate(SEARCH_RESULT_ROWS);

        if hits.is_empty() {
            ui.small("No matches.");
            return;
        }

        let mut picked = None;
        egui::ScrollArea::vertical()
            .id_salt("search_results_scroll")
            .max_height(180.0)
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (_, id, name, mutual_count) in &hits {
                    let is_selected = self.selected.as_deref() == Some(id.as_str());
                    let clicked = ui
                        .horizontal(|ui| {
                            let clicked = ui.selectable_label(is_selected, name.as_str()).clicked();
                            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                ui.label(format!("{mutual_count} mutual"));
                            });
                            clicked
                        })
                        .inner;
                    if clicked {
                        picked = Some(id.clone());
                    }
                }
            });

        if let Some(id) = picked {
            self.focus_on(&id);
            self.set_selected(Some(id));
        }
    }

    fn draw_physics_controls(&mut self, ui: &mut Ui) {
        ui.add_enabled_ui(self.physics.enabled, |ui| {
            ui.checkbox(&mut self.live_physics, "Live physics simulation")
                .on_hover_text("Continuously simulate layout forces while viewing the graph.");
        });
        if !self.physics.enabled {
            ui.small("Physics is disabled in the layout options.");
        }

        ui.collapsing("Physics tuning", |ui| {
            let mut changed = false;

            egui::ComboBox::from_label("Solver")
                .selected_text(self.physics.solver.label())
                .show_ui(ui, |ui| {
                    for solver in [Solver::ForceAtlas2Based, Solver::BarnesHut] {
                        changed |= ui
                            .selectable_value(&mut self.physics.solver, solver, solver.label())
                            .changed();
                    }
                });

            let params = self.physics.active_mut();
            changed |= ui
                .add(
                    egui::Slider::new(&mut params.gravitational_constant, -5000.0..=0.0)
                        .text("Gravitational constant")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("Negative values push people apart.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut params.central_gravity, 0.0..=1.0)
                        .text("Central gravity")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("Pull toward the centre of the canvas.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut params.spring_length, 10.0..=400.0)
                        .text("Spring length")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("Rest length of a connection.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut params.spring_constant, 0.0..=0.5)
                        .text("Spring constant")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("How strongly connected people pull toward the rest length.")
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut params.damping, 0.0..=1.0)
                        .text("Damping")
                        .clamping(egui::SliderClamping::Always),
                )
                .changed();
            changed |= ui
                .add(
                    egui::Slider::new(&mut self.physics.min_velocity, 0.01..=5.0)
                        .text("Min velocity")
                        .clamping(egui::SliderClamping::Always),
                )
                .on_hover_text("The simulation sleeps once every person moves slower than this.")
                .changed();

            ui.horizontal(|ui| {
                if ui.button("Reset to defaults").clicked() {
                    let enabled = self.physics.enabled;
                    self.physics = PhysicsOptions {
                        enabled,
                        ..PhysicsOptions::default()
                    };
                    changed = true;
                }
                if ui.button("Re-seed layout").clicked() {
                    self.graph_cache = None;
                    self.graph_dirty = true;
                }
            });

            if changed {
                self.physics_sleeping = false;
            }
        });
    }
}
