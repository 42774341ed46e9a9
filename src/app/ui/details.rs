use eframe::egui::{self, RichText, Ui, Vec2};

use super::super::ViewModel;

const AVATAR_PREVIEW_SIZE: f32 = 96.0;

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.heading("Selection Details");
        ui.add_space(6.0);

        let Some(selected_id) = self.selected.clone() else {
            ui.label("Select a person from the graph or the search results.");
            return;
        };

        let Some(node) = self.graph.node(&selected_id) else {
            ui.label("Selected person no longer exists in the graph.");
            return;
        };

        if let Some(texture) = self.textures.get(&node.id) {
            ui.add(egui::Image::new((texture.id(), Vec2::splat(AVATAR_PREVIEW_SIZE))));
            ui.add_space(4.0);
        }

        ui.label(RichText::new(node.name.as_str()).strong());
        ui.small(node.id.as_str());
        ui.add_space(6.0);
        ui.label(node.tooltip.as_str());
        if node.image.is_none() {
            ui.small("No avatar could be resolved.");
        }

        let neighbors = self
            .graph
            .neighbors(&selected_id)
            .into_iter()
            .map(|(id, weight)| {
                let name = self.graph.node(id).map_or(id, |neighbor| neighbor.name.as_str());
                (id.to_owned(), name.to_owned(), weight)
            })
            .collect::<Vec<_>>();

        ui.separator();
        ui.label(RichText::new(format!("Connections ({})", neighbors.len())).strong());

        let mut picked = None;
        if neighbors.is_empty() {
            ui.label("Shares no servers with anyone else in the dataset.");
        } else {
            egui::ScrollArea::vertical()
                .id_salt("neighbors_scroll")
                .max_height(360.0)
                .auto_shrink([false, false])
                .show_rows(ui, 22.0, neighbors.len(), |ui, row_range| {
                    for (id, name, weight) in &neighbors[row_range] {
                        let label = format!("{name}  ({weight} shared)");
                        if ui.link(label).on_hover_text(id.as_str()).clicked() {
                            picked = Some(id.clone());
                        }
                    }
                });
        }

        ui.separator();
        let clear = ui.button("Clear selection").clicked();

        if let Some(id) = picked {
            self.focus_on(&id);
            self.set_selected(Some(id));
        } else if clear {
            self.set_selected(None);
        }
    }
}
