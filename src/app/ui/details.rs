use eframe::egui::{self, Align, Layout, RichText, Ui};

use crate::inventory::ProcessStatus;

use super::super::render_utils::status_color;
use super::super::state::ViewEvent;
use super::super::ViewModel;

struct ProcessRow {
    id: String,
    name: String,
    status: ProcessStatus,
    group: String,
    weight: f32,
    connections: usize,
}

impl ViewModel {
    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.horizontal(|ui| {
            ui.heading("Asset Details");
            if self.view.selected_asset_id().is_some() {
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.button("Close").clicked() {
                        self.dispatch(ViewEvent::Closed);
                    }
                });
            }
        });
        ui.add_space(6.0);

        let Some(asset) = self.selected_asset() else {
            ui.label("Click a hexagon to inspect its most affected asset.");
            return;
        };

        let (ok, warning, error) = asset.status_counts();
        let title = asset.name.clone();
        let facts = [
            ("Id", asset.id.clone()),
            ("Kind", asset.kind.label().to_owned()),
            ("Environment", asset.group.clone()),
            ("Observed", asset.date.format("%Y-%m-%d").to_string()),
            (
                "Anomalous",
                if asset.anomalous { "yes" } else { "no" }.to_owned(),
            ),
            ("Processes", asset.processes.len().to_string()),
        ];
        let anomalous = asset.anomalous;
        let rows = asset
            .processes
            .iter()
            .filter(|process| !self.flagged_only || process.status.is_flagged())
            .map(|process| ProcessRow {
                id: process.id.clone(),
                name: process.name.clone(),
                status: process.status,
                group: process.group.clone(),
                weight: process.weight,
                connections: process.connections.len(),
            })
            .collect::<Vec<_>>();

        let title_color = if anomalous {
            status_color(ProcessStatus::Error)
        } else {
            ui.visuals().strong_text_color()
        };
        ui.label(RichText::new(title).strong().color(title_color));

        egui::Grid::new("asset_facts")
            .num_columns(2)
            .show(ui, |ui| {
                for (label, value) in facts {
                    ui.label(label);
                    ui.label(value);
                    ui.end_row();
                }
            });

        ui.horizontal(|ui| {
            for (status, count) in [
                (ProcessStatus::Ok, ok),
                (ProcessStatus::Warning, warning),
                (ProcessStatus::Error, error),
            ] {
                let text = format!("{} {count}", status.label());
                ui.label(RichText::new(text).color(status_color(status)));
            }
        });

        ui.separator();
        ui.horizontal(|ui| {
            ui.label(RichText::new("Processes").strong());
            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                ui.checkbox(&mut self.flagged_only, "Only flagged")
                    .on_hover_text("Hide processes whose status is ok.");
            });
        });

        let expanded = self.view.expanded_process_id().map(str::to_owned);
        let mut toggled = None;

        if rows.is_empty() {
            ui.label("No processes match the current filter.");
        } else {
            egui::ScrollArea::vertical()
                .id_salt("process_list_scroll")
                .max_height(240.0)
                .auto_shrink([false, true])
                .show_rows(ui, 22.0, rows.len(), |ui, row_range| {
                    for row in &rows[row_range] {
                        let is_expanded = expanded.as_deref() == Some(row.id.as_str());
                        ui.horizontal(|ui| {
                            let (dot, _) = ui.allocate_exact_size(
                                egui::vec2(10.0, 10.0),
                                egui::Sense::hover(),
                            );
                            ui.painter()
                                .circle_filled(dot.center(), 4.0, status_color(row.status));

                            let label = if row.status.is_flagged() {
                                let marker = if is_expanded { "v" } else { ">" };
                                let response = ui
                                    .selectable_label(is_expanded, format!("{marker} {}", row.name))
                                    .on_hover_text("Show or hide this process's dependency graph.");
                                if response.clicked() {
                                    toggled = Some(row.id.clone());
                                }
                                response
                            } else {
                                ui.label(row.name.as_str())
                            };
                            label.on_hover_text(format!(
                                "{}  |  {}  |  {} connections",
                                row.id, row.group, row.connections
                            ));

                            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                ui.small(format!("w {:.2}", row.weight));
                                ui.label(
                                    RichText::new(row.status.label())
                                        .color(status_color(row.status)),
                                );
                            });
                        });
                    }
                });
        }

        if let Some(process_id) = toggled {
            self.dispatch(ViewEvent::ProcessToggled(&process_id));
        }

        if self.dependency_graph.is_some() {
            ui.separator();
            self.draw_dependency_graph(ui);
        }
    }
}
