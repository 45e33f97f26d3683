use std::time::Duration;

use eframe::egui::{self, Align2, Color32, FontId, Sense, Shape, Stroke, Ui, vec2};

use super::super::hexbin::{HexGrid, alert_color, alert_intensity, worst_member};
use super::super::render_utils::{
    blend_color, circle_visible, dim_color, draw_background, group_color, world_to_screen,
};
use super::super::state::ViewEvent;
use super::super::ViewModel;
use super::interaction::{ResizeDecision, hexmap_pan_event, hexmap_zoom_event, hovered_cell};

const SELECTED_COLOR: Color32 = Color32::from_rgb(245, 206, 93);
const SEARCH_COLOR: Color32 = Color32::from_rgb(103, 196, 255);
const ANOMALOUS_DOT_COLOR: Color32 = Color32::from_rgb(236, 64, 64);

impl ViewModel {
    pub(in crate::app) fn draw_hexmap(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());

        let now = ui.input(|input| input.time);
        match self.resize.observe(self.inventory.viewport, rect.size(), now) {
            ResizeDecision::Unchanged => {}
            ResizeDecision::Settling => {
                ui.ctx().request_repaint_after(Duration::from_millis(100));
            }
            ResizeDecision::Regenerate(canvas) => self.regenerate(canvas),
        }

        if let Some(event) = hexmap_zoom_event(ui, rect, &response) {
            self.dispatch(event);
        }
        if let Some(event) = hexmap_pan_event(&response) {
            self.dispatch(event);
        }

        let painter = ui.painter_at(rect);
        let transform = self.view.transform;
        draw_background(&painter, rect, transform);

        if self.inventory.day_assets(self.view.date_index).is_empty() {
            let message = if self.inventory.is_empty() {
                "The inventory is empty."
            } else {
                "No assets observed on this day."
            };
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                message,
                FontId::proportional(15.0),
                Color32::from_gray(170),
            );
            if response.clicked_by(egui::PointerButton::Primary) {
                self.dispatch(ViewEvent::CellClicked(None));
            }
            return;
        }

        let (cells, index_by_key) = self.cached_cells();
        let search_matches = self.cached_search_matches();
        let search_active = search_matches.is_some();
        let grid = HexGrid::new(self.hex_radius);
        let zoom = transform.zoom;
        let screen_radius = grid.radius() * zoom;
        let selected_asset_id = self.view.selected_asset_id();

        let pointer = ui.input(|input| input.pointer.hover_pos());
        let hovered = hovered_cell(grid, rect, transform, &index_by_key, pointer);
        if hovered.is_some() {
            ui.output_mut(|output| {
                output.cursor_icon = egui::CursorIcon::PointingHand;
            });
        }

        let assets = &self.inventory.assets;
        for (slot, cell) in cells.iter().enumerate() {
            let center = world_to_screen(rect, transform, cell.center);
            if !circle_visible(rect, center, screen_radius) {
                continue;
            }

            let matched = search_matches
                .as_ref()
                .is_some_and(|matches| cell.members.iter().any(|index| matches.contains(index)));
            let holds_selection = selected_asset_id.is_some_and(|id| {
                cell.members
                    .iter()
                    .any(|&index| assets.get(index).is_some_and(|asset| asset.id == id))
            });

            let base = alert_color(cell.anomalous);
            let fill = if matched {
                blend_color(base, SEARCH_COLOR, 0.45)
            } else if search_active {
                dim_color(base, 0.45)
            } else {
                base
            };

            let corners = grid
                .hexagon(cell.center)
                .map(|corner| world_to_screen(rect, transform, corner))
                .to_vec();
            let outline = if holds_selection {
                Stroke::new(2.4, SELECTED_COLOR)
            } else if hovered == Some(slot) {
                Stroke::new(2.0, Color32::from_gray(235))
            } else {
                Stroke::new(
                    1.0 + alert_intensity(cell.anomalous) * 1.2,
                    Color32::from_rgba_unmultiplied(12, 14, 18, 200),
                )
            };
            painter.add(Shape::convex_polygon(corners, fill, outline));

            if screen_radius > 24.0 {
                painter.text(
                    center + vec2(0.0, -screen_radius * 0.55),
                    Align2::CENTER_CENTER,
                    cell.members.len().to_string(),
                    FontId::proportional(11.0),
                    Color32::from_gray(225),
                );
            }
        }

        let dot_scale = zoom.sqrt();
        for cell in cells.iter() {
            for &index in &cell.members {
                let Some(asset) = assets.get(index) else {
                    continue;
                };
                let position = world_to_screen(rect, transform, asset.position);
                let radius = (asset.radius * dot_scale).clamp(1.5, 12.0);
                if !circle_visible(rect, position, radius) {
                    continue;
                }

                let color = if asset.anomalous {
                    ANOMALOUS_DOT_COLOR
                } else {
                    let group_index = self
                        .inventory
                        .groups
                        .iter()
                        .position(|group| group == &asset.group)
                        .unwrap_or(0);
                    group_color(group_index)
                };
                painter.circle_filled(position, radius, color);

                if selected_asset_id == Some(asset.id.as_str()) {
                    painter.circle_stroke(position, radius + 3.0, Stroke::new(1.8, SELECTED_COLOR));
                }
            }
        }

        if let Some(cell) = hovered.and_then(|slot| cells.get(slot)) {
            let worst = worst_member(cell, assets).and_then(|index| assets.get(index));
            let status_text = format!(
                "{} assets  |  {} anomalous  |  worst: {}",
                cell.members.len(),
                cell.anomalous,
                worst.map_or("-", |asset| asset.name.as_str())
            );
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                status_text,
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if response.clicked_by(egui::PointerButton::Primary) {
            let clicked = hovered
                .and_then(|slot| cells.get(slot))
                .and_then(|cell| worst_member(cell, &self.inventory.assets));
            let next = self.view.reduce(ViewEvent::CellClicked(
                clicked.and_then(|index| self.inventory.assets.get(index)),
            ));
            self.commit_view(next);
        }
    }
}
