use eframe::egui::{self, Align2, Color32, FontId, Rect, Sense, Stroke, Ui, Vec2, vec2};

use super::super::render_utils::{centered_to_screen, dim_color, status_color};
use super::super::ViewModel;

const GRAPH_HEIGHT: f32 = 280.0;
const GRAPH_MARGIN: f32 = 26.0;

fn fit_scale(rect: Rect, positions: impl Iterator<Item = (Vec2, f32)>) -> f32 {
    let extent = positions.fold(Vec2::ZERO, |extent, (position, radius)| {
        extent.max(position.abs() + Vec2::splat(radius))
    });
    let available = (rect.size() * 0.5 - Vec2::splat(GRAPH_MARGIN)).max(Vec2::splat(1.0));
    let scale_x = if extent.x > 0.0 { available.x / extent.x } else { 1.0 };
    let scale_y = if extent.y > 0.0 { available.y / extent.y } else { 1.0 };
    scale_x.min(scale_y).min(1.6)
}

impl ViewModel {
    pub(in crate::app) fn draw_dependency_graph(&mut self, ui: &mut Ui) {
        let Some(graph) = self.dependency_graph.as_mut() else {
            return;
        };

        if graph.step() {
            ui.ctx().request_repaint();
        }

        ui.label(
            egui::RichText::new(format!(
                "Dependencies of {}",
                graph.nodes.first().map_or("process", |node| node.label.as_str())
            ))
            .strong(),
        );
        ui.small(format!(
            "{} nodes, {} links (illustrative)",
            graph.nodes.len(),
            graph.edges.len()
        ));

        let width = ui.available_width();
        let (rect, response) = ui.allocate_exact_size(vec2(width, GRAPH_HEIGHT), Sense::hover());
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 6.0, Color32::from_rgb(22, 26, 32));

        let scale = fit_scale(
            rect,
            graph
                .bodies
                .iter()
                .map(|body| (body.position, body.radius)),
        );
        let screen = graph
            .bodies
            .iter()
            .map(|body| centered_to_screen(rect, body.position, scale))
            .collect::<Vec<_>>();
        let pointer = response.hover_pos();

        for &(from, to) in &graph.edges {
            let (Some(&start), Some(&end)) = (screen.get(from), screen.get(to)) else {
                continue;
            };
            let touches_root = from == 0 || to == 0;
            let stroke = if touches_root {
                Stroke::new(1.6, Color32::from_rgba_unmultiplied(200, 200, 210, 170))
            } else {
                Stroke::new(1.0, Color32::from_rgba_unmultiplied(120, 128, 140, 120))
            };
            painter.line_segment([start, end], stroke);
        }

        let mut hovered = None;
        for (index, (node, body)) in graph.nodes.iter().zip(&graph.bodies).enumerate() {
            let position = screen[index];
            let radius = (body.radius * scale).clamp(3.0, 12.0);
            let color = if node.linked || index == 0 {
                status_color(node.status)
            } else {
                dim_color(status_color(node.status), 0.8)
            };

            painter.circle_filled(position, radius, color);
            if index == 0 {
                painter.circle_stroke(
                    position,
                    radius + 3.0,
                    Stroke::new(1.6, Color32::from_gray(235)),
                );
            }

            if pointer.is_some_and(|pointer| pointer.distance(position) <= radius + 2.0) {
                hovered = Some(index);
            }

            if index == 0 || node.linked {
                painter.text(
                    position + vec2(radius + 4.0, 0.0),
                    Align2::LEFT_CENTER,
                    node.label.as_str(),
                    FontId::proportional(11.0),
                    Color32::from_gray(230),
                );
            }
        }

        if let Some(node) = hovered.and_then(|index| graph.nodes.get(index)) {
            painter.text(
                rect.left_top() + vec2(8.0, 8.0),
                Align2::LEFT_TOP,
                format!("{}  |  {}", node.label, node.status.label()),
                FontId::proportional(12.0),
                Color32::from_gray(240),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::Pos2;

    use super::*;

    #[test]
    fn fit_scale_keeps_bodies_inside_the_canvas() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(300.0, 200.0));
        let bodies = [(vec2(-400.0, 10.0), 6.0), (vec2(120.0, 150.0), 9.0)];
        let scale = fit_scale(rect, bodies.into_iter());

        for (position, radius) in bodies {
            let screen = centered_to_screen(rect, position, scale);
            let reach = radius * scale;
            assert!(screen.x - reach >= rect.left() && screen.x + reach <= rect.right());
            assert!(screen.y - reach >= rect.top() && screen.y + reach <= rect.bottom());
        }
    }

    #[test]
    fn small_graphs_are_not_blown_up() {
        let rect = Rect::from_min_size(Pos2::ZERO, vec2(300.0, 300.0));
        assert_eq!(fit_scale(rect, [(vec2(1.0, 1.0), 1.0)].into_iter()), 1.6);
    }
}
