use std::collections::HashMap;

use eframe::egui::{self, Pos2, Rect, Ui, Vec2};

use super::super::hexbin::HexGrid;
use super::super::render_utils::screen_to_world;
use super::super::state::{Transform, ViewEvent};

const RESIZE_SETTLE_SECS: f64 = 0.35;
const MIN_CANVAS_EXTENT: f32 = 1.0;

pub(in crate::app) fn hexmap_zoom_event(
    ui: &Ui,
    rect: Rect,
    response: &egui::Response,
) -> Option<ViewEvent<'static>> {
    if !response.hovered() {
        return None;
    }

    let (scroll, pinch) = ui.input(|input| (input.raw_scroll_delta.y, input.zoom_delta()));
    let factor = if scroll.abs() > f32::EPSILON {
        (1.0 + (scroll * 0.0018)).clamp(0.85, 1.15)
    } else {
        1.0
    } * pinch;
    if (factor - 1.0).abs() <= f32::EPSILON {
        return None;
    }

    let pointer = ui
        .input(|input| input.pointer.hover_pos())
        .unwrap_or_else(|| rect.center());
    Some(ViewEvent::Zoomed {
        factor,
        anchor: pointer - rect.min,
    })
}

pub(in crate::app) fn hexmap_pan_event(response: &egui::Response) -> Option<ViewEvent<'static>> {
    let delta = response.drag_delta();
    if response.dragged() && delta != Vec2::ZERO {
        Some(ViewEvent::Panned(delta))
    } else {
        None
    }
}

pub(in crate::app) fn hovered_cell(
    grid: HexGrid,
    rect: Rect,
    transform: Transform,
    index_by_key: &HashMap<(i32, i32), usize>,
    pointer: Option<Pos2>,
) -> Option<usize> {
    let pointer = pointer.filter(|pointer| rect.contains(*pointer))?;
    let world = screen_to_world(rect, transform, pointer);
    index_by_key.get(&grid.cell_key(world)).copied()
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(in crate::app) enum ResizeDecision {
    Unchanged,
    Settling,
    Regenerate(Vec2),
}

#[derive(Clone, Copy, Debug, Default)]
pub(in crate::app) struct ResizeDebounce {
    pending: Option<(Vec2, f64)>,
}

impl ResizeDebounce {
    pub(in crate::app) fn observe(
        &mut self,
        generated_for: Vec2,
        canvas: Vec2,
        now: f64,
    ) -> ResizeDecision {
        if canvas.x < MIN_CANVAS_EXTENT
            || canvas.y < MIN_CANVAS_EXTENT
            || same_size(canvas, generated_for)
        {
            self.pending = None;
            return ResizeDecision::Unchanged;
        }

        match self.pending {
            Some((size, since)) if same_size(size, canvas) => {
                if now - since >= RESIZE_SETTLE_SECS {
                    self.pending = None;
                    ResizeDecision::Regenerate(canvas)
                } else {
                    ResizeDecision::Settling
                }
            }
            _ => {
                self.pending = Some((canvas, now));
                ResizeDecision::Settling
            }
        }
    }

    pub(in crate::app) fn reset(&mut self) {
        self.pending = None;
    }
}

fn same_size(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() < 1.0 && (a.y - b.y).abs() < 1.0
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    #[test]
    fn resize_waits_for_the_size_to_settle() {
        let generated = vec2(800.0, 600.0);
        let wider = vec2(900.0, 600.0);
        let mut debounce = ResizeDebounce::default();

        let first = debounce.observe(generated, generated, 0.0);
        assert_eq!(first, ResizeDecision::Unchanged);
        let dragging = debounce.observe(generated, vec2(820.0, 600.0), 1.0);
        assert_eq!(dragging, ResizeDecision::Settling);
        // still dragging the window edge
        assert_eq!(debounce.observe(generated, wider, 1.2), ResizeDecision::Settling);
        assert_eq!(debounce.observe(generated, wider, 1.4), ResizeDecision::Settling);
        assert_eq!(debounce.observe(generated, wider, 1.6), ResizeDecision::Regenerate(wider));
    }

    #[test]
    fn resize_back_to_generated_size_cancels() {
        let generated = vec2(800.0, 600.0);
        let narrow = vec2(500.0, 600.0);
        let mut debounce = ResizeDebounce::default();
        debounce.observe(generated, narrow, 0.0);
        assert_eq!(debounce.observe(generated, generated, 0.1), ResizeDecision::Unchanged);
        assert_eq!(debounce.observe(generated, narrow, 5.0), ResizeDecision::Settling);
    }

    #[test]
    fn collapsed_canvas_is_ignored() {
        let mut debounce = ResizeDebounce::default();
        assert_eq!(
            debounce.observe(vec2(800.0, 600.0), vec2(0.0, 0.0), 10.0),
            ResizeDecision::Unchanged
        );
    }

    #[test]
    fn hover_resolves_through_pan_and_zoom() {
        let grid = HexGrid::new(20.0);
        let rect = Rect::from_min_size(Pos2::new(100.0, 50.0), vec2(600.0, 400.0));
        let transform = Transform {
            pan: vec2(30.0, -10.0),
            zoom: 2.0,
        };
        let world = grid.cell_center((3, 4));
        let screen = rect.min + transform.pan + world.to_vec2() * transform.zoom;
        let index_by_key = HashMap::from([((3, 4), 7usize)]);

        assert_eq!(
            hovered_cell(grid, rect, transform, &index_by_key, Some(screen)),
            Some(7)
        );
        assert_eq!(hovered_cell(grid, rect, transform, &index_by_key, None), None);
        assert_eq!(
            hovered_cell(grid, rect, transform, &index_by_key, Some(Pos2::new(5.0, 5.0))),
            None
        );
    }
}
