use eframe::egui::{self, Key, Response, RichText, Ui};

use crate::config::{MAX_HEX_RADIUS, MIN_HEX_RADIUS};
use crate::util::format_percent;

use super::super::render_utils::group_color;
use super::super::ViewModel;

const SLIDER_KEY_BASE_RATE: f32 = 6.0;
const SLIDER_KEY_ACCEL_PER_SEC: f32 = 4.0;
const SLIDER_KEY_ACCEL_MAX: f32 = 12.0;

#[derive(Clone, Copy, Default)]
struct SliderKeyHoldState {
    positive_secs: f32,
    negative_secs: f32,
    integer_carry: f32,
}

fn slider_key_accel_multiplier(hold_secs: f32) -> f32 {
    let ramp = hold_secs * SLIDER_KEY_ACCEL_PER_SEC;
    (1.0 + ramp + ramp * ramp * 0.15).min(SLIDER_KEY_ACCEL_MAX)
}

fn held_arrow_delta(ui: &Ui, response: &Response, step: f32) -> Option<(f32, SliderKeyHoldState)> {
    let state_id = response.id.with("arrow_key_hold_state");
    let mut hold_state = ui.ctx().data(|data| {
        data.get_temp::<SliderKeyHoldState>(state_id)
            .unwrap_or_default()
    });

    if !response.has_focus() {
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, SliderKeyHoldState::default()));
        return None;
    }

    let (delta_time, increase_down, decrease_down) = ui.input(|input| {
        (
            input.stable_dt.min(0.1),
            input.key_down(Key::ArrowRight) || input.key_down(Key::ArrowUp),
            input.key_down(Key::ArrowLeft) || input.key_down(Key::ArrowDown),
        )
    });

    hold_state.positive_secs = if increase_down {
        hold_state.positive_secs + delta_time
    } else {
        0.0
    };
    hold_state.negative_secs = if decrease_down {
        hold_state.negative_secs + delta_time
    } else {
        0.0
    };

    let direction = (increase_down as i8) - (decrease_down as i8);
    if direction == 0 {
        hold_state.integer_carry = 0.0;
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, hold_state));
        return None;
    }

    let hold_secs = if direction > 0 {
        hold_state.positive_secs
    } else {
        hold_state.negative_secs
    };
    let speed = SLIDER_KEY_BASE_RATE * slider_key_accel_multiplier(hold_secs);
    ui.ctx().request_repaint();
    Some((direction as f32 * step * speed * delta_time, hold_state))
}

fn store_hold_state(ui: &Ui, response: &Response, hold_state: SliderKeyHoldState) {
    let state_id = response.id.with("arrow_key_hold_state");
    ui.ctx()
        .data_mut(|data| data.insert_temp(state_id, hold_state));
}

fn apply_slider_arrow_acceleration_f32(
    ui: &Ui,
    response: &Response,
    value: &mut f32,
    min: f32,
    max: f32,
    step: f32,
) -> bool {
    let Some((delta, hold_state)) = held_arrow_delta(ui, response, step) else {
        return false;
    };
    store_hold_state(ui, response, hold_state);

    let old_value = *value;
    *value = (*value + delta).clamp(min, max);
    (*value - old_value).abs() > f32::EPSILON
}

fn apply_slider_arrow_acceleration_usize(
    ui: &Ui,
    response: &Response,
    value: &mut usize,
    min: usize,
    max: usize,
) -> bool {
    let Some((delta, mut hold_state)) = held_arrow_delta(ui, response, 1.0) else {
        return false;
    };

    hold_state.integer_carry += delta;
    let whole_delta = hold_state.integer_carry.trunc() as isize;
    hold_state.integer_carry -= whole_delta as f32;
    store_hold_state(ui, response, hold_state);

    let old_value = *value;
    if whole_delta != 0 {
        *value = (*value as isize + whole_delta).clamp(min as isize, max as isize) as usize;
    }
    *value != old_value
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Timeline");
        ui.separator();
        self.draw_timeline(ui);

        ui.separator();
        self.draw_counters(ui);

        ui.separator();
        ui.label(RichText::new("Environments").strong());
        self.draw_group_legend(ui);

        ui.separator();
        ui.label("Search assets (name or id)")
            .on_hover_text("Fuzzy-highlight cells holding matching assets on the selected day.");
        ui.text_edit_singleline(&mut self.search);
        if let Some(matches) = self.cached_search_matches() {
            ui.small(format!("{} matching assets", matches.len()));
        }

        ui.separator();
        let radius_slider = ui
            .add(
                egui::Slider::new(&mut self.hex_radius, MIN_HEX_RADIUS..=MAX_HEX_RADIUS)
                    .step_by(1.0)
                    .text("Hex radius")
                    .clamping(egui::SliderClamping::Always),
            )
            .on_hover_text("Bin size of the hexagon grid, in canvas pixels.");
        if radius_slider.hovered() {
            radius_slider.request_focus();
        }
        apply_slider_arrow_acceleration_f32(
            ui,
            &radius_slider,
            &mut self.hex_radius,
            MIN_HEX_RADIUS,
            MAX_HEX_RADIUS,
            1.0,
        );

        ui.add_space(6.0);
        if ui
            .button("Regenerate")
            .on_hover_text("Generate a new inventory with a fresh random seed.")
            .clicked()
        {
            self.regenerate_with_new_seed();
        }
    }

    fn draw_timeline(&mut self, ui: &mut Ui) {
        if self.inventory.day_count() == 0 {
            ui.label("No days in range.");
            return;
        }

        let latest = self.inventory.latest_day();
        let mut date_index = self.view.date_index;

        if let Some(date) = self.inventory.dates.get(date_index) {
            ui.label(RichText::new(date.format("%A, %Y-%m-%d").to_string()).strong());
        }

        let position_label = format!("day {} of {}", date_index + 1, latest + 1);
        let slider = ui
            .add(
                egui::Slider::new(&mut date_index, 0..=latest)
                    .show_value(false)
                    .text(position_label),
            )
            .on_hover_text("Scrub through the generated days.");
        if slider.hovered() {
            slider.request_focus();
        }
        apply_slider_arrow_acceleration_usize(ui, &slider, &mut date_index, 0, latest);

        ui.horizontal(|ui| {
            if ui
                .add_enabled(date_index > 0, egui::Button::new("< Prev"))
                .clicked()
            {
                date_index -= 1;
            }
            if ui
                .add_enabled(date_index < latest, egui::Button::new("Next >"))
                .clicked()
            {
                date_index += 1;
            }
            if ui
                .add_enabled(date_index != latest, egui::Button::new("Latest"))
                .clicked()
            {
                date_index = latest;
            }
        });

        if date_index != self.view.date_index {
            self.select_date(date_index);
        }
    }

    fn draw_counters(&self, ui: &mut Ui) {
        let date_index = self.view.date_index;
        let day_total = self.inventory.day_assets(date_index).len();
        let anomalous = self.inventory.anomalous_on_day(date_index);
        let visible = self.visible_asset_indices().count();

        egui::Grid::new("asset_counters")
            .num_columns(2)
            .striped(true)
            .show(ui, |ui| {
                ui.label("Assets");
                ui.label(RichText::new(day_total.to_string()).strong());
                ui.end_row();

                ui.label("Anomalous");
                ui.label(
                    RichText::new(format!(
                        "{anomalous} ({})",
                        format_percent(anomalous, day_total)
                    ))
                    .strong(),
                );
                ui.end_row();

                if visible != day_total {
                    ui.label("Shown");
                    ui.label(visible.to_string());
                    ui.end_row();
                }
            });
    }

    fn draw_group_legend(&mut self, ui: &mut Ui) {
        let day = self.inventory.day_assets(self.view.date_index);
        let rows = self
            .inventory
            .groups
            .iter()
            .enumerate()
            .map(|(index, group)| {
                let (total, anomalous) = day
                    .iter()
                    .filter(|asset| &asset.group == group)
                    .fold((0usize, 0usize), |(total, anomalous), asset| {
                        (total + 1, anomalous + usize::from(asset.anomalous))
                    });
                (index, group.clone(), total, anomalous)
            })
            .collect::<Vec<_>>();

        let mut toggled = Vec::new();
        for (index, group, total, anomalous) in rows {
            ui.horizontal(|ui| {
                let (swatch, _) =
                    ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
                ui.painter()
                    .circle_filled(swatch.center(), 5.0, group_color(index));

                let mut visible = !self.hidden_groups.contains(&group);
                if ui
                    .checkbox(&mut visible, group.as_str())
                    .on_hover_text("Show or hide this environment on the map.")
                    .changed()
                {
                    toggled.push((group.clone(), visible));
                }
                ui.small(format!("{total} assets, {anomalous} anomalous"));
            });
        }

        for (group, visible) in toggled {
            self.set_group_visible(&group, visible);
        }
    }
}
