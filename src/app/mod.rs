use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use eframe::egui::Context;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::{DEFAULT_HEX_RADIUS, DashboardConfig, MAX_HEX_RADIUS, MIN_HEX_RADIUS};
use crate::inventory::{GeneratorConfig, Inventory};

use self::depgraph::DependencyGraph;
use self::hexbin::HexCell;
use self::hexmap::ResizeDebounce;
use self::state::ViewState;

mod depgraph;
mod hexbin;
mod hexmap;
mod render_utils;
mod state;
mod ui;

pub struct DashboardApp {
    config: DashboardConfig,
    settings: DashboardSettings,
    state: AppState,
}

enum AppState {
    // The panels are laid out empty until the central canvas has a size to
    // generate for.
    Measuring,
    Ready(Box<ViewModel>),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct DashboardSettings {
    hex_radius: f32,
    flagged_only: bool,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            hex_radius: DEFAULT_HEX_RADIUS,
            flagged_only: false,
        }
    }
}

impl DashboardSettings {
    fn sanitized(self) -> Self {
        let hex_radius = if self.hex_radius.is_finite() {
            self.hex_radius.clamp(MIN_HEX_RADIUS, MAX_HEX_RADIUS)
        } else {
            DEFAULT_HEX_RADIUS
        };
        Self { hex_radius, ..self }
    }
}

struct ViewModel {
    generator: GeneratorConfig,
    seed: u64,
    rng: StdRng,
    inventory: Inventory,
    inventory_revision: u64,
    view: ViewState,
    hex_radius: f32,
    hidden_groups: HashSet<String>,
    group_filter_revision: u64,
    search: String,
    flagged_only: bool,
    cell_cache: Option<CellCache>,
    search_match_cache: Option<SearchMatchCache>,
    dependency_graph: Option<DependencyGraph>,
    resize: ResizeDebounce,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct CellCacheKey {
    inventory_revision: u64,
    date_index: usize,
    hex_radius: f32,
    group_filter_revision: u64,
}

struct CellCache {
    key: CellCacheKey,
    cells: Arc<Vec<HexCell>>,
    index_by_key: Arc<HashMap<(i32, i32), usize>>,
}

struct SearchMatchCache {
    query: String,
    inventory_revision: u64,
    date_index: usize,
    matches: Arc<HashSet<usize>>,
}

impl DashboardApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: DashboardConfig) -> Self {
        let mut settings = cc
            .storage
            .and_then(|storage| eframe::get_value::<DashboardSettings>(storage, eframe::APP_KEY))
            .unwrap_or_default()
            .sanitized();
        if let Some(hex_radius) = config.hex_radius {
            settings.hex_radius = hex_radius;
        }

        Self {
            config,
            settings,
            state: AppState::Measuring,
        }
    }

    fn current_settings(&self) -> DashboardSettings {
        match &self.state {
            AppState::Measuring => self.settings,
            AppState::Ready(model) => model.settings(),
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Measuring => {
                let canvas = ViewModel::show_skeleton(ctx);
                if canvas.x >= 1.0 && canvas.y >= 1.0 {
                    transition = Some(AppState::Ready(Box::new(ViewModel::new(
                        self.config.generator.clone(),
                        self.config.seed,
                        self.settings,
                        canvas,
                    ))));
                } else {
                    ctx.request_repaint();
                }
            }
            AppState::Ready(model) => model.show(ctx),
        }

        if let Some(next_state) = transition {
            self.state = next_state;
            ctx.request_repaint();
        }
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        self.settings = self.current_settings();
        eframe::set_value(storage, eframe::APP_KEY, &self.settings);
    }
}
