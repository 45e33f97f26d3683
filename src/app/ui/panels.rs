use std::collections::HashSet;

use eframe::egui::{self, Align, Context, Layout, Vec2};
use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::inventory::{Asset, GeneratorConfig, Inventory, generate_seeded};

use super::super::depgraph::DependencyGraph;
use super::super::hexmap::ResizeDebounce;
use super::super::state::{ViewEvent, ViewState};
use super::super::{DashboardSettings, ViewModel};

const TOP_BAR_ID: &str = "top_bar";
const CONTROLS_ID: &str = "controls";
const DETAILS_ID: &str = "details";
const CONTROLS_WIDTH: f32 = 300.0;
const DETAILS_WIDTH: f32 = 360.0;

// Dependency graphs draw from their own stream so that browsing processes
// never disturbs a reproducible inventory.
fn graph_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed.rotate_left(17) ^ 0x6a09_e667_f3bc_c908)
}

impl ViewModel {
    pub(in crate::app) fn new(
        generator: GeneratorConfig,
        seed: u64,
        settings: DashboardSettings,
        canvas: Vec2,
    ) -> Self {
        let groups = generator.groups.names();
        let mut model = Self {
            generator,
            seed,
            rng: graph_rng(seed),
            inventory: Inventory::empty(canvas, groups),
            inventory_revision: 0,
            view: ViewState::new(0),
            hex_radius: settings.hex_radius,
            hidden_groups: HashSet::new(),
            group_filter_revision: 0,
            search: String::new(),
            flagged_only: settings.flagged_only,
            cell_cache: None,
            search_match_cache: None,
            dependency_graph: None,
            resize: ResizeDebounce::default(),
        };
        model.regenerate(canvas);
        model
    }

    pub(in crate::app) fn settings(&self) -> DashboardSettings {
        DashboardSettings {
            hex_radius: self.hex_radius,
            flagged_only: self.flagged_only,
        }
    }

    pub(in crate::app) fn show_skeleton(ctx: &Context) -> Vec2 {
        egui::TopBottomPanel::top(TOP_BAR_ID)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("hexwatch");
                    ui.separator();
                    ui.label("measuring canvas...");
                });
            });

        egui::SidePanel::left(CONTROLS_ID)
            .resizable(true)
            .default_width(CONTROLS_WIDTH)
            .show(ctx, |ui| {
                ui.heading("Timeline");
            });

        egui::SidePanel::right(DETAILS_ID)
            .resizable(true)
            .default_width(DETAILS_WIDTH)
            .show(ctx, |ui| {
                ui.heading("Asset Details");
            });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let size = ui.available_size();
                ui.vertical_centered(|ui| {
                    ui.add_space(120.0);
                    ui.spinner();
                });
                size
            })
            .inner
    }

    pub(in crate::app) fn show(&mut self, ctx: &Context) {
        egui::TopBottomPanel::top(TOP_BAR_ID)
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("hexwatch");
                    ui.separator();
                    if let Some(date) = self.inventory.dates.get(self.view.date_index) {
                        ui.label(format!("day: {}", date.format("%Y-%m-%d")));
                    }
                    ui.label(format!("seed: {}", self.seed));
                    ui.label(format!(
                        "canvas: {:.0}x{:.0}",
                        self.inventory.viewport.x, self.inventory.viewport.y
                    ));
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        ui.label(format!("zoom {:.2}x", self.view.transform.zoom));
                        ui.label(format!("state: {}", self.view.selection.label()));
                    });
                });
            });

        egui::SidePanel::left(CONTROLS_ID)
            .resizable(true)
            .default_width(CONTROLS_WIDTH)
            .show(ctx, |ui| self.draw_controls(ui));

        egui::SidePanel::right(DETAILS_ID)
            .resizable(true)
            .default_width(DETAILS_WIDTH)
            .show(ctx, |ui| self.draw_details(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| self.draw_hexmap(ui));
    }

    pub(in crate::app) fn regenerate(&mut self, canvas: Vec2) {
        let inventory = generate_seeded(&self.generator, canvas, self.seed);
        info!(
            "generated {} assets ({} anomalous) over {} days for a {:.0}x{:.0} canvas, seed {}",
            inventory.assets.len(),
            inventory.assets.iter().filter(|asset| asset.anomalous).count(),
            inventory.day_count(),
            canvas.x,
            canvas.y,
            self.seed
        );

        self.inventory = inventory;
        self.inventory_revision = self.inventory_revision.wrapping_add(1);
        self.cell_cache = None;
        self.search_match_cache = None;
        self.rng = graph_rng(self.seed);
        self.resize.reset();
        self.dispatch(ViewEvent::Regenerated {
            latest_day: self.inventory.latest_day(),
        });
    }

    pub(in crate::app) fn regenerate_with_new_seed(&mut self) {
        self.seed = rand::random();
        let canvas = self.inventory.viewport;
        self.regenerate(canvas);
    }

    // For events that do not borrow the inventory.
    pub(in crate::app) fn dispatch(&mut self, event: ViewEvent<'_>) {
        let next = self.view.reduce(event);
        self.commit_view(next);
    }

    pub(in crate::app) fn commit_view(&mut self, next: ViewState) {
        if next.selection != self.view.selection {
            debug!(
                "selection {} -> {}",
                self.view.selection.label(),
                next.selection.label()
            );
        }
        if next.date_index != self.view.date_index {
            debug!("date filter {} -> {}", self.view.date_index, next.date_index);
            // The expanded process is re-bound to that day's record.
            self.dependency_graph = None;
        }

        self.view = next;
        self.sync_dependency_graph();
    }

    pub(in crate::app) fn select_date(&mut self, date_index: usize) {
        let next = self.view.reduce(ViewEvent::DateSelected {
            date_index,
            inventory: &self.inventory,
        });
        self.commit_view(next);
    }

    pub(in crate::app) fn selected_asset(&self) -> Option<&Asset> {
        let asset_id = self.view.selected_asset_id()?;
        self.inventory
            .find_on_day(self.view.date_index, asset_id)
            .and_then(|index| self.inventory.assets.get(index))
    }

    // Keeps one dependency graph alive for the expanded process on the selected
    // day. Expanding a process, even the one that was just collapsed, builds a
    // new graph.
    fn sync_dependency_graph(&mut self) {
        let Some(process_id) = self.view.expanded_process_id() else {
            if self.dependency_graph.take().is_some() {
                debug!("dropped dependency graph");
            }
            return;
        };

        if self
            .dependency_graph
            .as_ref()
            .is_some_and(|graph| graph.process_id == process_id)
        {
            return;
        }

        let process = self
            .view
            .selected_asset_id()
            .and_then(|asset_id| self.inventory.find_on_day(self.view.date_index, asset_id))
            .and_then(|index| self.inventory.assets.get(index))
            .and_then(|asset| asset.process(process_id));

        self.dependency_graph = process.map(|process| {
            let graph = DependencyGraph::generate(process, &mut self.rng);
            debug!(
                "built dependency graph for {} with {} nodes and {} edges",
                process.id,
                graph.nodes.len(),
                graph.edges.len()
            );
            graph
        });
    }
}
