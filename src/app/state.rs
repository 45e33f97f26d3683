use eframe::egui::Vec2;

use crate::inventory::{Asset, Inventory};

pub(crate) const MIN_ZOOM: f32 = 0.5;
pub(crate) const MAX_ZOOM: f32 = 4.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Selection {
    Idle,
    AssetSelected {
        asset_id: String,
    },
    ProcessExpanded {
        asset_id: String,
        process_id: String,
    },
}

impl Selection {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::AssetSelected { .. } => "asset-selected",
            Self::ProcessExpanded { .. } => "process-expanded",
        }
    }

    fn for_asset(asset: &Asset) -> Self {
        match asset.first_flagged_process().filter(|_| asset.anomalous) {
            Some(process) => Self::ProcessExpanded {
                asset_id: asset.id.clone(),
                process_id: process.id.clone(),
            },
            None => Self::AssetSelected {
                asset_id: asset.id.clone(),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Transform {
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Transform {
    // Scales by `factor` while keeping the world point under `anchor`
    // (canvas-local) fixed on screen.
    fn zoomed(self, factor: f32, anchor: Vec2) -> Self {
        if !factor.is_finite() || factor <= 0.0 {
            return self;
        }

        let zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        let world = (anchor - self.pan) / self.zoom;
        Self {
            pan: anchor - world * zoom,
            zoom,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ViewState {
    pub selection: Selection,
    pub date_index: usize,
    pub transform: Transform,
}

#[derive(Clone, Copy, Debug)]
pub(crate) enum ViewEvent<'a> {
    // `None` is a click on empty canvas.
    CellClicked(Option<&'a Asset>),
    ProcessToggled(&'a str),
    Closed,
    DateSelected {
        date_index: usize,
        inventory: &'a Inventory,
    },
    Panned(Vec2),
    Zoomed {
        factor: f32,
        anchor: Vec2,
    },
    Regenerated {
        latest_day: usize,
    },
}

impl ViewState {
    pub(crate) fn new(date_index: usize) -> Self {
        Self {
            selection: Selection::Idle,
            date_index,
            transform: Transform::default(),
        }
    }

    pub(crate) fn selected_asset_id(&self) -> Option<&str> {
        match &self.selection {
            Selection::Idle => None,
            Selection::AssetSelected { asset_id }
            | Selection::ProcessExpanded { asset_id, .. } => Some(asset_id.as_str()),
        }
    }

    pub(crate) fn expanded_process_id(&self) -> Option<&str> {
        match &self.selection {
            Selection::ProcessExpanded { process_id, .. } => Some(process_id.as_str()),
            _ => None,
        }
    }

    pub(crate) fn reduce(&self, event: ViewEvent<'_>) -> Self {
        let mut next = self.clone();
        match event {
            ViewEvent::CellClicked(None) | ViewEvent::Closed => {
                next.selection = Selection::Idle;
            }
            ViewEvent::CellClicked(Some(asset)) => {
                next.selection = Selection::for_asset(asset);
            }
            ViewEvent::ProcessToggled(process_id) => {
                next.selection = toggle_process(&self.selection, process_id);
            }
            ViewEvent::DateSelected {
                date_index,
                inventory,
            } => {
                let date_index = date_index.min(inventory.latest_day());
                next.date_index = date_index;
                next.selection = rebind_selection(&self.selection, date_index, inventory);
            }
            ViewEvent::Panned(delta) => {
                next.transform.pan += delta;
            }
            ViewEvent::Zoomed { factor, anchor } => {
                next.transform = self.transform.zoomed(factor, anchor);
            }
            ViewEvent::Regenerated { latest_day } => {
                next = Self::new(latest_day);
            }
        }
        next
    }
}

fn toggle_process(selection: &Selection, process_id: &str) -> Selection {
    match selection {
        Selection::Idle => Selection::Idle,
        Selection::ProcessExpanded {
            asset_id,
            process_id: current,
        } if current == process_id => Selection::AssetSelected {
            asset_id: asset_id.clone(),
        },
        Selection::AssetSelected { asset_id } | Selection::ProcessExpanded { asset_id, .. } => {
            Selection::ProcessExpanded {
                asset_id: asset_id.clone(),
                process_id: process_id.to_owned(),
            }
        }
    }
}

// The selection survives a date change only if the same asset is observed on
// the new day; an expanded process additionally has to exist there.
fn rebind_selection(selection: &Selection, date_index: usize, inventory: &Inventory) -> Selection {
    let Some(asset_id) = (match selection {
        Selection::Idle => None,
        Selection::AssetSelected { asset_id } | Selection::ProcessExpanded { asset_id, .. } => {
            Some(asset_id)
        }
    }) else {
        return Selection::Idle;
    };

    let Some(asset) = inventory
        .find_on_day(date_index, asset_id)
        .and_then(|index| inventory.assets.get(index))
    else {
        return Selection::Idle;
    };

    match selection {
        Selection::ProcessExpanded { process_id, .. } if asset.process(process_id).is_some() => {
            selection.clone()
        }
        _ => Selection::AssetSelected {
            asset_id: asset.id.clone(),
        },
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::inventory::{GeneratorConfig, GroupSpec, GroupTable, generate_seeded};

    fn inventory(days: u32) -> Inventory {
        let config = GeneratorConfig {
            groups: GroupTable::new(vec![
                GroupSpec::new("hot", 8, 1.0),
                GroupSpec::new("cold", 8, 0.0),
            ])
            .unwrap(),
            days,
            end_date: chrono::NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            daily_total: None,
        };
        generate_seeded(&config, vec2(900.0, 700.0), 17)
    }

    fn find<'a>(inventory: &'a Inventory, id: &str) -> &'a Asset {
        let index = inventory.find_on_day(0, id).unwrap();
        &inventory.assets[index]
    }

    #[test]
    fn clicking_anomalous_asset_expands_first_flagged_process() {
        let inventory = inventory(1);
        let hot = find(&inventory, "hot-000");
        let state = ViewState::new(0).reduce(ViewEvent::CellClicked(Some(hot)));

        let expected = hot.first_flagged_process().unwrap().id.clone();
        assert_eq!(state.selected_asset_id(), Some("hot-000"));
        assert_eq!(state.expanded_process_id(), Some(expected.as_str()));
    }

    #[test]
    fn clicking_healthy_asset_only_selects_it() {
        let inventory = inventory(1);
        let cold = find(&inventory, "cold-003");
        let state = ViewState::new(0).reduce(ViewEvent::CellClicked(Some(cold)));
        assert_eq!(
            state.selection,
            Selection::AssetSelected {
                asset_id: "cold-003".to_owned()
            }
        );
    }

    #[test]
    fn toggling_same_process_twice_collapses() {
        let inventory = inventory(1);
        let cold = find(&inventory, "cold-001");
        let selected = ViewState::new(0).reduce(ViewEvent::CellClicked(Some(cold)));
        let process_id = cold.processes[0].id.as_str();

        let expanded = selected.reduce(ViewEvent::ProcessToggled(process_id));
        assert_eq!(expanded.selection.label(), "process-expanded");

        let collapsed = expanded.reduce(ViewEvent::ProcessToggled(process_id));
        assert_eq!(collapsed.selection, selected.selection);
    }

    #[test]
    fn toggling_another_process_moves_within_expanded() {
        let selection = Selection::ProcessExpanded {
            asset_id: "hot-002".to_owned(),
            process_id: "hot-002:p1".to_owned(),
        };
        let state = ViewState {
            selection,
            ..ViewState::new(0)
        };

        let moved = state.reduce(ViewEvent::ProcessToggled("hot-002:p4"));
        assert_eq!(moved.expanded_process_id(), Some("hot-002:p4"));
        assert_eq!(moved.selected_asset_id(), Some("hot-002"));
    }

    #[test]
    fn toggling_while_idle_is_ignored() {
        let state = ViewState::new(0).reduce(ViewEvent::ProcessToggled("hot-000:p0"));
        assert_eq!(state.selection, Selection::Idle);
    }

    #[test]
    fn close_and_empty_click_return_to_idle() {
        let inventory = inventory(1);
        let hot = find(&inventory, "hot-004");
        let selected = ViewState::new(0).reduce(ViewEvent::CellClicked(Some(hot)));

        assert_eq!(selected.reduce(ViewEvent::Closed).selection, Selection::Idle);
        assert_eq!(
            selected.reduce(ViewEvent::CellClicked(None)).selection,
            Selection::Idle
        );
    }

    #[test]
    fn date_change_keeps_present_asset_and_drops_missing_one() {
        let inventory = inventory(3);
        let latest = inventory.latest_day();
        let kept = ViewState {
            selection: Selection::AssetSelected {
                asset_id: "cold-005".to_owned(),
            },
            ..ViewState::new(latest)
        }
        .reduce(ViewEvent::DateSelected {
            date_index: 0,
            inventory: &inventory,
        });
        assert_eq!(kept.date_index, 0);
        assert_eq!(kept.selected_asset_id(), Some("cold-005"));

        let dropped = ViewState {
            selection: Selection::AssetSelected {
                asset_id: "gone-001".to_owned(),
            },
            ..ViewState::new(latest)
        }
        .reduce(ViewEvent::DateSelected {
            date_index: 1,
            inventory: &inventory,
        });
        assert_eq!(dropped.selection, Selection::Idle);
    }

    #[test]
    fn date_change_collapses_missing_process() {
        let inventory = inventory(2);
        let state = ViewState {
            selection: Selection::ProcessExpanded {
                asset_id: "hot-001".to_owned(),
                process_id: "hot-001:p500".to_owned(),
            },
            ..ViewState::new(1)
        }
        .reduce(ViewEvent::DateSelected {
            date_index: 0,
            inventory: &inventory,
        });

        assert_eq!(
            state.selection,
            Selection::AssetSelected {
                asset_id: "hot-001".to_owned()
            }
        );
    }

    #[test]
    fn date_index_is_clamped_to_inventory() {
        let inventory = inventory(2);
        let state = ViewState::new(0).reduce(ViewEvent::DateSelected {
            date_index: 40,
            inventory: &inventory,
        });
        assert_eq!(state.date_index, 1);
    }

    #[test]
    fn zoom_is_clamped_and_anchored() {
        let anchor = vec2(300.0, 200.0);
        let state = ViewState::new(0).reduce(ViewEvent::Panned(vec2(40.0, -10.0)));
        let world_before = (anchor - state.transform.pan) / state.transform.zoom;

        let zoomed = state.reduce(ViewEvent::Zoomed {
            factor: 1.5,
            anchor,
        });
        let world_after = (anchor - zoomed.transform.pan) / zoomed.transform.zoom;
        assert!((world_before - world_after).length() < 1e-3);

        let mut state = zoomed;
        for _ in 0..50 {
            state = state.reduce(ViewEvent::Zoomed {
                factor: 2.0,
                anchor,
            });
        }
        assert_eq!(state.transform.zoom, MAX_ZOOM);
        for _ in 0..50 {
            state = state.reduce(ViewEvent::Zoomed {
                factor: 0.5,
                anchor,
            });
        }
        assert_eq!(state.transform.zoom, MIN_ZOOM);
    }

    #[test]
    fn regeneration_resets_everything() {
        let inventory = inventory(1);
        let hot = find(&inventory, "hot-000");
        let busy = ViewState::new(0)
            .reduce(ViewEvent::CellClicked(Some(hot)))
            .reduce(ViewEvent::Panned(vec2(10.0, 10.0)));

        let reset = busy.reduce(ViewEvent::Regenerated { latest_day: 30 });
        assert_eq!(reset, ViewState::new(30));
    }
}
