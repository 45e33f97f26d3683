use chrono::NaiveDate;
use eframe::egui::{Pos2, Vec2};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AssetKind {
    Server,
    Database,
    Service,
}

impl AssetKind {
    pub const ALL: [Self; 3] = [Self::Server, Self::Database, Self::Service];

    pub fn label(self) -> &'static str {
        match self {
            Self::Server => "Server",
            Self::Database => "Database",
            Self::Service => "Service",
        }
    }

    pub fn name_prefix(self) -> &'static str {
        match self {
            Self::Server => "srv",
            Self::Database => "db",
            Self::Service => "svc",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ProcessStatus {
    Ok,
    Warning,
    Error,
}

impl ProcessStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::Warning => "Warning",
            Self::Error => "Error",
        }
    }

    pub fn is_flagged(self) -> bool {
        self != Self::Ok
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct Process {
    pub id: String,
    pub name: String,
    pub status: ProcessStatus,
    pub group: String,
    pub weight: f32,
    // Ids of sibling processes in the same environment tag. Not validated;
    // they may point at processes that were never generated.
    pub connections: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Asset {
    pub id: String,
    pub name: String,
    pub kind: AssetKind,
    pub group: String,
    pub anomalous: bool,
    pub position: Pos2,
    pub radius: f32,
    pub date: NaiveDate,
    pub processes: Vec<Process>,
}

impl Asset {
    pub fn flagged_process_count(&self) -> usize {
        self.processes
            .iter()
            .filter(|process| process.status.is_flagged())
            .count()
    }

    pub fn first_flagged_process(&self) -> Option<&Process> {
        self.processes
            .iter()
            .find(|process| process.status.is_flagged())
    }

    pub fn process(&self, process_id: &str) -> Option<&Process> {
        self.processes
            .iter()
            .find(|process| process.id == process_id)
    }

    pub fn status_counts(&self) -> (usize, usize, usize) {
        self.processes
            .iter()
            .fold((0, 0, 0), |(ok, warning, error), process| match process.status {
                ProcessStatus::Ok => (ok + 1, warning, error),
                ProcessStatus::Warning => (ok, warning + 1, error),
                ProcessStatus::Error => (ok, warning, error + 1),
            })
    }
}

// One complete generation pass. Regeneration builds a new value and swaps it
// in whole; nothing mutates an `Inventory` once it is handed to the UI.
#[derive(Clone, Debug, Serialize)]
pub struct Inventory {
    pub viewport: Vec2,
    pub dates: Vec<NaiveDate>,
    pub groups: Vec<String>,
    // Sorted by date; `day_ranges[i]` indexes the assets of `dates[i]`.
    pub assets: Vec<Asset>,
    #[serde(skip)]
    pub(crate) day_ranges: Vec<std::ops::Range<usize>>,
}

impl Inventory {
    pub fn empty(viewport: Vec2, groups: Vec<String>) -> Self {
        Self {
            viewport,
            dates: Vec::new(),
            groups,
            assets: Vec::new(),
            day_ranges: Vec::new(),
        }
    }

    pub fn day_count(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn latest_day(&self) -> usize {
        self.dates.len().saturating_sub(1)
    }

    pub fn day_range(&self, date_index: usize) -> std::ops::Range<usize> {
        self.day_ranges.get(date_index).cloned().unwrap_or(0..0)
    }

    pub fn day_assets(&self, date_index: usize) -> &[Asset] {
        &self.assets[self.day_range(date_index)]
    }

    pub fn find_on_day(&self, date_index: usize, asset_id: &str) -> Option<usize> {
        let range = self.day_range(date_index);
        let offset = self.assets[range.clone()]
            .iter()
            .position(|asset| asset.id == asset_id)?;
        Some(range.start + offset)
    }

    pub fn anomalous_on_day(&self, date_index: usize) -> usize {
        self.day_assets(date_index)
            .iter()
            .filter(|asset| asset.anomalous)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn process(id: &str, status: ProcessStatus) -> Process {
        Process {
            id: id.to_owned(),
            name: "sshd".to_owned(),
            status,
            group: "network".to_owned(),
            weight: 0.5,
            connections: Vec::new(),
        }
    }

    fn asset(processes: Vec<Process>) -> Asset {
        Asset {
            id: "prod-001".to_owned(),
            name: "srv-prod-001".to_owned(),
            kind: AssetKind::Server,
            group: "production".to_owned(),
            anomalous: true,
            position: Pos2::ZERO,
            radius: 4.0,
            date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            processes,
        }
    }

    #[test]
    fn status_counts_and_first_flagged() {
        let asset = asset(vec![
            process("prod-001:p0", ProcessStatus::Ok),
            process("prod-001:p1", ProcessStatus::Warning),
            process("prod-001:p2", ProcessStatus::Error),
            process("prod-001:p3", ProcessStatus::Error),
        ]);

        assert_eq!(asset.status_counts(), (1, 1, 2));
        assert_eq!(asset.flagged_process_count(), 3);
        assert_eq!(
            asset.first_flagged_process().map(|p| p.id.as_str()),
            Some("prod-001:p1")
        );
        assert!(asset.process("prod-001:p3").is_some());
        assert!(asset.process("prod-001:p9").is_none());
    }

    #[test]
    fn empty_inventory_has_no_days() {
        let inventory = Inventory::empty(Vec2::new(100.0, 100.0), Vec::new());
        assert_eq!(inventory.day_count(), 0);
        assert!(inventory.day_assets(0).is_empty());
        assert_eq!(inventory.find_on_day(3, "prod-001"), None);
        assert_eq!(inventory.latest_day(), 0);
    }
}
