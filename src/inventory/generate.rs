use std::f32::consts::{FRAC_PI_2, TAU};
use std::ops::RangeInclusive;

use anyhow::{Result, ensure};
use chrono::{Days, NaiveDate};
use eframe::egui::{Pos2, Vec2, vec2};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::physics::{collision_radius, declutter};
use crate::util::{slug, stable_bucket};

use super::groups::{GroupSpec, GroupTable};
use super::model::{Asset, AssetKind, Inventory, Process, ProcessStatus};

pub const MAX_PROCESSES: usize = 100;
pub const MAX_FLAGGED_PROCESSES: usize = 9;
const SUBCLUSTER_SIZE: usize = 25;
const ANOMALOUS_DRAW_RADIUS: f32 = 5.0;
const HEALTHY_DRAW_RADIUS: f32 = 3.5;

pub(crate) const PROCESS_NAMES: [&str; 14] = [
    "nginx",
    "postgres",
    "sshd",
    "cron",
    "dockerd",
    "kubelet",
    "redis-server",
    "java",
    "python3",
    "node",
    "systemd-journald",
    "rsyslogd",
    "containerd",
    "envoy",
];

const FUNCTIONAL_GROUPS: [&str; 6] = [
    "auth",
    "network",
    "storage",
    "compute",
    "logging",
    "scheduler",
];

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub groups: GroupTable,
    pub days: u32,
    pub end_date: NaiveDate,
    // Range the per-day asset total is drawn from. `None` keeps the table's
    // baseline counts on every day.
    pub daily_total: Option<RangeInclusive<usize>>,
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        self.groups.validate()?;
        if let Some(range) = &self.daily_total {
            ensure!(
                range.start() <= range.end(),
                "daily total range {}..={} is empty",
                range.start(),
                range.end()
            );
        }
        Ok(())
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        (0..self.days)
            .rev()
            .filter_map(|back| self.end_date.checked_sub_days(Days::new(u64::from(back))))
            .collect()
    }
}

pub fn generate_seeded(config: &GeneratorConfig, viewport: Vec2, seed: u64) -> Inventory {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_inventory(config, viewport, &mut rng)
}

fn generate_inventory<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    viewport: Vec2,
    rng: &mut R,
) -> Inventory {
    let dates = config.dates();
    let mut inventory = Inventory::empty(viewport, config.groups.names());
    let group_count = config.groups.groups().len();
    let anchors = (0..group_count)
        .map(|index| group_anchor(index, group_count, viewport))
        .collect::<Vec<_>>();

    for date in &dates {
        let counts = day_counts(config, rng);
        let start = inventory.assets.len();
        let mut day_assets = Vec::new();

        let groups = config.groups.groups().iter().zip(counts).zip(&anchors);
        for ((group, count), anchor) in groups {
            generate_group(group, count, *anchor, viewport, *date, rng, &mut day_assets);
        }

        let mut positions = day_assets
            .iter()
            .map(|asset| asset.position)
            .collect::<Vec<_>>();
        let radii = day_assets
            .iter()
            .map(|asset| collision_radius(asset.anomalous))
            .collect::<Vec<_>>();
        declutter(&mut positions, &radii, viewport);
        for (asset, position) in day_assets.iter_mut().zip(positions) {
            asset.position = position;
        }

        inventory.assets.extend(day_assets);
        inventory.day_ranges.push(start..inventory.assets.len());
    }

    inventory.dates = dates;
    log::debug!(
        "generated {} assets over {} days for a {:.0}x{:.0} viewport",
        inventory.assets.len(),
        inventory.dates.len(),
        viewport.x,
        viewport.y
    );
    inventory
}

fn day_counts<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> Vec<usize> {
    match &config.daily_total {
        Some(range) => {
            debug_assert!(range.start() <= range.end(), "unvalidated daily total range");
            let total = rng.gen_range(range.clone());
            config.groups.scaled_counts(total)
        }
        None => config
            .groups
            .groups()
            .iter()
            .map(|group| group.count)
            .collect(),
    }
}

fn group_anchor(index: usize, group_count: usize, viewport: Vec2) -> Pos2 {
    let center = (viewport * 0.5).to_pos2();
    if group_count <= 1 {
        return center;
    }

    let ring = viewport.min_elem() * 0.28;
    let angle = (index as f32 / group_count as f32) * TAU - FRAC_PI_2;
    center + vec2(angle.cos(), angle.sin()) * ring
}

fn generate_group<R: Rng + ?Sized>(
    group: &GroupSpec,
    count: usize,
    anchor: Pos2,
    viewport: Vec2,
    date: NaiveDate,
    rng: &mut R,
    out: &mut Vec<Asset>,
) {
    if count == 0 {
        return;
    }

    let prefix = slug(&group.name);
    let extent = viewport.min_elem();
    let spread = extent * 0.09;
    let subclusters = count.div_ceil(SUBCLUSTER_SIZE).max(1);
    let centers = (0..subclusters)
        .map(|_| {
            let angle = rng.gen_range(0.0..TAU);
            let distance = rng.gen_range(0.0..=extent * 0.1);
            anchor + vec2(angle.cos(), angle.sin()) * distance
        })
        .collect::<Vec<_>>();

    for index in 0..count {
        let anomalous = rng.gen_bool(group.anomaly_rate.clamp(0.0, 1.0));
        let id = format!("{prefix}-{index:03}");
        let kind = AssetKind::ALL[stable_bucket(&id, AssetKind::ALL.len())];

        let angle = rng.gen_range(0.0..TAU);
        let distance = if anomalous {
            rng.gen_range(0.8_f32..=1.4) * spread
        } else {
            rng.gen_range(0.0_f32..=1.0).sqrt() * 0.7 * spread
        };
        let position = centers[index % subclusters] + vec2(angle.cos(), angle.sin()) * distance;

        let processes = generate_processes(&id, &prefix, count, anomalous, rng);

        out.push(Asset {
            name: format!("{}-{id}", kind.name_prefix()),
            id,
            kind,
            group: group.name.clone(),
            anomalous,
            position,
            radius: if anomalous {
                ANOMALOUS_DRAW_RADIUS
            } else {
                HEALTHY_DRAW_RADIUS
            },
            date,
            processes,
        });
    }
}

fn generate_processes<R: Rng + ?Sized>(
    asset_id: &str,
    group_prefix: &str,
    group_size: usize,
    anomalous: bool,
    rng: &mut R,
) -> Vec<Process> {
    let flagged = if anomalous {
        rng.gen_range(1..=MAX_FLAGGED_PROCESSES)
    } else {
        0
    };
    let count = rng.gen_range(1..=MAX_PROCESSES).max(flagged);

    let mut flagged_slots = vec![false; count];
    for slot in rand::seq::index::sample(&mut *rng, count, flagged).into_iter() {
        flagged_slots[slot] = true;
    }

    flagged_slots
        .into_iter()
        .enumerate()
        .map(|(index, is_flagged)| {
            let status = if !is_flagged {
                ProcessStatus::Ok
            } else if rng.gen_bool(0.4) {
                ProcessStatus::Error
            } else {
                ProcessStatus::Warning
            };

            let connections = (0..rng.gen_range(0..=3))
                .map(|_| {
                    format!(
                        "{group_prefix}-{:03}:p{}",
                        rng.gen_range(0..group_size.max(1)),
                        rng.gen_range(0..MAX_PROCESSES)
                    )
                })
                .collect();

            Process {
                id: format!("{asset_id}:p{index}"),
                name: PROCESS_NAMES[rng.gen_range(0..PROCESS_NAMES.len())].to_owned(),
                status,
                group: FUNCTIONAL_GROUPS[rng.gen_range(0..FUNCTIONAL_GROUPS.len())].to_owned(),
                weight: rng.gen_range(0.1..=1.0),
                connections,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::inventory::groups::GroupSpec;
    use crate::physics::collision_radius;

    fn end_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    fn config(
        groups: Vec<GroupSpec>,
        days: u32,
        daily_total: Option<RangeInclusive<usize>>,
    ) -> GeneratorConfig {
        GeneratorConfig {
            groups: GroupTable::new(groups).unwrap(),
            days,
            end_date: end_date(),
            daily_total,
        }
    }

    fn default_config() -> GeneratorConfig {
        GeneratorConfig {
            groups: GroupTable::default(),
            days: 31,
            end_date: end_date(),
            daily_total: Some(180..=320),
        }
    }

    #[test]
    fn flagged_process_counts_follow_anomaly_flag() {
        let inventory = generate_seeded(&default_config(), vec2(1280.0, 800.0), 11);
        assert!(!inventory.is_empty());

        for asset in &inventory.assets {
            let flagged = asset.flagged_process_count();
            if asset.anomalous {
                assert!((1..=MAX_FLAGGED_PROCESSES).contains(&flagged), "{}", asset.id);
            } else {
                assert_eq!(flagged, 0, "{}", asset.id);
            }
            assert!((1..=MAX_PROCESSES).contains(&asset.processes.len()));
        }
    }

    #[test]
    fn process_ids_are_unique_and_owned_by_their_asset() {
        let inventory = generate_seeded(&default_config(), vec2(1280.0, 800.0), 5);

        for date_index in 0..inventory.day_count() {
            let mut seen = HashSet::new();
            for asset in inventory.day_assets(date_index) {
                for process in &asset.processes {
                    assert!(process.id.starts_with(&format!("{}:p", asset.id)));
                    assert!(seen.insert(process.id.clone()), "duplicate {}", process.id);
                }
            }
        }
    }

    #[test]
    fn positions_respect_collision_margin_after_declutter() {
        let viewport = vec2(1024.0, 640.0);
        let inventory = generate_seeded(&default_config(), viewport, 99);

        for asset in &inventory.assets {
            let r = collision_radius(asset.anomalous);
            assert!(asset.position.x >= r && asset.position.x <= viewport.x - r);
            assert!(asset.position.y >= r && asset.position.y <= viewport.y - r);
        }
    }

    #[test]
    fn all_anomalous_group_scenario() {
        let config = config(vec![GroupSpec::new("A", 10, 1.0)], 1, None);
        let inventory = generate_seeded(&config, vec2(800.0, 600.0), 3);

        assert_eq!(inventory.assets.len(), 10);
        for asset in &inventory.assets {
            assert!(asset.anomalous);
            let flagged = asset.flagged_process_count();
            assert!((1..=9).contains(&flagged));
            if asset.processes.len() > 9 {
                assert!(asset.processes.iter().any(|p| p.status == ProcessStatus::Ok));
            }
        }
    }

    #[test]
    fn zero_rate_group_has_no_anomalies() {
        let config = config(vec![GroupSpec::new("quiet", 40, 0.0)], 2, None);
        let inventory = generate_seeded(&config, vec2(800.0, 600.0), 8);
        assert_eq!(inventory.assets.len(), 80);
        assert!(inventory.assets.iter().all(|asset| !asset.anomalous));
    }

    #[test]
    fn daily_totals_stay_in_range_and_keep_day_order() {
        let inventory = generate_seeded(&default_config(), vec2(1280.0, 800.0), 21);
        assert_eq!(inventory.day_count(), 31);
        assert_eq!(inventory.dates.last(), Some(&end_date()));

        for (date_index, date) in inventory.dates.iter().enumerate() {
            let day = inventory.day_assets(date_index);
            // Per-group rounding can move the total by at most half an asset per group.
            assert!(day.len() >= 178 && day.len() <= 323, "{}", day.len());
            assert!(day.iter().all(|asset| asset.date == *date));
        }
        assert!(inventory.dates.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn empty_date_range_produces_empty_inventory() {
        let mut config = default_config();
        config.days = 0;
        let inventory = generate_seeded(&config, vec2(1280.0, 800.0), 1);
        assert!(inventory.is_empty());
        assert_eq!(inventory.day_count(), 0);
    }

    #[test]
    fn same_seed_same_inventory() {
        let a = generate_seeded(&default_config(), vec2(900.0, 700.0), 42);
        let b = generate_seeded(&default_config(), vec2(900.0, 700.0), 42);
        assert_eq!(a.assets.len(), b.assets.len());
        for (left, right) in a.assets.iter().zip(&b.assets) {
            assert_eq!(left.id, right.id);
            assert_eq!(left.position, right.position);
            assert_eq!(left.processes.len(), right.processes.len());
        }
    }

    #[test]
    fn asset_ids_recur_across_days() {
        let config = config(vec![GroupSpec::new("Edge Net", 5, 0.2)], 3, None);
        let inventory = generate_seeded(&config, vec2(800.0, 600.0), 2);
        for date_index in 0..3 {
            assert!(inventory.find_on_day(date_index, "edge-net-004").is_some());
        }
    }

    #[test]
    fn asset_ids_are_unique_within_each_day() {
        let inventory = generate_seeded(&default_config(), vec2(1280.0, 800.0), 17);
        for date_index in 0..inventory.day_count() {
            let mut seen = HashSet::new();
            for asset in inventory.day_assets(date_index) {
                assert!(seen.insert(asset.id.as_str()), "duplicate {}", asset.id);
            }
        }
    }

    #[test]
    fn invalid_daily_range_is_rejected() {
        let mut config = default_config();
        config.daily_total = Some(300..=100);
        assert!(config.validate().is_err());
    }
}
