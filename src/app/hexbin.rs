use std::collections::HashMap;

use eframe::egui::{Color32, Pos2, vec2};

use crate::inventory::Asset;

use super::render_utils::blend_color;

const SQRT_3: f32 = 1.732_050_8;

const ALERT_RAMP_COUNTS: [f32; 4] = [0.0, 1.0, 5.0, 10.0];
const ALERT_RAMP_INTENSITY: [f32; 4] = [0.0, 1.0 / 3.0, 2.0 / 3.0, 1.0];
const ALERT_RAMP_COLORS: [Color32; 4] = [
    Color32::from_rgb(46, 58, 70),
    Color32::from_rgb(214, 178, 68),
    Color32::from_rgb(226, 112, 48),
    Color32::from_rgb(214, 40, 48),
];

#[derive(Clone, Debug, PartialEq)]
pub(super) struct HexCell {
    pub key: (i32, i32),
    pub center: Pos2,
    pub members: Vec<usize>,
    pub anomalous: usize,
}

// Pointy-top hexagon lattice with odd rows shifted half a column.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(super) struct HexGrid {
    radius: f32,
    dx: f32,
    dy: f32,
}

impl HexGrid {
    pub(super) fn new(radius: f32) -> Self {
        let radius = radius.max(1.0);
        Self {
            radius,
            dx: radius * SQRT_3,
            dy: radius * 1.5,
        }
    }

    pub(super) fn radius(&self) -> f32 {
        self.radius
    }

    pub(super) fn cell_key(&self, point: Pos2) -> (i32, i32) {
        let py = point.y / self.dy;
        let mut pj = py.round();
        let px = point.x / self.dx - odd_row_shift(pj);
        let mut pi = px.round();
        let py1 = py - pj;

        if py1.abs() * 3.0 > 1.0 {
            let px1 = px - pi;
            let pi2 = pi + if px < pi { -0.5 } else { 0.5 };
            let pj2 = pj + if py < pj { -1.0 } else { 1.0 };
            let px2 = px - pi2;
            let py2 = py - pj2;
            if px1 * px1 + py1 * py1 > px2 * px2 + py2 * py2 {
                pi = pi2 + if odd_row_shift(pj) > 0.0 { 0.5 } else { -0.5 };
                pj = pj2;
            }
        }

        (pi.round() as i32, pj as i32)
    }

    pub(super) fn cell_center(&self, key: (i32, i32)) -> Pos2 {
        let (column, row) = key;
        let shift = if row.rem_euclid(2) == 1 { 0.5 } else { 0.0 };
        Pos2::new((column as f32 + shift) * self.dx, row as f32 * self.dy)
    }

    pub(super) fn hexagon(&self, center: Pos2) -> [Pos2; 6] {
        std::array::from_fn(|corner| {
            let angle = (corner as f32) * std::f32::consts::FRAC_PI_3;
            center + vec2(angle.sin(), -angle.cos()) * self.radius
        })
    }

    pub(super) fn bin<'a, I>(&self, assets: I) -> Vec<HexCell>
    where
        I: IntoIterator<Item = (usize, &'a Asset)>,
    {
        let mut slots: HashMap<(i32, i32), usize> = HashMap::new();
        let mut cells: Vec<HexCell> = Vec::new();

        for (index, asset) in assets {
            let key = self.cell_key(asset.position);
            let slot = *slots.entry(key).or_insert_with(|| {
                cells.push(HexCell {
                    key,
                    center: self.cell_center(key),
                    members: Vec::new(),
                    anomalous: 0,
                });
                cells.len() - 1
            });

            let cell = &mut cells[slot];
            cell.members.push(index);
            if asset.anomalous {
                cell.anomalous += 1;
            }
        }

        cells
    }
}

fn odd_row_shift(row: f32) -> f32 {
    if (row as i32).rem_euclid(2) == 1 {
        0.5
    } else {
        0.0
    }
}

fn ramp_position(anomalous: usize) -> (usize, f32) {
    let count = anomalous as f32;
    let last = ALERT_RAMP_COUNTS.len() - 1;
    if count >= ALERT_RAMP_COUNTS[last] {
        return (last - 1, 1.0);
    }

    for segment in 0..last {
        let low = ALERT_RAMP_COUNTS[segment];
        let high = ALERT_RAMP_COUNTS[segment + 1];
        if count <= high {
            return (segment, ((count - low) / (high - low)).clamp(0.0, 1.0));
        }
    }
    (last - 1, 1.0)
}

pub(super) fn alert_intensity(anomalous: usize) -> f32 {
    let (segment, t) = ramp_position(anomalous);
    let low = ALERT_RAMP_INTENSITY[segment];
    let high = ALERT_RAMP_INTENSITY[segment + 1];
    low * (1.0 - t) + high * t
}

pub(super) fn alert_color(anomalous: usize) -> Color32 {
    let (segment, t) = ramp_position(anomalous);
    blend_color(
        ALERT_RAMP_COLORS[segment],
        ALERT_RAMP_COLORS[segment + 1],
        t,
    )
}

// Member with the most flagged processes; the earliest member wins ties.
pub(super) fn worst_member(cell: &HexCell, assets: &[Asset]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for &index in &cell.members {
        let Some(asset) = assets.get(index) else {
            continue;
        };
        let flagged = asset.flagged_process_count();
        if best.is_none_or(|(_, best_flagged)| flagged > best_flagged) {
            best = Some((index, flagged));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::inventory::{AssetKind, Process, ProcessStatus};

    fn asset(id: &str, position: Pos2, flagged: usize) -> Asset {
        let processes = (0..flagged + 2)
            .map(|index| Process {
                id: format!("{id}:p{index}"),
                name: "cron".to_owned(),
                status: if index < flagged {
                    ProcessStatus::Error
                } else {
                    ProcessStatus::Ok
                },
                group: "compute".to_owned(),
                weight: 0.5,
                connections: Vec::new(),
            })
            .collect();

        Asset {
            id: id.to_owned(),
            name: id.to_owned(),
            kind: AssetKind::Service,
            group: "production".to_owned(),
            anomalous: flagged > 0,
            position,
            radius: 4.0,
            date: NaiveDate::from_ymd_opt(2026, 10, 1).unwrap(),
            processes,
        }
    }

    #[test]
    fn intensity_is_monotonic_and_hits_ramp_points() {
        let mut previous = alert_intensity(0);
        assert_eq!(previous, 0.0);
        for count in 1..40 {
            let current = alert_intensity(count);
            assert!(current >= previous, "ramp dropped at {count}");
            previous = current;
        }

        assert!((alert_intensity(1) - 1.0 / 3.0).abs() < 1e-6);
        assert!((alert_intensity(5) - 2.0 / 3.0).abs() < 1e-6);
        assert_eq!(alert_intensity(10), 1.0);
        assert_eq!(alert_intensity(500), 1.0);
    }

    #[test]
    fn ramp_colors_match_tiers() {
        assert_eq!(alert_color(0), ALERT_RAMP_COLORS[0]);
        assert_eq!(alert_color(1), ALERT_RAMP_COLORS[1]);
        assert_eq!(alert_color(5), ALERT_RAMP_COLORS[2]);
        assert_eq!(alert_color(12), ALERT_RAMP_COLORS[3]);
    }

    #[test]
    fn points_bin_to_the_nearest_center() {
        let grid = HexGrid::new(20.0);
        for step in 0..400 {
            let x = (step * 37 % 613) as f32 + 0.3;
            let y = (step * 53 % 419) as f32 + 0.7;
            let point = Pos2::new(x, y);
            let center = grid.cell_center(grid.cell_key(point));
            let distance = point.distance(center);
            // A point inside a pointy-top hexagon is never further than the circumradius.
            assert!(distance <= grid.radius() + 1e-3, "{point:?} -> {center:?}");

            let (column, row) = grid.cell_key(point);
            let neighbours = [
                (0, 1),
                (1, 0),
                (-1, 0),
                (0, -1),
                (1, 1),
                (-1, -1),
                (1, -1),
                (-1, 1),
            ];
            for (d_column, d_row) in neighbours {
                let other = grid.cell_center((column + d_column, row + d_row));
                assert!(distance <= point.distance(other) + 1e-3);
            }
        }
    }

    #[test]
    fn bin_groups_members_in_first_seen_order() {
        let grid = HexGrid::new(30.0);
        let assets = vec![
            asset("a", Pos2::new(100.0, 100.0), 0),
            asset("b", Pos2::new(400.0, 400.0), 2),
            asset("c", Pos2::new(102.0, 101.0), 3),
        ];

        let cells = grid.bin(assets.iter().enumerate());
        assert_eq!(cells.len(), 2);
        assert_eq!(cells[0].members, vec![0, 2]);
        assert_eq!(cells[0].anomalous, 1);
        assert_eq!(cells[1].members, vec![1]);
    }

    #[test]
    fn empty_input_yields_no_cells() {
        let grid = HexGrid::new(30.0);
        let assets: Vec<Asset> = Vec::new();
        assert!(grid.bin(assets.iter().enumerate()).is_empty());
    }

    #[test]
    fn worst_member_prefers_most_flagged_then_first() {
        let assets = vec![
            asset("a", Pos2::ZERO, 2),
            asset("b", Pos2::ZERO, 5),
            asset("c", Pos2::ZERO, 5),
            asset("d", Pos2::ZERO, 1),
        ];
        let cell = HexCell {
            key: (0, 0),
            center: Pos2::ZERO,
            members: vec![0, 1, 2, 3],
            anomalous: 4,
        };
        assert_eq!(worst_member(&cell, &assets), Some(1));

        let healthy = vec![asset("x", Pos2::ZERO, 0), asset("y", Pos2::ZERO, 0)];
        let cell = HexCell {
            key: (0, 0),
            center: Pos2::ZERO,
            members: vec![1, 0],
            anomalous: 0,
        };
        assert_eq!(worst_member(&cell, &healthy), Some(1));
    }

    #[test]
    fn hexagon_corners_sit_on_the_circumradius() {
        let grid = HexGrid::new(12.0);
        let center = Pos2::new(50.0, 50.0);
        for corner in grid.hexagon(center) {
            assert!((corner.distance(center) - 12.0).abs() < 1e-3);
        }
    }
}
