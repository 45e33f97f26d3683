use eframe::egui::{Pos2, Vec2};

use super::forces::{CollisionParams, accumulate_collision_pairs};
use super::quadtree::QuadNode;

pub const ANOMALOUS_COLLISION_RADIUS: f32 = 60.0;
pub const HEALTHY_COLLISION_RADIUS: f32 = 25.0;

const DECLUTTER_ITERATIONS: usize = 120;
const COLLISION_STRENGTH: f32 = 0.7;
const CENTER_PULL: f32 = 0.004;

pub fn collision_radius(anomalous: bool) -> f32 {
    if anomalous {
        ANOMALOUS_COLLISION_RADIUS
    } else {
        HEALTHY_COLLISION_RADIUS
    }
}

// Relaxes `positions` so collision circles overlap less, then clamps every
// point into the viewport with a margin of its own radius.
// Runs a fixed number of iterations; there is no convergence check.
pub fn declutter(positions: &mut [Pos2], radii: &[f32], viewport: Vec2) {
    debug_assert_eq!(positions.len(), radii.len());
    let count = positions.len().min(radii.len());
    if count == 0 {
        return;
    }

    let center = viewport * 0.5;
    let max_radius = radii[..count].iter().copied().fold(0.0_f32, f32::max);
    let max_collision_distance = max_radius * 2.0;
    let params = CollisionParams {
        strength: COLLISION_STRENGTH,
        max_collision_distance_sq: max_collision_distance * max_collision_distance,
    };

    let mut points = positions[..count]
        .iter()
        .map(|position| position.to_vec2())
        .collect::<Vec<_>>();
    let mut offsets = vec![Vec2::ZERO; count];

    for _ in 0..DECLUTTER_ITERATIONS {
        offsets.fill(Vec2::ZERO);

        if count > 1
            && let Some(tree) = QuadNode::build(&points)
        {
            accumulate_collision_pairs(
                &tree,
                &tree,
                true,
                &points,
                &radii[..count],
                params,
                &mut offsets,
            );
        }

        for (point, offset) in points.iter_mut().zip(offsets.iter()) {
            *point += *offset + (center - *point) * CENTER_PULL;
        }
    }

    for ((position, point), radius) in positions.iter_mut().zip(points).zip(radii) {
        *position = Pos2::new(
            clamp_axis(point.x, *radius, viewport.x),
            clamp_axis(point.y, *radius, viewport.y),
        );
    }
}

fn clamp_axis(value: f32, margin: f32, extent: f32) -> f32 {
    if !value.is_finite() || extent < margin * 2.0 {
        return extent.max(0.0) * 0.5;
    }
    value.clamp(margin, extent - margin)
}
