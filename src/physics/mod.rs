mod declutter;
mod forces;
mod quadtree;

use eframe::egui::{Vec2, vec2};

pub use declutter::{collision_radius, declutter};
use forces::fallback_direction;

#[derive(Clone, Debug)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct GraphForces {
    pub repulsion: f32,
    pub spring: f32,
    pub spring_length: f32,
    pub spring_damping: f32,
    pub center_pull: f32,
    pub root_pull: f32,
    pub damping: f32,
    pub max_force: f32,
    pub max_speed: f32,
}

impl Default for GraphForces {
    fn default() -> Self {
        Self {
            repulsion: 9_000.0,
            spring: 0.03,
            spring_length: 46.0,
            spring_damping: 0.22,
            center_pull: 0.004,
            root_pull: 0.05,
            damping: 0.86,
            max_force: 120.0,
            max_speed: 14.0,
        }
    }
}

pub fn step_graph(
    bodies: &mut [Body],
    edges: &[(usize, usize)],
    root: Option<usize>,
    config: GraphForces,
) -> bool {
    let node_count = bodies.len();
    if node_count < 2 {
        return false;
    }

    let mut forces = vec![Vec2::ZERO; node_count];
    let softening = 90.0;

    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let delta = bodies[i].position - bodies[j].position;
            let distance_sq = delta.length_sq();
            let distance = distance_sq.sqrt();
            let direction = if distance > 0.0001 {
                delta / distance
            } else {
                fallback_direction(i, j)
            };

            let min_distance = (bodies[i].radius + bodies[j].radius) * 1.6;
            let mut push = config.repulsion / (distance_sq + softening);
            if distance < min_distance {
                push += min_distance - distance;
            }

            forces[i] += direction * push;
            forces[j] -= direction * push;
        }
    }

    for &(from, to) in edges {
        if from >= node_count || to >= node_count || from == to {
            continue;
        }

        let delta = bodies[from].position - bodies[to].position;
        let distance = delta.length();
        if distance <= 0.0001 {
            continue;
        }
        let direction = delta / distance;

        let spring = (distance - config.spring_length) * config.spring;
        let relative_velocity = bodies[from].velocity - bodies[to].velocity;
        let damping_force = relative_velocity.dot(direction) * config.spring_damping;
        let correction = direction * (spring + damping_force);

        forces[from] -= correction;
        forces[to] += correction;
    }

    for (body, force) in bodies.iter().zip(forces.iter_mut()) {
        *force -= body.position * config.center_pull;
    }

    if let Some(root) = root.filter(|&index| index < node_count) {
        forces[root] -= bodies[root].position * config.root_pull;
    }

    let mut any_motion = false;
    for (body, force) in bodies.iter_mut().zip(forces) {
        let mut force = force;
        let mut force_magnitude = force.length();
        if force_magnitude > config.max_force {
            force = force / force_magnitude * config.max_force;
            force_magnitude = config.max_force;
        }

        let mut velocity = (body.velocity + (force * 0.1)) * config.damping;
        let mut speed = velocity.length();
        if speed > config.max_speed {
            velocity = velocity / speed * config.max_speed;
            speed = config.max_speed;
        }

        if speed < 0.02 && force_magnitude < 0.08 {
            velocity = Vec2::ZERO;
            speed = 0.0;
        }

        body.velocity = velocity;
        body.position += velocity;
        if speed > 0.001 {
            any_motion = true;
        }
    }

    any_motion
}

pub fn seed_position(index: usize, spacing: f32) -> Vec2 {
    if index == 0 {
        return Vec2::ZERO;
    }
    let angle = (index as f32) * 2.399_963;
    let radius = spacing * (index as f32).sqrt();
    vec2(angle.cos(), angle.sin()) * radius
}
