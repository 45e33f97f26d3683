use std::collections::HashSet;

use rand::Rng;

use crate::inventory::{PROCESS_NAMES, Process, ProcessStatus};
use crate::physics::{Body, GraphForces, seed_position, step_graph};

pub(super) const MIN_NODES: usize = 15;
pub(super) const MAX_NODES: usize = 20;
pub(super) const MAX_EDGES_PER_NODE: usize = 3;
const WARMUP_STEPS: usize = 60;
const MAX_STEPS: usize = 600;

#[derive(Clone, Debug)]
pub(super) struct GraphNode {
    pub label: String,
    pub status: ProcessStatus,
    pub linked: bool,
}

// Illustrative neighbourhood of one process. Node 0 is the process itself.
pub(super) struct DependencyGraph {
    pub process_id: String,
    pub nodes: Vec<GraphNode>,
    pub bodies: Vec<Body>,
    pub edges: Vec<(usize, usize)>,
    steps: usize,
    moving: bool,
}

impl DependencyGraph {
    pub(super) fn generate<R: Rng + ?Sized>(process: &Process, rng: &mut R) -> Self {
        let node_count = rng.gen_range(MIN_NODES..=MAX_NODES);
        let mut nodes = Vec::with_capacity(node_count);
        nodes.push(GraphNode {
            label: process.name.clone(),
            status: process.status,
            linked: false,
        });

        for connection in process.connections.iter().take(node_count - 1) {
            nodes.push(GraphNode {
                label: connection.clone(),
                status: random_status(rng, 0.15),
                linked: true,
            });
        }

        while nodes.len() < node_count {
            let name = PROCESS_NAMES[rng.gen_range(0..PROCESS_NAMES.len())];
            nodes.push(GraphNode {
                label: format!("{name}-{}", rng.gen_range(100..1000)),
                status: random_status(rng, 0.25),
                linked: false,
            });
        }

        let edges = random_edges(&nodes, rng);
        let bodies = (0..nodes.len())
            .map(|index| Body {
                position: seed_position(index, 14.0),
                velocity: eframe::egui::Vec2::ZERO,
                radius: if index == 0 { 9.0 } else { 6.0 },
            })
            .collect();

        let mut graph = Self {
            process_id: process.id.clone(),
            nodes,
            bodies,
            edges,
            steps: 0,
            moving: true,
        };
        for _ in 0..WARMUP_STEPS {
            graph.step();
        }
        graph
    }

    pub(super) fn step(&mut self) -> bool {
        if !self.moving || self.steps >= MAX_STEPS {
            self.moving = false;
            return false;
        }

        self.steps += 1;
        self.moving = step_graph(&mut self.bodies, &self.edges, Some(0), GraphForces::default());
        self.moving
    }
}

fn random_status<R: Rng + ?Sized>(rng: &mut R, flagged_chance: f64) -> ProcessStatus {
    if !rng.gen_bool(flagged_chance) {
        ProcessStatus::Ok
    } else if rng.gen_bool(0.4) {
        ProcessStatus::Error
    } else {
        ProcessStatus::Warning
    }
}

// Every node gets 1 to 3 outgoing edges. Nodes taken from the process's
// connections always point back at the root first.
fn random_edges<R: Rng + ?Sized>(nodes: &[GraphNode], rng: &mut R) -> Vec<(usize, usize)> {
    let node_count = nodes.len();
    let mut linked_pairs = HashSet::new();
    let mut edges = Vec::new();
    if node_count < 2 {
        return edges;
    }

    for (source, node) in nodes.iter().enumerate() {
        let wanted = rng.gen_range(1..=MAX_EDGES_PER_NODE);
        let mut added = 0;

        if node.linked && linked_pairs.insert((0, source)) {
            edges.push((source, 0));
            added += 1;
        }

        let mut attempts = 0;
        while added < wanted && attempts < node_count * 4 {
            attempts += 1;
            let target = rng.gen_range(0..node_count);
            if target == source {
                continue;
            }

            let pair = (source.min(target), source.max(target));
            if linked_pairs.insert(pair) {
                edges.push((source, target));
                added += 1;
            }
        }
    }

    edges
}
