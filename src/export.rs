use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, ensure};
use eframe::egui::Vec2;
use serde::Serialize;

use crate::config::DashboardConfig;
use crate::inventory::{Inventory, generate_seeded};

#[derive(Serialize)]
struct ExportDocument<'a> {
    seed: u64,
    asset_count: usize,
    anomalous_count: usize,
    inventory: &'a Inventory,
}

pub fn export_inventory(
    config: &DashboardConfig,
    viewport: Vec2,
    path: &Path,
) -> Result<Inventory> {
    ensure!(
        viewport.is_finite() && viewport.x > 0.0 && viewport.y > 0.0,
        "export viewport must be finite and positive, got {}x{}",
        viewport.x,
        viewport.y
    );

    let inventory = generate_seeded(&config.generator, viewport, config.seed);
    let document = ExportDocument {
        seed: config.seed,
        asset_count: inventory.assets.len(),
        anomalous_count: inventory.assets.iter().filter(|asset| asset.anomalous).count(),
        inventory: &inventory,
    };

    let file = File::create(path)
        .with_context(|| format!("failed to create export file {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &document)
        .with_context(|| format!("failed to serialize inventory to {}", path.display()))?;
    writer
        .flush()
        .with_context(|| format!("failed to flush export file {}", path.display()))?;

    log::info!(
        "exported {} assets ({} anomalous) over {} days to {}",
        document.asset_count,
        document.anomalous_count,
        inventory.day_count(),
        path.display()
    );
    Ok(inventory)
}
