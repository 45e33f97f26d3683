use std::path::PathBuf;

use anyhow::{Context, Result, ensure};
use chrono::{Local, NaiveDate};
use clap::Parser;
use log::LevelFilter;

use crate::inventory::{GeneratorConfig, GroupTable};

pub const DEFAULT_HEX_RADIUS: f32 = 26.0;
pub const MIN_HEX_RADIUS: f32 = 8.0;
pub const MAX_HEX_RADIUS: f32 = 80.0;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Seed for the synthetic data; random when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Number of trailing days to generate, ending today.
    #[arg(long, default_value_t = 31)]
    pub days: u32,

    #[arg(long, default_value_t = 180)]
    pub daily_min: usize,

    #[arg(long, default_value_t = 320)]
    pub daily_max: usize,

    /// Use the group table counts on every day instead of drawing a daily total.
    #[arg(long)]
    pub fixed_counts: bool,

    /// JSON array of {"name", "count", "anomaly_rate"} objects.
    #[arg(long)]
    pub groups: Option<PathBuf>,

    #[arg(long)]
    pub hex_radius: Option<f32>,

    /// Write the generated inventory as JSON and exit without opening a window.
    #[arg(long)]
    pub export: Option<PathBuf>,

    #[arg(long, default_value_t = 1280.0)]
    pub width: f32,

    #[arg(long, default_value_t = 800.0)]
    pub height: f32,

    #[arg(long, default_value = "info")]
    pub log_level: LevelFilter,
}

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    pub generator: GeneratorConfig,
    pub seed: u64,
    // Explicit radius from the command line; wins over persisted settings.
    pub hex_radius: Option<f32>,
}

impl DashboardConfig {
    pub fn from_args(args: &Args) -> Result<Self> {
        Self::from_args_on(args, Local::now().date_naive())
    }

    pub fn from_args_on(args: &Args, today: NaiveDate) -> Result<Self> {
        let groups = match &args.groups {
            Some(path) => GroupTable::from_json_file(path)?,
            None => GroupTable::default(),
        };

        let daily_total = if args.fixed_counts {
            None
        } else {
            ensure!(
                args.daily_min <= args.daily_max,
                "--daily-min ({}) must not exceed --daily-max ({})",
                args.daily_min,
                args.daily_max
            );
            Some(args.daily_min..=args.daily_max)
        };

        if let Some(radius) = args.hex_radius {
            ensure!(
                (MIN_HEX_RADIUS..=MAX_HEX_RADIUS).contains(&radius),
                "--hex-radius must be within {MIN_HEX_RADIUS}..={MAX_HEX_RADIUS}, got {radius}"
            );
        }

        let generator = GeneratorConfig {
            groups,
            days: args.days,
            end_date: today,
            daily_total,
        };
        generator
            .validate()
            .context("invalid generator configuration")?;

        Ok(Self {
            generator,
            seed: args.seed.unwrap_or_else(rand::random),
            hex_radius: args.hex_radius,
        })
    }
}
