mod app;
mod config;
mod export;
mod inventory;
mod physics;
mod util;

use std::process::ExitCode;

use clap::Parser;
use eframe::egui::vec2;
use log::{error, info};
use simple_logger::SimpleLogger;

use crate::config::{Args, DashboardConfig};

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(error) = SimpleLogger::new().with_level(args.log_level).init() {
        eprintln!("failed to initialise logging: {error}");
    }

    let config = match DashboardConfig::from_args(&args) {
        Ok(config) => config,
        Err(error) => {
            error!("{error:#}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        "{} groups, {} days ending {}, seed {}",
        config.generator.groups.groups().len(),
        config.generator.days,
        config.generator.end_date,
        config.seed
    );

    if let Some(path) = &args.export {
        return match export::export_inventory(&config, vec2(args.width, args.height), path) {
            Ok(_) => ExitCode::SUCCESS,
            Err(error) => {
                error!("{error:#}");
                ExitCode::FAILURE
            }
        };
    }

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default()
            .with_inner_size([1440.0, 920.0])
            .with_min_inner_size([960.0, 600.0]),
        ..Default::default()
    };

    let result = eframe::run_native(
        "hexwatch",
        options,
        Box::new(move |cc| Ok(Box::new(app::DashboardApp::new(cc, config)))),
    );
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            error!("{error}");
            ExitCode::FAILURE
        }
    }
}
