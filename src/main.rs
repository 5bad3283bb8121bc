mod app_config;
mod camera;
mod cli;
mod common;
mod config_loader;
mod core;
mod errors;
mod modes;
mod operations;
mod session_config;
mod speech;

use anyhow::{bail, Result};
use common::logging_setup;
use errors::AppError;
use log::{debug, error, info};
use std::time::Instant;

#[tokio::main]
async fn main() -> Result<()> {
    let main_start_time = Instant::now();
    // Parse CLI arguments early for potential use in logging or config path
    let matches = cli::build_cli().get_matches();

    // Determine the configuration file path
    let config_path = matches
        .get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or("config/lapsectl.yaml");

    debug!("Attempting to load configuration from: {}", config_path);
    let config_load_start_time = Instant::now();
    // Attempt to load the full configuration
    let master_config = match config_loader::load_config(config_path) {
        Ok(cfg) => {
            logging_setup::initialize_logging(Some(&cfg), &matches);
            info!(
                "✅ Full configuration loaded successfully from: {} in {:?}",
                config_path,
                config_load_start_time.elapsed()
            );
            cfg
        }
        Err(e) => {
            // Try to initialize logging with CLI args only, or defaults
            logging_setup::initialize_logging(None, &matches);
            error!(
                "❌ Failed to load master configuration from '{}': {:#}. Exiting.",
                config_path, e
            );
            // Attach context to the existing anyhow::Error
            return Err(e.context(format!(
                "Failed to load master configuration from '{}'",
                config_path
            )));
        }
    };

    info!(
        "🚀 lapsectl starting ({} mode, {}s session configured).",
        master_config.session.mode, master_config.session.duration_seconds
    );

    // Dispatch based on subcommand
    if let Some((operation_name, sub_args)) = matches.subcommand() {
        debug!("🎬 Dispatching to subcommand: {}", operation_name);
        let op_start_time = Instant::now();

        let op_result: Result<()> = match operation_name {
            "run" => operations::run_op::handle_run_cli(&master_config, sub_args).await,
            "check" => operations::check_op::handle_check_cli(&master_config, sub_args).await,
            _ => {
                bail!("Subcommand '{}' not implemented.", operation_name)
            }
        };

        if let Err(e) = op_result {
            error!(
                "❌ Operation '{}' failed after {:?}: {:#}",
                operation_name,
                op_start_time.elapsed(),
                e
            );
            // A consecutive-failure abort gets its own exit code so callers
            // can tell "camera died mid-run" from "bad configuration".
            if matches!(
                e.downcast_ref::<AppError>(),
                Some(AppError::ConsecutiveFailures { .. })
            ) {
                std::process::exit(2);
            }
            return Err(e);
        } else {
            info!(
                "✅ Operation '{}' completed successfully in {:?}.",
                operation_name,
                op_start_time.elapsed()
            );
        }
    } else {
        info!("🤔 No subcommand provided. Try 'lapsectl run' or 'lapsectl check'.");
    }

    info!(
        "🏁 lapsectl operations finished in {:?}.",
        main_start_time.elapsed()
    );
    Ok(())
}
