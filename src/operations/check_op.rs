use crate::camera::gphoto2_shell::Gphoto2Shell;
use crate::config_loader::MasterConfig;
use anyhow::{bail, Result};
use clap::ArgMatches;
use log::{error, info, warn};
use std::time::Instant;

struct ReadinessResult {
    check_name: String,
    success: bool,
    details: String,
}

/// Camera readiness diagnostic: queries the settings a session depends on
/// without triggering a single capture.
pub async fn handle_check_cli(master_config: &MasterConfig, _args: &ArgMatches) -> Result<()> {
    let overall_start_time = Instant::now();
    info!("🩺 Starting camera readiness checks...");
    let mut results: Vec<ReadinessResult> = Vec::new();

    let shell = Gphoto2Shell::new(
        master_config.app_settings.camera_command(),
        master_config.app_settings.verify_output_files(),
    );

    // 1. Focus mode must be Manual; anything else ruins a long sequence.
    info!("  CHECK: Querying focus mode... 🔍");
    let focus_fatal = match shell.focus_mode().await {
        Ok(focus) => {
            let success = focus == "Manual";
            if success {
                info!("    ✅ Focus mode is Manual.");
            } else {
                error!("    ❌ Focus mode is '{}', expected 'Manual'.", focus);
            }
            results.push(ReadinessResult {
                check_name: "Focus Mode".to_string(),
                success,
                details: format!("Current: {}", focus),
            });
            !success
        }
        Err(e) => {
            error!("    ❌ Could not query focus mode: {:#}", e);
            results.push(ReadinessResult {
                check_name: "Focus Mode".to_string(),
                success: false,
                details: format!("Query failed: {}", e),
            });
            true
        }
    };

    // 2. Drive mode should be Single; mismatch is a warning, not a blocker.
    info!("  CHECK: Querying drive mode... 🔍");
    match shell.drive_mode().await {
        Ok(drive) => {
            let success = drive == "Single";
            if success {
                info!("    ✅ Drive mode is Single.");
            } else {
                warn!("    ⚠️ Drive mode is '{}', 'Single' is recommended.", drive);
            }
            results.push(ReadinessResult {
                check_name: "Drive Mode".to_string(),
                success,
                details: format!("Current: {}", drive),
            });
        }
        Err(e) => {
            warn!("    ⚠️ Could not query drive mode: {:#}", e);
            results.push(ReadinessResult {
                check_name: "Drive Mode".to_string(),
                success: false,
                details: format!("Query failed: {}", e),
            });
        }
    }

    info!(
        "🩺 Readiness checks finished in {:?}. Summary:",
        overall_start_time.elapsed()
    );
    let mut failures = 0;
    for result in &results {
        if result.success {
            info!("  ✅ {}: {}", result.check_name, result.details);
        } else {
            failures += 1;
            warn!("  ❌ {}: {}", result.check_name, result.details);
        }
    }

    if focus_fatal {
        bail!("Camera is not ready: focus mode check failed. See log for details.");
    }
    if failures > 0 {
        warn!(
            "⚠️ {} of {} checks reported issues; review before starting a session.",
            failures,
            results.len()
        );
    } else {
        info!("👍 Camera is ready for a session.");
    }
    Ok(())
}
