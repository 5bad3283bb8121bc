use crate::camera::gphoto2_shell::Gphoto2Shell;
use crate::common::file_utils;
use crate::config_loader::MasterConfig;
use crate::core::sequencer::{Sequencer, SequencerConfig};
use crate::modes::profile::ShootingProfile;
use crate::modes::shooting_mode::ShootingMode;
use crate::speech::announcer::{Announcer, NullAnnouncer};
use crate::speech::festival::FestivalAnnouncer;
use anyhow::{bail, Result};
use clap::ArgMatches;
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub async fn handle_run_cli(master_config: &MasterConfig, args: &ArgMatches) -> Result<()> {
    let op_start_time = Instant::now();
    let operation_display_name = "Time-Lapse Run";

    // 1. Resolve session parameters: CLI override > config > mode preset.
    let mode: ShootingMode = match args.get_one::<String>("mode") {
        Some(s) => s.parse()?,
        None => master_config.session.mode.parse()?,
    };
    let profile = ShootingProfile::for_mode(mode);

    let duration_seconds = args
        .get_one::<u64>("duration")
        .copied()
        .unwrap_or(master_config.session.duration_seconds);
    if duration_seconds == 0 {
        bail!("❌ Session duration must be positive.");
    }
    let duration = Duration::from_secs(duration_seconds);

    let interval = match args
        .get_one::<u64>("interval")
        .copied()
        .or(master_config.session.interval_override_seconds)
    {
        Some(0) => bail!("❌ Shot interval must be positive."),
        Some(seconds) => Duration::from_secs(seconds),
        None => profile.settings().interval,
    };

    let output_dir_str = args
        .get_one::<String>("output")
        .cloned()
        .unwrap_or_else(|| master_config.app_settings.output_directory.clone());
    let output_dir = file_utils::ensure_output_directory(&output_dir_str)?;
    debug!(
        "Run CLI resolved: mode={}, duration={:?}, interval={:?}, output={}",
        mode,
        duration,
        interval,
        output_dir.display()
    );

    let shell = Gphoto2Shell::new(
        master_config.app_settings.camera_command(),
        master_config.app_settings.verify_output_files(),
    );
    let mut announcer: Box<dyn Announcer> = if args.get_flag("no-speech") {
        Box::new(NullAnnouncer)
    } else {
        Box::new(FestivalAnnouncer::new(
            master_config.app_settings.speech_command(),
        ))
    };

    // 2. Camera readiness. Auto-focus would refocus between frames and ruin
    // the sequence, so a non-manual focus mode is fatal before the first shot.
    info!("🔍 Checking camera readiness for '{}'...", operation_display_name);
    match shell.focus_mode().await {
        Ok(focus) if focus == "Manual" => {
            info!("  ✅ Focus mode: Manual.");
        }
        Ok(focus) => {
            error!("  ❌ Focus mode is '{}', expected 'Manual'.", focus);
            announcer
                .say("Camera seems to be in auto-focus. Please manually focus. Goodbye!")
                .await;
            bail!("Camera focus mode is '{}'; set it to Manual and retry.", focus);
        }
        Err(e) => {
            error!("  ❌ Could not query camera focus mode: {:#}", e);
            announcer
                .say("Cannot reach the camera. Please check the connection. Goodbye!")
                .await;
            return Err(e.into());
        }
    }
    match shell.drive_mode().await {
        Ok(drive) if drive == "Single" => {
            info!("  ✅ Drive mode: Single.");
        }
        Ok(drive) => {
            warn!("  ⚠️ Drive mode is '{}', not 'Single'.", drive);
            announcer
                .say("Camera not in single shot drive. Please check that this is intended!")
                .await;
        }
        Err(e) => {
            warn!("  ⚠️ Could not query camera drive mode: {:#}. Continuing.", e);
        }
    }

    // 3. Watch for Ctrl-C; the sequencer observes the flag between shots and
    // takes the normal finishing path.
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_flag = Arc::clone(&cancel);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("🛑 Ctrl-C received; will stop at the next shot boundary.");
            cancel_flag.store(true, Ordering::Relaxed);
        }
    });

    // 4. Drive the session.
    let sequencer_config = SequencerConfig {
        mode,
        duration,
        interval,
        output_dir: output_dir.clone(),
        failure_threshold: master_config.app_settings.failure_threshold,
        announce_capture_failures: master_config.app_settings.announce_capture_failures(),
        progress_announce_interval: Duration::from_secs(
            master_config.app_settings.progress_announce_interval_seconds(),
        ),
        filename_timestamp_format: master_config
            .app_settings
            .filename_timestamp_format
            .clone(),
        image_extension: master_config.app_settings.image_extension.clone(),
    };
    let mut sequencer = Sequencer::new(sequencer_config, Box::new(shell), announcer)?;

    match sequencer.run(cancel).await {
        Ok(summary) => {
            info!(
                "✅ '{}' completed in {:?}: {}/{} shots, {} captures, {} failed{}.",
                operation_display_name,
                op_start_time.elapsed(),
                summary.shots_completed,
                summary.shots_scheduled,
                summary.captures_attempted,
                summary.captures_failed,
                if summary.interrupted {
                    " (interrupted by user)"
                } else {
                    ""
                }
            );
            info!("  -> Frames saved under {}", output_dir.display());
            Ok(())
        }
        Err(e) => {
            error!(
                "❌ '{}' aborted after {:?}: {}",
                operation_display_name,
                op_start_time.elapsed(),
                e
            );
            Err(e.into())
        }
    }
}
