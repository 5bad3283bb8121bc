use crate::core::capture_shell::{CaptureRequest, CaptureShell};
use crate::errors::AppError;
use async_trait::async_trait;
use log::{debug, warn};
use std::path::PathBuf;
use tokio::process::Command;

// Camera configuration paths understood by the control tool.
const APERTURE: &str = "/main/capturesettings/aperture";
const SHUTTER_SPEED: &str = "/main/capturesettings/shutterspeed";
const EV_COMPENSATION: &str = "/main/capturesettings/exposurecompensation";
const FOCUS_MODE: &str = "/main/capturesettings/focusmode";
const DRIVE_MODE: &str = "/main/capturesettings/drivemode";
const ISO: &str = "/main/imgsettings/iso";
const WHITE_BALANCE: &str = "/main/imgsettings/whitebalance";

/// Capture shell backed by an external gphoto2-style command-line tool.
///
/// Each capture is one synchronous invocation that pushes the resolved
/// settings and downloads the frame to the requested path. The tool's exit
/// status alone is not trusted: with `verify_files` set (the default), a
/// zero exit with no non-empty output file still counts as a failure.
pub struct Gphoto2Shell {
    command: String,
    verify_files: bool,
}

impl Gphoto2Shell {
    pub fn new(command: &str, verify_files: bool) -> Self {
        Gphoto2Shell {
            command: command.to_string(),
            verify_files,
        }
    }

    /// Current focus mode reported by the camera (e.g. "Manual", "One Shot").
    pub async fn focus_mode(&self) -> Result<String, AppError> {
        self.read_current_config(FOCUS_MODE).await
    }

    /// Current drive mode reported by the camera (e.g. "Single", "Continuous").
    pub async fn drive_mode(&self) -> Result<String, AppError> {
        self.read_current_config(DRIVE_MODE).await
    }

    async fn read_current_config(&self, config_path: &str) -> Result<String, AppError> {
        debug!("🎛️ {} --get-config {}", self.command, config_path);
        let output = Command::new(&self.command)
            .args(["--get-config", config_path])
            .output()
            .await
            .map_err(|e| {
                AppError::Command(format!(
                    "Failed to run '{}' (is it installed and on PATH?): {}",
                    self.command, e
                ))
            })?;
        if !output.status.success() {
            return Err(AppError::Command(format!(
                "'{} --get-config {}' exited with {}: {}",
                self.command,
                config_path,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        parse_current_value(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            AppError::Command(format!(
                "No 'Current:' value in '{}' output for {}",
                self.command, config_path
            ))
        })
    }
}

#[async_trait]
impl CaptureShell for Gphoto2Shell {
    async fn capture(&self, request: &CaptureRequest) -> Result<PathBuf, AppError> {
        let args = build_capture_args(request);
        debug!("🎛️ {} {}", self.command, args.join(" "));

        let output = Command::new(&self.command)
            .args(&args)
            .output()
            .await
            .map_err(|e| {
                AppError::Command(format!("Failed to run '{}': {}", self.command, e))
            })?;

        if !output.status.success() {
            return Err(AppError::Capture(format!(
                "'{}' exited with {}: {}",
                self.command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        if self.verify_files {
            // The tool can report success without actually writing a frame
            // (e.g. card removed mid-session), so check the file itself.
            let metadata = tokio::fs::metadata(&request.output_path).await.map_err(|_| {
                AppError::Capture(format!(
                    "'{}' exited cleanly but no output file materialized at {}",
                    self.command,
                    request.output_path.display()
                ))
            })?;
            if metadata.len() == 0 {
                return Err(AppError::Capture(format!(
                    "Output file {} exists but is empty",
                    request.output_path.display()
                )));
            }
        } else {
            warn!(
                "⚠️ Skipping output file verification for {} (verify_output_files disabled).",
                request.output_path.display()
            );
        }

        Ok(request.output_path.clone())
    }
}

/// Argument list for one capture invocation. Pure so the wire format stays
/// unit-testable without a camera attached.
pub fn build_capture_args(request: &CaptureRequest) -> Vec<String> {
    vec![
        "--set-config-value".to_string(),
        format!("{}={}", APERTURE, request.aperture),
        "--set-config-value".to_string(),
        format!("{}={}", SHUTTER_SPEED, request.shutter_speed),
        "--set-config-value".to_string(),
        format!("{}={}", ISO, request.iso),
        "--set-config-value".to_string(),
        format!("{}={}", WHITE_BALANCE, request.white_balance),
        "--set-config-value".to_string(),
        format!("{}={}", EV_COMPENSATION, format_ev(request.ev_offset)),
        "--set-config".to_string(),
        "capturetarget=0".to_string(),
        "--force-overwrite".to_string(),
        format!("--filename={}", request.output_path.display()),
        "--no-keep".to_string(),
        "--capture-image-and-download".to_string(),
    ]
}

fn format_ev(ev: f32) -> String {
    if ev == 0.0 {
        "0".to_string()
    } else {
        format!("{:+.1}", ev)
    }
}

fn parse_current_value(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("Current:"))
        .map(|value| value.trim().to_string())
}
