use crate::app_config::ApplicationConfig;
use crate::modes::shooting_mode::ShootingMode;
use crate::session_config::SessionConfig;
use anyhow::{bail, Context, Result};
use log::{debug, info};
use std::fs;
use std::path::Path;
use std::time::Instant;

use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct MasterConfig {
    #[serde(rename = "application")]
    pub app_settings: ApplicationConfig,
    pub session: SessionConfig,
}

pub fn load_config(path: &str) -> Result<MasterConfig> {
    debug!("📄 Attempting to load config from: {}", path);
    let start_time = Instant::now();

    let config_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file '{}'. 📖", path))?;
    debug!("Read config file in {:?}", start_time.elapsed());

    let parse_start_time = Instant::now();
    let config: MasterConfig = serde_yaml::from_str(&config_str)
        .with_context(|| format!("Failed to parse YAML configuration from '{}'. 💔", path))?;
    debug!("Parsed YAML in {:?}", parse_start_time.elapsed());

    let validate_start_time = Instant::now();
    validate_master_config(&config).with_context(|| "Master configuration validation failed 👎")?;
    debug!("Validated master config in {:?}", validate_start_time.elapsed());

    info!(
        "✅ Successfully loaded and validated configuration from '{}' in {:?}",
        path,
        start_time.elapsed()
    );
    Ok(config)
}

fn validate_master_config(config: &MasterConfig) -> Result<()> {
    debug!("🕵️ Validating master configuration...");
    let validation_start_time = Instant::now();

    if config.app_settings.output_directory.is_empty() {
        bail!("❌ Application output_directory cannot be empty.");
    }
    let output_path = Path::new(&config.app_settings.output_directory);
    if output_path.exists() && !output_path.is_dir() {
        bail!(
            "❌ Output directory '{}' exists but is not a directory.",
            config.app_settings.output_directory
        );
    }

    if config.app_settings.image_extension.is_empty() {
        bail!("❌ Application image_extension cannot be empty.");
    }
    if config.app_settings.filename_timestamp_format.is_empty() {
        bail!("❌ Application filename_timestamp_format cannot be empty.");
    }
    if config.app_settings.failure_threshold == 0 {
        bail!("❌ Application failure_threshold must be at least 1.");
    }

    // Fail fast on an unknown mode, before a single camera command is issued.
    config
        .session
        .mode
        .parse::<ShootingMode>()
        .with_context(|| format!("❌ Invalid session mode '{}'.", config.session.mode))?;

    if config.session.duration_seconds == 0 {
        bail!("❌ Session duration_seconds must be positive.");
    }
    if let Some(interval) = config.session.interval_override_seconds {
        if interval == 0 {
            bail!("❌ Session interval_override_seconds must be positive when set.");
        }
    }

    info!(
        "👍 Master configuration validated successfully in {:?}.",
        validation_start_time.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(yaml: &str) -> (tempfile::TempDir, String) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lapsectl.yaml");
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(yaml.as_bytes()).unwrap();
        (dir, path.to_string_lossy().to_string())
    }

    const VALID_YAML: &str = r#"
application:
  output_directory: "./TimeLapse"
  filename_timestamp_format: "%Y%m%dT%H%M%S"
  image_extension: "jpg"
  failure_threshold: 5
session:
  mode: "day"
  duration_seconds: 14400
"#;

    #[test]
    fn loads_and_validates_a_minimal_config() {
        let (_dir, path) = write_config(VALID_YAML);
        let config = load_config(&path).unwrap();
        assert_eq!(config.session.mode, "day");
        assert_eq!(config.session.duration_seconds, 14400);
        assert_eq!(config.app_settings.camera_command(), "gphoto2");
        assert_eq!(config.app_settings.speech_command(), "festival");
        assert!(config.app_settings.verify_output_files());
    }

    #[test]
    fn rejects_unknown_mode_at_load_time() {
        let (_dir, path) = write_config(&VALID_YAML.replace("\"day\"", "\"eclipse\""));
        let err = load_config(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("eclipse"));
    }

    #[test]
    fn rejects_zero_duration() {
        let (_dir, path) =
            write_config(&VALID_YAML.replace("duration_seconds: 14400", "duration_seconds: 0"));
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn rejects_zero_failure_threshold() {
        let (_dir, path) =
            write_config(&VALID_YAML.replace("failure_threshold: 5", "failure_threshold: 0"));
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn rejects_zero_interval_override() {
        let yaml = format!("{}  interval_override_seconds: 0\n", VALID_YAML);
        let (_dir, path) = write_config(&yaml);
        assert!(load_config(&path).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(load_config("/definitely/not/here.yaml").is_err());
    }
}
