use serde::Deserialize;

/// Session defaults from the config file; each field can be overridden on
/// the command line. The mode stays a string here so an unknown value is
/// caught by validation, before any camera command runs.
#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub mode: String,
    pub duration_seconds: u64,
    pub interval_override_seconds: Option<u64>,
}
