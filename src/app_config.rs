use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationConfig {
    pub output_directory: String,
    pub camera_command: Option<String>, // defaults to "gphoto2"
    pub speech_command: Option<String>, // defaults to "festival"
    pub filename_timestamp_format: String, // strftime format string
    pub image_extension: String, // e.g. "jpg", "cr2"
    pub failure_threshold: u32,  // consecutive capture failures before abort
    pub announce_capture_failures: Option<bool>,
    pub progress_announce_interval_seconds: Option<u64>,
    pub verify_output_files: Option<bool>,
    pub log_level: Option<String>, // Making it optional to potentially use CLI as primary
}

impl ApplicationConfig {
    pub fn camera_command(&self) -> &str {
        self.camera_command.as_deref().unwrap_or("gphoto2")
    }

    pub fn speech_command(&self) -> &str {
        self.speech_command.as_deref().unwrap_or("festival")
    }

    pub fn announce_capture_failures(&self) -> bool {
        self.announce_capture_failures.unwrap_or(false)
    }

    pub fn progress_announce_interval_seconds(&self) -> u64 {
        self.progress_announce_interval_seconds.unwrap_or(1800)
    }

    pub fn verify_output_files(&self) -> bool {
        self.verify_output_files.unwrap_or(true)
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        ApplicationConfig {
            output_directory: "./TimeLapse".to_string(),
            camera_command: None,
            speech_command: None,
            filename_timestamp_format: "%Y%m%dT%H%M%S".to_string(),
            image_extension: "jpg".to_string(),
            failure_threshold: 5,
            announce_capture_failures: Some(false),
            progress_announce_interval_seconds: Some(1800),
            verify_output_files: Some(true),
            log_level: Some("info".to_string()),
        }
    }
}
