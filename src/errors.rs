use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Unknown shooting mode '{0}' (expected one of: day, night, sunrise, sunset, custom)")]
    InvalidMode(String),

    #[error("Capture Failed: {0}")]
    Capture(String),

    #[error("Aborting session after {count} consecutive capture failures")]
    ConsecutiveFailures { count: u32 },

    #[error("Camera Command Error: {0}")]
    Command(String),

    #[error("File I/O Error: {0}")]
    Io(String),

    #[error("Speech Error: {0}")]
    Speech(String),
}

// Allow conversion from std::io::Error to AppError::Io
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}
