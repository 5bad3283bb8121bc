use crate::common::timestamp_utils;
use crate::errors::AppError;
use log::debug;
use std::path::PathBuf;

/// Filename for one captured frame: mode, wall-clock timestamp, shot index
/// and bracket index keep every frame of a session distinct and sortable.
pub fn capture_filename(
    mode: &str,            // e.g. "day"
    timestamp_format: &str, // from config, e.g. "%Y%m%dT%H%M%S"
    shot_index: usize,
    bracket_index: usize,
    extension: &str, // e.g. "jpg"
) -> String {
    let timestamp = timestamp_utils::current_local_timestamp_str(timestamp_format);
    format!(
        "{}_{}_s{:04}_b{}.{}",
        mode, timestamp, shot_index, bracket_index, extension
    )
}

pub fn ensure_output_directory(dir_path_str: &str) -> Result<PathBuf, AppError> {
    let dir_path = PathBuf::from(dir_path_str);
    if !dir_path.exists() {
        debug!(
            "Output directory '{}' does not exist, attempting to create it.",
            dir_path.display()
        );
        std::fs::create_dir_all(&dir_path).map_err(|e| {
            AppError::Io(format!(
                "Failed to create output directory '{}': {}",
                dir_path.display(),
                e
            ))
        })?;
    } else if !dir_path.is_dir() {
        return Err(AppError::Io(format!(
            "Output path '{}' exists but is not a directory.",
            dir_path.display()
        )));
    }
    Ok(dir_path)
}
