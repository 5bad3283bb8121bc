use crate::errors::AppError;
use async_trait::async_trait;
use std::path::PathBuf;

/// Fully resolved parameters for one capture invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureRequest {
    pub aperture: String,
    pub shutter_speed: String,
    pub iso: u32,
    pub white_balance: String,
    /// EV compensation delta for this frame (0.0 for unbracketed shots).
    pub ev_offset: f32,
    pub output_path: PathBuf,
}

// --- The CaptureShell Trait ---
//
// The sequencer only knows how to ask for "one frame with these settings";
// the production implementation shells out to the external camera-control
// binary, tests substitute a scripted mock.

#[async_trait]
pub trait CaptureShell: Send + Sync {
    /// Capture a single frame. Blocking from the sequencer's perspective.
    ///
    /// Success means the external tool accepted the command AND the output
    /// file materialized; a zero exit status with no file on disk is still a
    /// failure.
    async fn capture(&self, request: &CaptureRequest) -> Result<PathBuf, AppError>;
}
