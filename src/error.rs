//! Error taxonomy for the session controller
//!
//! Each stage owns its error type so callers can tell a terminal failure
//! (`InitializationError`) from the recoverable ones.

use thiserror::Error;

/// Model asset load or camera acquisition failure. Terminal for the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InitializationError {
    #[error("Failed to load face models: {0}")]
    ModelAssets(String),

    #[error("Camera permission denied: {0}")]
    PermissionDenied(String),

    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    #[error("Unable to attach camera stream: {0}")]
    StreamBinding(String),

    #[error("Camera stream never reported frame metadata")]
    NoMetadata,
}

/// Recoverable failure of a single detection attempt
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DetectionError {
    #[error("Camera is not ready yet")]
    NotReady,

    #[error("A detection is already running")]
    Busy,

    #[error("Unable to capture a camera frame")]
    NoFrame,

    #[error("No face detected")]
    NoFace,

    #[error("Mood detection failed: {0}")]
    Inference(String),
}

impl DetectionError {
    /// Whether the failure is reported inline. Rejected triggers are not.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, DetectionError::NotReady | DetectionError::Busy)
    }
}

/// Catalog lookup failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Request failed with status {0}")]
    Status(u16),

    #[error("Unable to fetch songs: {0}")]
    Network(String),

    #[error("Unable to read song list: {0}")]
    Decode(String),

    /// Superseded by a newer request; never shown to the user
    #[error("Request cancelled")]
    Cancelled,
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => FetchError::Status(status.as_u16()),
            None if err.is_decode() => FetchError::Decode(err.to_string()),
            None => FetchError::Network(err.to_string()),
        }
    }
}

/// Media start or decode failure. Handled locally by reverting to paused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("Autoplay was blocked: {0}")]
    AutoplayBlocked(String),

    #[error("Unable to decode audio: {0}")]
    Decode(String),

    #[error("Audio source unavailable: {0}")]
    Unavailable(String),
}
