//! Model module - Application state and data types
//!
//! This module contains all the data structures and state management for the application.
//! It is organized into submodules by responsibility:
//!
//! - `types`: Core type definitions (moods, expression scores, songs, UI state)
//! - `session`: Session lifecycle and detection bookkeeping
//! - `playlist`: Song list state and request supersession
//! - `playback`: Exclusive playback state, seek and time formatting
//! - `app_model`: Main application model aggregating the above

mod types;
mod session;
mod playlist;
mod playback;
mod app_model;

// Re-export all public types for convenient access
pub use types::{ActivePanel, DetectionResult, ExpressionScores, Mood, Song};

pub use session::{DetectionOutcome, SessionState};

pub use playlist::{Completion, RequestToken};

pub use playback::{format_time, seek_ratio, Activation, TrackStatus};

pub use app_model::AppModel;
