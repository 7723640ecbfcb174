//! Session lifecycle and detection bookkeeping
//!
//! All of the flags that the capture page used to keep in scattered refs live here as
//! named fields with explicit transitions:
//!
//! - `state`: `Idle → Initializing → Ready | Failed`. `Failed` is terminal.
//! - `started`: set by the first `begin_initialize`, never cleared.
//! - `torn_down`: set by `begin_teardown`, never cleared.
//! - `detecting`: busy flag, true only between `begin_detection` and `finish_detection`.
//! - `has_detected`: one-way latch, set by the first successful detection.
//! - `auto_scroll_pending`: re-armed by every successful detection, consumed once by
//!   `take_auto_scroll`.

use chrono::{DateTime, Local};

use crate::error::DetectionError;
use super::types::Mood;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Initializing,
    Ready,
    Failed { message: String },
}

/// What a successful detection asks of the playlist fetcher
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionOutcome {
    /// Latch just set or mood changed: a new fetch is due
    MoodChanged(Mood),
    /// Same mood as before; the current playlist still applies
    Unchanged(Mood),
}

#[derive(Clone, Debug, Default)]
pub struct SessionModel {
    state: SessionState,
    started: bool,
    torn_down: bool,
    mood: Mood,
    detecting: bool,
    has_detected: bool,
    auto_scroll_pending: bool,
    last_detected_at: Option<DateTime<Local>>,
    message: Option<String>,
}

impl SessionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn is_detecting(&self) -> bool {
        self.detecting
    }

    pub fn has_detected(&self) -> bool {
        self.has_detected
    }

    pub fn last_detected_at(&self) -> Option<DateTime<Local>> {
        self.last_detected_at
    }

    /// Inline message for the camera panel: the initialization failure or the last
    /// detection error.
    pub fn message(&self) -> Option<&str> {
        match &self.state {
            SessionState::Failed { message } => Some(message),
            _ => self.message.as_deref(),
        }
    }

    /// The detect trigger is enabled only while ready and idle
    pub fn can_detect(&self) -> bool {
        self.is_ready() && !self.detecting && !self.torn_down
    }

    // ========================================================================
    // Initialization
    // ========================================================================

    /// Returns false when initialization was already started (or the session is gone)
    pub fn begin_initialize(&mut self) -> bool {
        if self.started || self.torn_down {
            return false;
        }
        self.started = true;
        self.state = SessionState::Initializing;
        true
    }

    pub fn mark_ready(&mut self) {
        if self.state == SessionState::Initializing {
            self.state = SessionState::Ready;
        }
    }

    pub fn mark_failed(&mut self, message: impl Into<String>) {
        let mut message = message.into();
        if message.trim().is_empty() {
            message = "Camera or model load failed".to_string();
        }
        self.state = SessionState::Failed { message };
        self.detecting = false;
    }

    /// Returns false when teardown already happened
    pub fn begin_teardown(&mut self) -> bool {
        if self.torn_down {
            return false;
        }
        self.torn_down = true;
        true
    }

    // ========================================================================
    // Detection
    // ========================================================================

    pub fn begin_detection(&mut self) -> Result<(), DetectionError> {
        if !self.is_ready() || self.torn_down {
            return Err(DetectionError::NotReady);
        }
        if self.detecting {
            return Err(DetectionError::Busy);
        }
        self.detecting = true;
        self.message = None;
        Ok(())
    }

    pub fn finish_detection(&mut self) {
        self.detecting = false;
    }

    pub fn record_detection(&mut self, mood: Mood) -> DetectionOutcome {
        let changed = !self.has_detected || self.mood != mood;
        self.mood = mood;
        self.has_detected = true;
        self.auto_scroll_pending = true;
        self.last_detected_at = Some(Local::now());
        if changed {
            DetectionOutcome::MoodChanged(mood)
        } else {
            DetectionOutcome::Unchanged(mood)
        }
    }

    /// Mood and latch stay untouched
    pub fn record_detection_error(&mut self, error: &DetectionError) {
        self.message = Some(error.to_string());
    }

    /// Consume the one-shot auto-scroll marker
    pub fn take_auto_scroll(&mut self) -> bool {
        std::mem::take(&mut self.auto_scroll_pending)
    }
}
