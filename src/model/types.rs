//! Core type definitions for the application

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Facial expression category, doubling as the playlist mood label
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
}

impl Mood {
    /// Canonical iteration order, matching the order the expression network reports
    /// its categories in. Tie-breaks favour the earliest entry.
    pub const ALL: [Mood; 7] = [
        Mood::Neutral,
        Mood::Happy,
        Mood::Sad,
        Mood::Angry,
        Mood::Fearful,
        Mood::Disgusted,
        Mood::Surprised,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Neutral => "neutral",
            Mood::Happy => "happy",
            Mood::Sad => "sad",
            Mood::Angry => "angry",
            Mood::Fearful => "fearful",
            Mood::Disgusted => "disgusted",
            Mood::Surprised => "surprised",
        }
    }

    /// Capitalised label for display
    pub fn label(self) -> String {
        let name = self.as_str();
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown mood '{0}'")]
pub struct UnknownMood(pub String);

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Mood::ALL
            .into_iter()
            .find(|mood| mood.as_str() == wanted)
            .ok_or_else(|| UnknownMood(s.to_string()))
    }
}

/// Confidence score per expression category, as reported by the model
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpressionScores(HashMap<Mood, f32>);

impl ExpressionScores {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mood: Mood, score: f32) -> Self {
        self.0.insert(mood, score);
        self
    }

    pub fn get(&self, mood: Mood) -> Option<f32> {
        self.0.get(&mood).copied()
    }

    /// Highest scoring category.
    ///
    /// Walks `Mood::ALL` and only replaces the leader on a strictly greater score, so
    /// equal maxima resolve to the category that comes first in canonical order.
    /// Missing categories are skipped and NaN never compares greater. With no usable
    /// score at all the result is `Mood::Neutral`.
    pub fn top_mood(&self) -> Mood {
        let mut top = Mood::Neutral;
        let mut max = f32::NEG_INFINITY;
        for mood in Mood::ALL {
            if let Some(score) = self.get(mood) {
                if score > max {
                    max = score;
                    top = mood;
                }
            }
        }
        top
    }
}

impl FromIterator<(Mood, f32)> for ExpressionScores {
    fn from_iter<I: IntoIterator<Item = (Mood, f32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Outcome of one successful inference: the scores plus the mood derived from them
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionResult {
    pub scores: ExpressionScores,
    pub mood: Mood,
}

impl From<ExpressionScores> for DetectionResult {
    fn from(scores: ExpressionScores) -> Self {
        let mood = scores.top_mood();
        Self { scores, mood }
    }
}

/// A track from the catalog service
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub mood: String,
    #[serde(rename = "audioUrl", default)]
    pub audio_url: String,
}

/// Which panel of the UI has keyboard focus
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ActivePanel {
    #[default]
    Camera,
    Playlist,
}

impl ActivePanel {
    pub fn toggle(self) -> Self {
        match self {
            ActivePanel::Camera => ActivePanel::Playlist,
            ActivePanel::Playlist => ActivePanel::Camera,
        }
    }
}

/// UI state for the application
#[derive(Clone, Debug, Default)]
pub struct UiState {
    pub active_panel: ActivePanel,
    pub selected: usize,
    pub should_quit: bool,
}
