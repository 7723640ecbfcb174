//! Playback-related types and state management
//!
//! `PlaybackState` owns the single `active` identifier, so "at most one song is playing"
//! holds by construction: a song is Playing exactly when it is the active one.

use std::collections::HashMap;

use super::types::Song;

/// Position and duration of one song, in seconds
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackProgress {
    pub position: f64,
    pub duration: f64,
}

impl Default for TrackProgress {
    fn default() -> Self {
        Self {
            position: 0.0,
            duration: 0.0,
        }
    }
}

impl TrackProgress {
    pub fn has_duration(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0
    }

    /// Always within [0, 1]
    pub fn ratio(&self) -> f64 {
        if !self.has_duration() || !self.position.is_finite() {
            return 0.0;
        }
        (self.position / self.duration).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrackStatus {
    Paused,
    Playing,
}

/// Result of asking a song to become the active one
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Activation {
    /// Now active; `displaced` was playing and must be paused before this one starts
    Started { displaced: Option<String> },
    AlreadyPlaying,
    UnknownSong,
}

#[derive(Clone, Debug, Default)]
pub struct PlaybackState {
    active: Option<String>,
    tracks: HashMap<String, TrackProgress>,
}

impl PlaybackState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state for a new song list. Nothing is active afterwards.
    pub fn load(&mut self, songs: &[Song]) -> Option<String> {
        let previous = self.active.take();
        self.tracks = songs
            .iter()
            .map(|song| (song.id.clone(), TrackProgress::default()))
            .collect();
        previous
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tracks.contains_key(id)
    }

    pub fn status(&self, id: &str) -> TrackStatus {
        if self.active.as_deref() == Some(id) {
            TrackStatus::Playing
        } else {
            TrackStatus::Paused
        }
    }

    pub fn progress(&self, id: &str) -> TrackProgress {
        self.tracks.get(id).copied().unwrap_or_default()
    }

    pub fn activate(&mut self, id: &str) -> Activation {
        if !self.contains(id) {
            return Activation::UnknownSong;
        }
        if self.active.as_deref() == Some(id) {
            return Activation::AlreadyPlaying;
        }
        let displaced = self.active.replace(id.to_string());
        Activation::Started { displaced }
    }

    /// Returns true if `id` was the active song
    pub fn deactivate(&mut self, id: &str) -> bool {
        if self.active.as_deref() == Some(id) {
            self.active = None;
            true
        } else {
            false
        }
    }

    pub fn set_duration(&mut self, id: &str, duration: f64) {
        if let Some(track) = self.tracks.get_mut(id) {
            track.duration = duration;
        }
    }

    pub fn set_position(&mut self, id: &str, position: f64) {
        if let Some(track) = self.tracks.get_mut(id) {
            track.position = position;
        }
    }

    /// Natural end of track: rewind and drop back to paused
    pub fn end_of_track(&mut self, id: &str) -> bool {
        self.set_position(id, 0.0);
        self.deactivate(id)
    }

    /// Seek target in seconds for a clamped `ratio`, or None while the duration is unknown
    pub fn seek_target(&self, id: &str, ratio: f64) -> Option<f64> {
        let track = self.tracks.get(id)?;
        if !track.has_duration() {
            return None;
        }
        let ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { 0.0 };
        Some(ratio * track.duration)
    }
}

/// Map a pointer offset on a progress bar to a playback ratio in [0, 1].
///
/// Offsets left of the bar give 0, offsets past its right edge give 1. Non-finite input or
/// a bar without positive width gives 0.
pub fn seek_ratio(pointer_x: f64, element_left: f64, element_width: f64) -> f64 {
    if !(element_width.is_finite() && element_width > 0.0) {
        return 0.0;
    }
    let ratio = (pointer_x - element_left) / element_width;
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0)
}

/// Render seconds as `mm:ss`. Non-finite or negative values render as `00:00`.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "00:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn songs(ids: &[&str]) -> Vec<Song> {
        ids.iter()
            .map(|id| Song {
                id: id.to_string(),
                title: String::new(),
                artist: String::new(),
                mood: "happy".to_string(),
                audio_url: String::new(),
            })
            .collect()
    }

    fn playing_count(state: &PlaybackState, ids: &[&str]) -> usize {
        ids.iter()
            .filter(|id| state.status(id) == TrackStatus::Playing)
            .count()
    }

    #[test]
    fn activation_displaces_previous_song() {
        let ids = ["1", "2", "3"];
        let mut state = PlaybackState::new();
        state.load(&songs(&ids));

        assert_eq!(state.activate("1"), Activation::Started { displaced: None });
        assert_eq!(playing_count(&state, &ids), 1);
        assert_eq!(
            state.activate("2"),
            Activation::Started {
                displaced: Some("1".to_string())
            }
        );
        assert_eq!(state.status("1"), TrackStatus::Paused);
        assert_eq!(state.status("2"), TrackStatus::Playing);
        assert_eq!(playing_count(&state, &ids), 1);
        assert_eq!(state.activate("2"), Activation::AlreadyPlaying);
        assert_eq!(state.activate("9"), Activation::UnknownSong);
    }

    #[test]
    fn end_of_track_rewinds_and_pauses() {
        let mut state = PlaybackState::new();
        state.load(&songs(&["1"]));
        state.activate("1");
        state.set_duration("1", 120.0);
        state.set_position("1", 119.5);
        assert!(state.end_of_track("1"));
        assert_eq!(state.status("1"), TrackStatus::Paused);
        assert_eq!(state.progress("1").position, 0.0);
    }

    #[test]
    fn loading_a_new_list_clears_active() {
        let mut state = PlaybackState::new();
        state.load(&songs(&["1", "2"]));
        state.activate("2");
        assert_eq!(state.load(&songs(&["3"])), Some("2".to_string()));
        assert_eq!(state.active(), None);
        assert!(!state.contains("2"));
    }

    #[test]
    fn seek_ratio_is_clamped() {
        assert_eq!(seek_ratio(50.0, 0.0, 100.0), 0.5);
        assert_eq!(seek_ratio(-30.0, 10.0, 100.0), 0.0);
        assert_eq!(seek_ratio(400.0, 10.0, 100.0), 1.0);
        assert_eq!(seek_ratio(110.0, 10.0, 100.0), 1.0);
        assert_eq!(seek_ratio(10.0, 10.0, 100.0), 0.0);
        assert_eq!(seek_ratio(20.0, 10.0, 0.0), 0.0);
        assert_eq!(seek_ratio(f64::NAN, 10.0, 100.0), 0.0);
        assert_eq!(seek_ratio(f64::INFINITY, 0.0, 100.0), 1.0);

        for offset in -200..400 {
            let ratio = seek_ratio(offset as f64 * 0.75, 12.0, 180.0);
            assert!((0.0..=1.0).contains(&ratio), "ratio {ratio} for offset {offset}");
        }
    }

    #[test]
    fn seek_target_needs_a_duration() {
        let mut state = PlaybackState::new();
        state.load(&songs(&["1"]));
        assert_eq!(state.seek_target("1", 0.5), None);
        state.set_duration("1", 120.0);
        assert_eq!(state.seek_target("1", 0.5), Some(60.0));
        assert_eq!(state.seek_target("1", 3.0), Some(120.0));
        state.set_duration("1", f64::NAN);
        assert_eq!(state.seek_target("1", 0.5), None);
    }

    #[test]
    fn progress_ratio_stays_in_range() {
        let progress = TrackProgress {
            position: 200.0,
            duration: 120.0,
        };
        assert_eq!(progress.ratio(), 1.0);
        let unknown = TrackProgress {
            position: 10.0,
            duration: f64::INFINITY,
        };
        assert_eq!(unknown.ratio(), 0.0);
    }

    #[test]
    fn time_formatting() {
        assert_eq!(format_time(0.0), "00:00");
        assert_eq!(format_time(61.9), "01:01");
        assert_eq!(format_time(3599.0), "59:59");
        assert_eq!(format_time(f64::NAN), "00:00");
        assert_eq!(format_time(f64::INFINITY), "00:00");
        assert_eq!(format_time(-4.0), "00:00");
    }
}
