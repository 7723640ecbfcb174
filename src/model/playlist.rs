//! Playlist state and the request-supersession protocol
//!
//! Every fetch is issued through `PlaylistState::issue`, which hands out a strictly
//! increasing `RequestToken`. Completions are applied through `complete`, which compares
//! the token against the latest one issued and drops anything stale.

use crate::error::FetchError;
use super::types::{Mood, Song};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaylistRequest {
    pub token: RequestToken,
    pub mood: Mood,
}

/// What `complete` did with a response
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    /// Songs replaced the current list
    Loaded { count: usize },
    /// Error recorded and list cleared
    Failed,
    /// Belongs to a superseded request, discarded
    Stale,
    /// Cancellation, discarded without touching list or error
    Cancelled,
}

#[derive(Clone, Debug, Default)]
pub struct PlaylistState {
    songs: Vec<Song>,
    loading: bool,
    error: Option<String>,
    latest: RequestToken,
    current: Option<PlaylistRequest>,
}

impl PlaylistState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn current(&self) -> Option<PlaylistRequest> {
        self.current
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token == self.latest && self.current.is_some_and(|r| r.token == token)
    }

    /// Supersede whatever is in flight and start tracking a new request
    pub fn issue(&mut self, mood: Mood) -> PlaylistRequest {
        self.latest = RequestToken(self.latest.0 + 1);
        let request = PlaylistRequest {
            token: self.latest,
            mood,
        };
        self.current = Some(request);
        self.loading = true;
        self.error = None;
        request
    }

    /// Apply the result of the request identified by `token`
    pub fn complete(
        &mut self,
        token: RequestToken,
        outcome: Result<Vec<Song>, FetchError>,
    ) -> Completion {
        if !self.is_current(token) {
            return Completion::Stale;
        }

        match outcome {
            Ok(songs) => {
                let count = songs.len();
                self.songs = songs;
                self.error = None;
                self.loading = false;
                Completion::Loaded { count }
            }
            Err(FetchError::Cancelled) => {
                self.loading = false;
                Completion::Cancelled
            }
            Err(err) => {
                self.songs.clear();
                self.error = Some(err.to_string());
                self.loading = false;
                Completion::Failed
            }
        }
    }

    /// Forget the in-flight request without applying anything, e.g. on teardown
    pub fn abandon(&mut self) {
        self.current = None;
        self.loading = false;
    }

    /// Back to the pre-detection state: no list, no error, nothing in flight
    pub fn reset(&mut self) {
        self.songs.clear();
        self.error = None;
        self.abandon();
    }
}
