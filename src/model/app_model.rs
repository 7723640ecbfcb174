//! Main application model with state management

use super::playback::PlaybackState;
use super::playlist::PlaylistState;
use super::session::SessionModel;
use super::types::{ActivePanel, UiState};

/// Main application model containing all state.
///
/// The controller keeps it behind a single `tokio::sync::Mutex`; the view renders from a
/// cloned snapshot.
#[derive(Clone, Debug, Default)]
pub struct AppModel {
    pub session: SessionModel,
    pub playlist: PlaylistState,
    pub playback: PlaybackState,
    pub ui: UiState,
}

impl AppModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn should_quit(&self) -> bool {
        self.ui.should_quit
    }

    pub fn set_should_quit(&mut self, quit: bool) {
        self.ui.should_quit = quit;
    }

    pub fn cycle_panel(&mut self) {
        self.ui.active_panel = self.ui.active_panel.toggle();
    }

    pub fn move_selection_up(&mut self) {
        self.ui.selected = self.ui.selected.saturating_sub(1);
    }

    pub fn move_selection_down(&mut self) {
        let last = self.playlist.songs().len().saturating_sub(1);
        if self.ui.selected < last {
            self.ui.selected += 1;
        }
    }

    pub fn selected_song_id(&self) -> Option<String> {
        self.playlist
            .songs()
            .get(self.ui.selected)
            .map(|song| song.id.clone())
    }

    /// Bring the playlist into view with the first song selected
    pub fn reveal_playlist(&mut self) {
        self.ui.active_panel = ActivePanel::Playlist;
        self.ui.selected = 0;
    }

    /// Keep the selection inside the current list
    pub fn clamp_selection(&mut self) {
        let len = self.playlist.songs().len();
        if self.ui.selected >= len {
            self.ui.selected = len.saturating_sub(1);
        }
    }
}
