//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared utility functions (truncation, scrollable lists)
//! - `layout`: Header and camera panel
//! - `playlist`: Curated playlist panel
//! - `progress`: Progress bar rendering

mod utils;
mod layout;
mod playlist;
mod progress;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

use crate::model::AppModel;

/// Screen regions the controller needs for mouse handling
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ViewLayout {
    /// Clickable track of the progress bar, when a song is selected
    pub seek_area: Option<Rect>,
}

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, model: &AppModel) -> ViewLayout {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header + mood
                Constraint::Min(0),    // Camera + playlist
                Constraint::Length(3), // Progress bar
            ])
            .split(frame.area());

        layout::render_header(frame, chunks[0], model);

        let main_chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(40), // Camera
                Constraint::Percentage(60), // Playlist
            ])
            .split(chunks[1]);

        layout::render_camera_panel(frame, main_chunks[0], model);
        playlist::render_playlist(frame, main_chunks[1], model);

        let seek_area = progress::render_progress_bar(frame, chunks[2], model);
        ViewLayout { seek_area }
    }
}
