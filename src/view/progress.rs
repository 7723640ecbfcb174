//! Progress bar rendering

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Gauge},
    Frame,
};

use crate::model::{format_time, AppModel, TrackStatus};

/// Renders the gauge for the selected song and returns the clickable track area, if any
pub fn render_progress_bar(frame: &mut Frame, area: Rect, model: &AppModel) -> Option<Rect> {
    let controls = " d detect | ↑/↓ select | Enter play/pause | Tab focus | q quit ";
    let block = Block::default()
        .borders(Borders::ALL)
        .title_bottom(Line::from(controls).right_aligned());

    let Some(song) = model
        .playlist
        .songs()
        .get(model.ui.selected)
    else {
        let gauge = Gauge::default()
            .block(block.title(" No track selected"))
            .gauge_style(Style::default().fg(Color::Green))
            .ratio(0.0)
            .label(format!("{} / {}", format_time(0.0), format_time(0.0)));
        frame.render_widget(gauge, area);
        return None;
    };

    let progress = model.playback.progress(&song.id);
    let status = match model.playback.status(&song.id) {
        TrackStatus::Playing => format!(" ▶ {} | {} ", song.title, song.artist),
        TrackStatus::Paused => format!("⏸  {} | {} ", song.title, song.artist),
    };

    let block = block.title(status);
    let track_area = block.inner(area);
    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(progress.ratio())
        .label(format!(
            "{} / {}",
            format_time(progress.position),
            format_time(progress.duration)
        ));

    frame.render_widget(gauge, area);
    Some(track_area)
}
