//! Playlist panel rendering

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, ListItem, Padding, Paragraph, Wrap},
    Frame,
};

use crate::model::{ActivePanel, AppModel, TrackStatus};
use super::utils::{border_style, render_scrollable_list, truncate_string};

pub fn render_playlist(frame: &mut Frame, area: Rect, model: &AppModel) {
    let focused = model.ui.active_panel == ActivePanel::Playlist;
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Current Mood: {} ", model.session.mood().label()))
        .padding(Padding::horizontal(1))
        .border_style(border_style(focused));

    if !model.session.has_detected() {
        let hint = Paragraph::new(vec![
            Line::styled(
                "Awaiting your first mood scan.",
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            ),
            Line::styled(
                "Hit Detect Mood to get the perfect soundtrack.",
                Style::default().fg(Color::DarkGray),
            ),
        ])
        .wrap(Wrap { trim: false })
        .block(block);
        frame.render_widget(hint, area);
        return;
    }

    let playlist = &model.playlist;
    let notice = if playlist.is_loading() {
        Some(Line::styled("Pulling the freshest tracks...", Style::default().fg(Color::Gray)))
    } else if let Some(error) = playlist.error() {
        Some(Line::styled(error.to_string(), Style::default().fg(Color::Red)))
    } else if playlist.songs().is_empty() {
        Some(Line::styled(
            "No tracks found for your vibe yet. Try another expression or upload new songs.",
            Style::default().fg(Color::Yellow),
        ))
    } else {
        None
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(if notice.is_some() { 2 } else { 0 }),
            Constraint::Min(0),
        ])
        .split(inner);

    if let Some(notice) = notice {
        frame.render_widget(Paragraph::new(notice).wrap(Wrap { trim: false }), chunks[0]);
    }

    let content_width = chunks[1].width as usize;
    let status_width = 2;
    let mood_width = 10;
    let fixed_width = status_width + 3 + 3 + mood_width;
    let remaining_width = content_width.saturating_sub(fixed_width);
    let title_width = (remaining_width * 55) / 100;
    let artist_width = remaining_width.saturating_sub(title_width);

    let items: Vec<ListItem> = playlist
        .songs()
        .iter()
        .enumerate()
        .map(|(i, song)| {
            let is_playing = model.playback.status(&song.id) == TrackStatus::Playing;
            let style = if i == model.ui.selected && focused {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else if is_playing {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else if i == model.ui.selected {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };

            let indicator = if is_playing { "⏸ " } else { "▶ " };
            ListItem::new(format!(
                "{}   {}   {}   {}",
                indicator,
                truncate_string(&song.title, title_width),
                truncate_string(&song.mood, mood_width),
                truncate_string(&song.artist, artist_width),
            ))
            .style(style)
        })
        .collect();

    render_scrollable_list(frame, chunks[1], items, model.ui.selected, Block::default());
}
