//! Layout rendering (header, camera panel)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Padding, Paragraph, Wrap},
    Frame,
};

use crate::model::{ActivePanel, AppModel, SessionState};
use super::utils::border_style;

pub fn render_header(frame: &mut Frame, area: Rect, model: &AppModel) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Title
            Constraint::Length(24), // Mood badge
        ])
        .split(area);

    let title = Paragraph::new("DETECT YOUR MOOD AND GET THE PERFECT SONG")
        .style(Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" moodtune ")
                .padding(Padding::horizontal(1)),
        );
    frame.render_widget(title, chunks[0]);

    let mood = Paragraph::new(Line::from(vec![
        Span::styled("● ", Style::default().fg(Color::Magenta)),
        Span::raw(format!("Mood: {}", model.session.mood().label())),
    ]))
    .block(Block::default().borders(Borders::ALL).title(" Mood "));
    frame.render_widget(mood, chunks[1]);
}

fn status_line(state: &SessionState) -> Line<'static> {
    match state {
        SessionState::Idle | SessionState::Initializing => Line::from(Span::styled(
            "Loading camera stream & models...",
            Style::default().fg(Color::DarkGray),
        )),
        SessionState::Ready => Line::from(Span::styled(
            "Camera live",
            Style::default().fg(Color::Green),
        )),
        SessionState::Failed { .. } => Line::from(Span::styled(
            "Camera offline",
            Style::default().fg(Color::Red),
        )),
    }
}

pub fn render_camera_panel(frame: &mut Frame, area: Rect, model: &AppModel) {
    let session = &model.session;
    let focused = model.ui.active_panel == ActivePanel::Camera;

    let button_style = if session.can_detect() {
        Style::default().fg(Color::Black).bg(Color::Magenta).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let button = if session.is_detecting() {
        " Detecting… "
    } else {
        " [d] Detect Mood "
    };

    let mut lines = vec![
        status_line(session.state()),
        Line::default(),
        Line::from(Span::styled(button, button_style)),
    ];

    if let Some(at) = session.last_detected_at() {
        lines.push(Line::from(Span::styled(
            format!("Last scan {}", at.format("%H:%M:%S")),
            Style::default().fg(Color::DarkGray),
        )));
    }

    if let Some(message) = session.message() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Red),
        )));
    }

    let panel = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Camera ")
                .padding(Padding::horizontal(1))
                .border_style(border_style(focused)),
        );
    frame.render_widget(panel, area);
}
