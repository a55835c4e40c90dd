// Status bar widget: connection indicator, player identity, status message.

use std::time::Instant;

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::ConnectionStatus;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();

    let (dot, dot_color, label) = connection_indicator(&state.connection_status);
    spans.push(Span::styled(format!(" {} ", dot), Style::default().fg(dot_color)));
    spans.push(Span::styled(label, Style::default().fg(Color::White)));

    let info = &state.snapshot.player.state().info;
    if state.snapshot.player.is_ready() && !info.title.is_empty() {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(
            format!("{} {}", info.title, info.version),
            Style::default().fg(Color::White),
        ));
    }

    if let Some(message) = state.current_status(Instant::now()) {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(message.to_string(), Style::default().fg(Color::Yellow)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Dot character, its color, and a short label for the connection state.
pub fn connection_indicator(status: &ConnectionStatus) -> (&'static str, Color, String) {
    match status {
        ConnectionStatus::Connecting => ("●", Color::Yellow, "Connecting".to_string()),
        ConnectionStatus::Connected => ("●", Color::Green, "Connected".to_string()),
        ConnectionStatus::Disconnected(reason) => {
            ("●", Color::Red, format!("Disconnected ({reason})"))
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
