// Tab bar widget: main panel tabs with the active one highlighted.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::TabId;

pub fn render(frame: &mut Frame, area: Rect, active: TabId) {
    let paragraph = Paragraph::new(Line::from(tab_spans(active)));
    frame.render_widget(paragraph, area);
}

/// "[1:Playlist] [2:Browser] [3:Settings]" with the active tab inverted.
pub fn tab_spans(active: TabId) -> Vec<Span<'static>> {
    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in TabId::ALL.iter().enumerate() {
        let style = if *tab == active {
            Style::default()
                .fg(Color::Black)
                .bg(Color::White)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!("[{}:{}]", i + 1, tab.title()), style));
        spans.push(Span::raw(" "));
    }
    spans
}
