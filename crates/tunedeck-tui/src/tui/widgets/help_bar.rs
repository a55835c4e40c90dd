// Help bar widget: key hints for the active tab.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::TabId;

const COMMON_HINTS: &[(&str, &str)] = &[
    ("Space", "play/pause"),
    ("n/p", "next/prev"),
    ("+/-", "volume"),
    ("q", "quit"),
];

pub fn render(frame: &mut Frame, area: Rect, tab: TabId) {
    let paragraph =
        Paragraph::new(Line::from(hint_spans(tab))).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

pub fn tab_hints(tab: TabId) -> &'static [(&'static str, &'static str)] {
    match tab {
        TabId::Playlist => &[
            ("Enter", "play"),
            ("d", "remove"),
            ("J/K", "move"),
            ("[/]", "playlist"),
            ("S", "shuffle"),
        ],
        TabId::Browser => &[
            ("Enter", "open"),
            ("a", "add"),
            ("Bksp", "up"),
        ],
        TabId::Settings => &[("Enter", "change")],
    }
}

fn hint_spans(tab: TabId) -> Vec<Span<'static>> {
    let key_style = Style::default()
        .fg(Color::Yellow)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::new();
    for (key, action) in tab_hints(tab).iter().chain(COMMON_HINTS) {
        spans.push(Span::styled(format!(" {key}"), key_style));
        spans.push(Span::styled(format!(" {action} "), Style::default().fg(Color::Gray)));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_follow_active_tab() {
        let text = Line::from(hint_spans(TabId::Browser)).to_string();
        assert!(text.contains("Bksp up"));
        assert!(!text.contains("shuffle"));
        assert!(text.contains("q quit"));
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(40, 1);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        for tab in TabId::ALL {
            terminal
                .draw(|frame| render(frame, frame.area(), tab))
                .unwrap();
        }
    }
}
