// File browser widget: roots or directory listing with size and date.

use chrono::DateTime;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;
use tunedeck_api::model::FileSystemEntry;

use crate::protocol::AppSnapshot;

pub fn render(frame: &mut Frame, area: Rect, snapshot: &AppSnapshot) {
    let browser = &snapshot.browser;

    let rows: Vec<Row> = browser
        .visible()
        .iter()
        .map(|entry| {
            let (name, style) = if entry.is_directory() {
                (
                    format!("{}/", entry.name.trim_end_matches(['/', '\\'])),
                    Style::default().fg(Color::Cyan),
                )
            } else {
                (entry.name.clone(), Style::default())
            };
            Row::new(vec![
                Cell::from(name),
                Cell::from(size_column(entry)),
                Cell::from(date_column(entry)),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Min(20),
        Constraint::Length(9),
        Constraint::Length(16),
    ];

    let title = if browser.visible().is_empty() && !browser.is_at_roots() {
        format!(" {} (empty) ", browser.breadcrumb())
    } else {
        format!(" {} ", browser.breadcrumb())
    };

    let table = Table::new(rows, widths)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut table_state = TableState::default();
    if !browser.visible().is_empty() {
        table_state.select(Some(browser.cursor()));
    }
    frame.render_stateful_widget(table, area, &mut table_state);
}

fn size_column(entry: &FileSystemEntry) -> String {
    if entry.is_directory() {
        String::new()
    } else {
        format_size(entry.size)
    }
}

fn date_column(entry: &FileSystemEntry) -> String {
    if entry.timestamp <= 0 {
        return String::new();
    }
    DateTime::from_timestamp(entry.timestamp, 0)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Human-readable byte count using binary units.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunedeck_api::model::{BrowserEntries, BrowserRoots, FileSystemEntryType};

    #[test]
    fn format_size_units() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn date_column_formats_utc() {
        let entry = FileSystemEntry {
            name: "a.flac".into(),
            path: "/music/a.flac".into(),
            entry_type: FileSystemEntryType::File,
            size: 10,
            timestamp: 1_700_000_000,
        };
        assert_eq!(date_column(&entry), "2023-11-14 22:13");
        assert_eq!(
            date_column(&FileSystemEntry {
                timestamp: 0,
                ..entry
            }),
            ""
        );
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(80, 12);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();

        let mut snapshot = AppSnapshot::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &snapshot))
            .unwrap();

        snapshot.browser.apply_roots(BrowserRoots {
            roots: vec![FileSystemEntry {
                name: "music".into(),
                path: "/music".into(),
                entry_type: FileSystemEntryType::Directory,
                ..FileSystemEntry::default()
            }],
            path_separator: "/".into(),
        });
        snapshot.browser.apply_entries(
            "/music".into(),
            BrowserEntries {
                entries: vec![FileSystemEntry {
                    name: "song.mp3".into(),
                    path: "/music/song.mp3".into(),
                    entry_type: FileSystemEntryType::File,
                    size: 4_200_000,
                    timestamp: 1_700_000_000,
                }],
                path_separator: "/".into(),
            },
        );
        terminal
            .draw(|frame| render(frame, frame.area(), &snapshot))
            .unwrap();
    }
}
