// Playlist widget: playlist selector row above the items of the current
// playlist.
//
// Only the loaded window of items is rendered; the scrollbar reflects the
// cursor position within the whole playlist.

use ratatui::layout::{Constraint, Layout, Margin, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table,
    TableState,
};
use ratatui::Frame;

use super::format_duration;
use crate::models::{PlayerModel, PlaylistModel};
use crate::protocol::AppSnapshot;

pub fn render(frame: &mut Frame, area: Rect, snapshot: &AppSnapshot) {
    let [tabs_area, table_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);

    frame.render_widget(Paragraph::new(Line::from(playlist_spans(&snapshot.playlist))), tabs_area);
    render_items(frame, table_area, snapshot);
}

/// One span per playlist, the current one highlighted.
pub fn playlist_spans(playlist: &PlaylistModel) -> Vec<Span<'static>> {
    let current = playlist.current_id();
    let mut spans = vec![Span::raw(" ")];
    for info in playlist.playlists() {
        let style = if Some(info.id.as_str()) == current {
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::styled(info.title.clone(), style));
        spans.push(Span::raw("  "));
    }
    spans
}

fn render_items(frame: &mut Frame, area: Rect, snapshot: &AppSnapshot) {
    let playlist = &snapshot.playlist;
    let columns = &snapshot.settings.values().playlist_columns;
    let active_index = active_index(&snapshot.player, playlist);

    let mut header_cells = vec![Cell::from("")];
    header_cells.extend(columns.iter().map(|c| Cell::from(column_header(c))));
    let header = Row::new(header_cells).style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let offset = playlist.items_offset();
    let rows: Vec<Row> = playlist
        .loaded_items()
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let is_active = active_index == Some(offset + i);
            let marker = if is_active { "▶" } else { "" };
            let mut cells = vec![Cell::from(marker)];
            cells.extend(item.columns.iter().map(|c| Cell::from(c.clone())));
            let style = if is_active {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            Row::new(cells).style(style)
        })
        .collect();

    let mut widths = vec![Constraint::Length(2)];
    widths.extend(columns.iter().map(|_| Constraint::Fill(1)));

    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(build_title(playlist)))
        .row_highlight_style(Style::default().bg(Color::DarkGray));

    let selected = playlist
        .cursor()
        .checked_sub(offset)
        .filter(|i| *i < playlist.loaded_items().len());
    let mut table_state = TableState::default().with_selected(selected);
    frame.render_stateful_widget(table, area, &mut table_state);

    let total = playlist.total_count();
    if total > 0 {
        let mut scrollbar_state = ScrollbarState::new(total).position(playlist.cursor());
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

/// Absolute index of the playing item when it is in the current playlist.
fn active_index(player: &PlayerModel, playlist: &PlaylistModel) -> Option<usize> {
    let active = &player.state().active_item;
    if !active.is_active() || playlist.current_id() != Some(active.playlist_id.as_str()) {
        return None;
    }
    usize::try_from(active.index).ok()
}

/// Header text for a title-formatting expression: `%album artist%` → "Album Artist".
pub fn column_header(expression: &str) -> String {
    let trimmed = expression.trim_matches('%');
    if trimmed.contains('%') || trimmed.is_empty() {
        return expression.to_string();
    }
    trimmed
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn build_title(playlist: &PlaylistModel) -> Line<'static> {
    match playlist.current() {
        Some(info) => Line::from(format!(
            " {} ({} items, {}) ",
            info.title,
            info.item_count,
            format_duration(info.total_time)
        )),
        None => Line::from(" No playlists "),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tunedeck_api::model::{PlaylistInfo, PlaylistItem, PlaylistItemsResult};

    fn playlist_info(id: &str, title: &str, is_current: bool) -> PlaylistInfo {
        PlaylistInfo {
            id: id.into(),
            index: 0,
            title: title.into(),
            is_current,
            item_count: 3,
            total_time: 600.0,
        }
    }

    fn loaded_playlist() -> PlaylistModel {
        let mut model = PlaylistModel::default();
        model.apply_playlists(vec![
            playlist_info("p1", "Default", false),
            playlist_info("p2", "Road trip", true),
        ]);
        model.apply_items(PlaylistItemsResult {
            offset: 0,
            total_count: 3,
            items: (0..3)
                .map(|i| PlaylistItem {
                    columns: vec![format!("Artist {i}"), format!("Song {i}"), "3:00".into()],
                })
                .collect(),
        });
        model
    }

    #[test]
    fn column_header_prettifies_fields() {
        assert_eq!(column_header("%title%"), "Title");
        assert_eq!(column_header("%album artist%"), "Album Artist");
        assert_eq!(column_header("[%artist% - ]%title%"), "[%artist% - ]%title%");
    }

    #[test]
    fn playlist_spans_highlight_current() {
        let model = loaded_playlist();
        let spans = playlist_spans(&model);
        let current = spans.iter().find(|s| s.content == "Road trip").unwrap();
        assert!(current.style.add_modifier.contains(Modifier::BOLD));
        let other = spans.iter().find(|s| s.content == "Default").unwrap();
        assert!(!other.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn build_title_shows_count_and_time() {
        let model = loaded_playlist();
        assert_eq!(
            build_title(&model).to_string(),
            " Road trip (3 items, 10:00) "
        );
        assert_eq!(build_title(&PlaylistModel::default()).to_string(), " No playlists ");
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(80, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();

        let empty = AppSnapshot::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &empty))
            .unwrap();

        let snapshot = AppSnapshot {
            playlist: loaded_playlist(),
            ..AppSnapshot::default()
        };
        terminal
            .draw(|frame| render(frame, frame.area(), &snapshot))
            .unwrap();
    }
}
