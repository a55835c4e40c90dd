// Settings widget: one row per editable setting, Enter advances the value.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};
use ratatui::Frame;

use crate::models::{SettingField, SettingsModel};
use crate::protocol::AppSnapshot;

pub fn render(frame: &mut Frame, area: Rect, snapshot: &AppSnapshot) {
    let items: Vec<ListItem> = setting_lines(&snapshot.settings)
        .into_iter()
        .map(ListItem::new)
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Settings ")
                .title_bottom(Line::from(" Enter: change value ").right_aligned()),
        )
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("> ");

    let mut list_state = ListState::default().with_selected(Some(snapshot.settings.cursor()));
    frame.render_stateful_widget(list, area, &mut list_state);
}

pub fn setting_lines(model: &SettingsModel) -> Vec<Line<'static>> {
    SettingField::ALL
        .iter()
        .map(|field| {
            Line::from(vec![
                Span::styled(
                    format!("{:<26}", field.label()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    field.display_value(model.values()),
                    Style::default().fg(Color::Cyan),
                ),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;

    #[test]
    fn setting_lines_cover_every_field() {
        let model = SettingsModel::new(Settings {
            volume_step: 2.0,
            ..Settings::default()
        });
        let lines = setting_lines(&model);
        assert_eq!(lines.len(), SettingField::ALL.len());

        let volume = lines[2].to_string();
        assert!(volume.starts_with("Volume step"));
        assert!(volume.ends_with(" 2"));
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(60, 10);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let snapshot = AppSnapshot::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &snapshot))
            .unwrap();
    }
}
