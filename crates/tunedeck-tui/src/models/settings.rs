// Settings view-model: the persisted settings plus a cursor over the
// editable fields.

use crate::settings::Settings;

const VOLUME_STEPS: [f64; 5] = [0.5, 1.0, 2.0, 5.0, 10.0];

const COLUMN_PRESETS: [&[&str]; 4] = [
    &["%artist%", "%title%", "%length%"],
    &["%tracknumber%", "%title%", "%length%"],
    &["%artist%", "%album%", "%title%", "%length%"],
    &["%filename%", "%length%"],
];

const TITLE_PRESETS: [&str; 3] = ["%artist% - %title%", "%title%", "%title% [%album%]"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingField {
    CursorFollowsPlayback,
    ShowPlaybackInfo,
    VolumeStep,
    PlaylistColumns,
    WindowTitle,
}

impl SettingField {
    pub const ALL: [SettingField; 5] = [
        SettingField::CursorFollowsPlayback,
        SettingField::ShowPlaybackInfo,
        SettingField::VolumeStep,
        SettingField::PlaylistColumns,
        SettingField::WindowTitle,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SettingField::CursorFollowsPlayback => "Cursor follows playback",
            SettingField::ShowPlaybackInfo => "Show playback info",
            SettingField::VolumeStep => "Volume step",
            SettingField::PlaylistColumns => "Playlist columns",
            SettingField::WindowTitle => "Window title",
        }
    }

    pub fn display_value(self, settings: &Settings) -> String {
        match self {
            SettingField::CursorFollowsPlayback => yes_no(settings.cursor_follows_playback),
            SettingField::ShowPlaybackInfo => yes_no(settings.show_playback_info),
            SettingField::VolumeStep => format!("{}", settings.volume_step),
            SettingField::PlaylistColumns => settings.playlist_columns.join(", "),
            SettingField::WindowTitle => settings.window_title.clone(),
        }
    }

    /// Move the field to its next value: flip booleans, cycle presets.
    pub fn advance(self, settings: &mut Settings) {
        match self {
            SettingField::CursorFollowsPlayback => {
                settings.cursor_follows_playback = !settings.cursor_follows_playback
            }
            SettingField::ShowPlaybackInfo => {
                settings.show_playback_info = !settings.show_playback_info
            }
            SettingField::VolumeStep => {
                settings.volume_step = VOLUME_STEPS
                    .iter()
                    .copied()
                    .find(|step| *step > settings.volume_step)
                    .unwrap_or(VOLUME_STEPS[0]);
            }
            SettingField::PlaylistColumns => {
                let next = next_preset(&COLUMN_PRESETS, |p| {
                    p.iter().copied().eq(settings.playlist_columns.iter().map(String::as_str))
                });
                settings.playlist_columns = next.iter().map(|c| c.to_string()).collect();
            }
            SettingField::WindowTitle => {
                let next = next_preset(&TITLE_PRESETS, |p| *p == settings.window_title);
                settings.window_title = next.to_string();
            }
        }
    }
}

fn yes_no(value: bool) -> String {
    let text = if value { "yes" } else { "no" };
    text.to_string()
}

/// The preset after the one matching `is_current`, or the first preset when
/// the current value is custom.
fn next_preset<T: Copy>(presets: &[T], is_current: impl Fn(&T) -> bool) -> T {
    let next = presets
        .iter()
        .position(is_current)
        .map_or(0, |i| (i + 1) % presets.len());
    presets[next]
}

#[derive(Debug, Clone, Default)]
pub struct SettingsModel {
    values: Settings,
    cursor: usize,
}

impl SettingsModel {
    pub fn new(values: Settings) -> Self {
        SettingsModel { values, cursor: 0 }
    }

    pub fn values(&self) -> &Settings {
        &self.values
    }

    pub fn apply(&mut self, values: Settings) -> bool {
        if self.values == values {
            return false;
        }
        self.values = values;
        true
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn selected(&self) -> SettingField {
        SettingField::ALL[self.cursor.min(SettingField::ALL.len() - 1)]
    }

    pub fn move_cursor(&mut self, delta: i32) -> bool {
        let last = SettingField::ALL.len() as i64 - 1;
        let target = (self.cursor as i64 + i64::from(delta)).clamp(0, last) as usize;
        if target == self.cursor {
            return false;
        }
        self.cursor = target;
        true
    }

    /// Advance the selected field and return the updated settings.
    pub fn advance_selected(&mut self) -> &Settings {
        self.selected().advance(&mut self.values);
        &self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_toggle() {
        let mut model = SettingsModel::new(Settings::default());
        assert_eq!(model.selected(), SettingField::CursorFollowsPlayback);
        assert!(!model.advance_selected().cursor_follows_playback);
        assert!(model.advance_selected().cursor_follows_playback);
    }

    #[test]
    fn volume_step_cycles_through_presets() {
        let mut settings = Settings::default();
        SettingField::VolumeStep.advance(&mut settings);
        assert_eq!(settings.volume_step, 5.0);
        SettingField::VolumeStep.advance(&mut settings);
        assert_eq!(settings.volume_step, 10.0);
        SettingField::VolumeStep.advance(&mut settings);
        assert_eq!(settings.volume_step, 0.5);

        settings.volume_step = 3.0;
        SettingField::VolumeStep.advance(&mut settings);
        assert_eq!(settings.volume_step, 5.0);
    }

    #[test]
    fn columns_cycle_from_default_and_custom() {
        let mut settings = Settings::default();
        SettingField::PlaylistColumns.advance(&mut settings);
        assert_eq!(settings.playlist_columns[0], "%tracknumber%");

        settings.playlist_columns = vec!["%path%".into()];
        SettingField::PlaylistColumns.advance(&mut settings);
        assert_eq!(settings.playlist_columns, vec!["%artist%", "%title%", "%length%"]);
    }

    #[test]
    fn window_title_wraps() {
        let mut settings = Settings::default();
        for _ in 0..TITLE_PRESETS.len() {
            SettingField::WindowTitle.advance(&mut settings);
        }
        assert_eq!(settings.window_title, "%artist% - %title%");
    }

    #[test]
    fn cursor_stays_in_bounds() {
        let mut model = SettingsModel::default();
        assert!(!model.move_cursor(-1));
        assert!(model.move_cursor(99));
        assert_eq!(model.selected(), SettingField::WindowTitle);
        assert_eq!(SettingField::WindowTitle.display_value(model.values()), "%artist% - %title%");
    }

    #[test]
    fn apply_reports_change() {
        let mut model = SettingsModel::default();
        assert!(!model.apply(Settings::default()));
        let mut changed = Settings::default();
        changed.volume_step = 1.0;
        assert!(model.apply(changed));
    }
}
