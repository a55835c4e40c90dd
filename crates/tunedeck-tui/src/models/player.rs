// Player view-model: latest server state plus a locally extrapolated
// playback position.

use std::time::Instant;

use tunedeck_api::model::{
    OptionType, OptionValue, PlaybackState, PlayerOption, PlayerState, SetOptionRequest,
};

/// Track columns requested with every player update. The window title
/// expression is appended after these.
pub const TRACK_COLUMNS: [&str; 3] = ["%artist%", "%title%", "%album%"];

#[derive(Debug, Clone, Default)]
pub struct PlayerModel {
    state: PlayerState,
    ready: bool,
    /// Position as of the last server update, and when it arrived.
    anchor: Option<(Instant, f64)>,
    position: f64,
}

impl PlayerModel {
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// True once the first player state has been received.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn apply(&mut self, state: PlayerState, now: Instant) -> bool {
        let changed = !self.ready || self.state != state;
        self.position = state.active_item.position;
        self.anchor = Some((now, state.active_item.position));
        self.state = state;
        self.ready = true;
        changed
    }

    /// Advance the displayed position while playing. Returns whether it moved.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.state.playback_state != PlaybackState::Playing {
            return false;
        }
        let Some((at, base)) = self.anchor else {
            return false;
        };

        let mut position = base + now.saturating_duration_since(at).as_secs_f64();
        let duration = self.duration();
        if duration > 0.0 {
            position = position.min(duration);
        }
        if (position - self.position).abs() < f64::EPSILON {
            return false;
        }
        self.position = position;
        true
    }

    pub fn playback_state(&self) -> PlaybackState {
        self.state.playback_state
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.state.active_item.duration
    }

    /// Playback progress in `[0, 1]`; zero for streams without a duration.
    pub fn progress(&self) -> f64 {
        let duration = self.duration();
        if duration <= 0.0 {
            return 0.0;
        }
        (self.position / duration).clamp(0.0, 1.0)
    }

    pub fn has_active_item(&self) -> bool {
        self.state.active_item.is_active()
    }

    fn column(&self, index: usize) -> Option<&str> {
        self.state
            .active_item
            .columns
            .get(index)
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }

    pub fn artist(&self) -> Option<&str> {
        self.column(0)
    }

    pub fn title(&self) -> Option<&str> {
        self.column(1)
    }

    pub fn album(&self) -> Option<&str> {
        self.column(2)
    }

    /// The formatted window title expression, when the player returned it.
    pub fn window_title(&self) -> Option<&str> {
        self.column(TRACK_COLUMNS.len())
    }

    /// Target volume after moving `steps` increments of `step`, clamped to
    /// the device range.
    pub fn stepped_volume(&self, steps: f64, step: f64) -> f64 {
        let volume = &self.state.volume;
        (volume.value + steps * step).clamp(volume.min, volume.max)
    }

    /// Volume position in `[0, 1]` within the device range.
    pub fn volume_ratio(&self) -> f64 {
        let volume = &self.state.volume;
        let span = volume.max - volume.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((volume.value - volume.min) / span).clamp(0.0, 1.0)
    }

    pub fn is_muted(&self) -> bool {
        self.state.volume.is_muted
    }

    pub fn options(&self) -> &[PlayerOption] {
        &self.state.options
    }

    /// Request that moves option `id` to its next value: flips a bool,
    /// advances an enum with wrap-around.
    pub fn next_option_value(&self, id: &str) -> Option<SetOptionRequest> {
        let option = self.state.options.iter().find(|o| o.id == id)?;
        let value = match (option.option_type, option.value) {
            (OptionType::Bool, OptionValue::Bool(b)) => OptionValue::Bool(!b),
            (OptionType::Enum, OptionValue::Index(i)) if !option.enum_names.is_empty() => {
                let len = option.enum_names.len() as i64;
                OptionValue::Index((i + 1).rem_euclid(len))
            }
            _ => return None,
        };
        Some(SetOptionRequest {
            id: option.id.clone(),
            value,
        })
    }

    /// Display text for an option's current value.
    pub fn option_value_label(option: &PlayerOption) -> String {
        match option.value {
            OptionValue::Bool(true) => "on".to_string(),
            OptionValue::Bool(false) => "off".to_string(),
            OptionValue::Index(i) => usize::try_from(i)
                .ok()
                .and_then(|i| option.enum_names.get(i))
                .cloned()
                .unwrap_or_else(|| i.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tunedeck_api::model::{ActiveItemInfo, VolumeInfo};

    fn playing_state(position: f64, duration: f64) -> PlayerState {
        PlayerState {
            playback_state: PlaybackState::Playing,
            active_item: ActiveItemInfo {
                playlist_id: "p1".into(),
                playlist_index: 0,
                index: 3,
                position,
                duration,
                columns: vec![
                    "Artist".into(),
                    "Title".into(),
                    "".into(),
                    "Artist - Title".into(),
                ],
            },
            ..PlayerState::default()
        }
    }

    #[test]
    fn first_apply_reports_change_even_for_default_state() {
        let mut model = PlayerModel::default();
        assert!(!model.is_ready());
        assert!(model.apply(PlayerState::default(), Instant::now()));
        assert!(model.is_ready());
        assert!(!model.apply(PlayerState::default(), Instant::now()));
    }

    #[test]
    fn tick_extrapolates_while_playing() {
        let start = Instant::now();
        let mut model = PlayerModel::default();
        model.apply(playing_state(10.0, 200.0), start);

        assert!(model.tick(start + Duration::from_secs(3)));
        assert!((model.position() - 13.0).abs() < 1e-9);
        assert!((model.progress() - 0.065).abs() < 1e-9);
    }

    #[test]
    fn tick_clamps_to_duration() {
        let start = Instant::now();
        let mut model = PlayerModel::default();
        model.apply(playing_state(198.0, 200.0), start);

        model.tick(start + Duration::from_secs(10));
        assert_eq!(model.position(), 200.0);
        assert!(!model.tick(start + Duration::from_secs(11)));
    }

    #[test]
    fn tick_is_noop_when_paused() {
        let start = Instant::now();
        let mut model = PlayerModel::default();
        let mut state = playing_state(10.0, 200.0);
        state.playback_state = PlaybackState::Paused;
        model.apply(state, start);

        assert!(!model.tick(start + Duration::from_secs(5)));
        assert_eq!(model.position(), 10.0);
    }

    #[test]
    fn progress_is_zero_without_duration() {
        let mut model = PlayerModel::default();
        model.apply(playing_state(42.0, 0.0), Instant::now());
        assert_eq!(model.progress(), 0.0);
    }

    #[test]
    fn columns_map_to_track_fields() {
        let mut model = PlayerModel::default();
        model.apply(playing_state(0.0, 1.0), Instant::now());
        assert_eq!(model.artist(), Some("Artist"));
        assert_eq!(model.title(), Some("Title"));
        assert_eq!(model.album(), None);
        assert_eq!(model.window_title(), Some("Artist - Title"));
    }

    #[test]
    fn volume_steps_are_clamped() {
        let mut model = PlayerModel::default();
        model.apply(
            PlayerState {
                volume: VolumeInfo {
                    min: -100.0,
                    max: 0.0,
                    value: -1.0,
                    ..VolumeInfo::default()
                },
                ..PlayerState::default()
            },
            Instant::now(),
        );

        assert_eq!(model.stepped_volume(1.0, 2.0), 0.0);
        assert_eq!(model.stepped_volume(-1.0, 2.0), -3.0);
        assert_eq!(model.stepped_volume(-100.0, 2.0), -100.0);
        assert!((model.volume_ratio() - 0.99).abs() < 1e-9);
    }

    #[test]
    fn options_cycle() {
        let mut model = PlayerModel::default();
        model.apply(
            PlayerState {
                options: vec![
                    PlayerOption {
                        id: "stopAfterCurrent".into(),
                        option_type: OptionType::Bool,
                        value: OptionValue::Bool(false),
                        ..PlayerOption::default()
                    },
                    PlayerOption {
                        id: "playbackOrder".into(),
                        option_type: OptionType::Enum,
                        value: OptionValue::Index(2),
                        enum_names: vec!["Default".into(), "Repeat".into(), "Shuffle".into()],
                        ..PlayerOption::default()
                    },
                ],
                ..PlayerState::default()
            },
            Instant::now(),
        );

        let flip = model.next_option_value("stopAfterCurrent").unwrap();
        assert_eq!(flip.value, OptionValue::Bool(true));

        let wrap = model.next_option_value("playbackOrder").unwrap();
        assert_eq!(wrap.value, OptionValue::Index(0));

        assert!(model.next_option_value("missing").is_none());
        assert_eq!(PlayerModel::option_value_label(&model.options()[1]), "Shuffle");
    }
}
