// Now-playing widget: current track, progress gauge, volume and options.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Gauge};
use ratatui::Frame;
use tunedeck_api::model::{PlaybackState, VolumeType};

use super::format_duration;
use crate::models::PlayerModel;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let player = &state.snapshot.player;
    let settings = state.snapshot.settings.values();

    let mut block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", track_line(player)));
    if settings.show_playback_info {
        block = block.title_bottom(Line::from(format!(" {} ", info_line(player))).right_aligned());
    }

    let label = if player.has_active_item() {
        format!(
            "{} / {}",
            format_duration(player.position()),
            format_duration(player.duration())
        )
    } else {
        String::new()
    };

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(player.progress())
        .label(label);
    frame.render_widget(gauge, area);
}

fn state_symbol(state: PlaybackState) -> &'static str {
    match state {
        PlaybackState::Playing => "▶",
        PlaybackState::Paused => "⏸",
        PlaybackState::Stopped => "■",
    }
}

/// Playback symbol followed by artist and title.
pub fn track_line(player: &PlayerModel) -> String {
    if !player.is_ready() {
        return "Waiting for player".to_string();
    }
    if !player.has_active_item() {
        return format!("{} Nothing playing", state_symbol(PlaybackState::Stopped));
    }
    let symbol = state_symbol(player.playback_state());
    match (player.artist(), player.title()) {
        (Some(artist), Some(title)) => format!("{symbol} {artist} - {title}"),
        (None, Some(title)) => format!("{symbol} {title}"),
        (Some(artist), None) => format!("{symbol} {artist}"),
        (None, None) => symbol.to_string(),
    }
}

/// Album, volume and option values, separated by `|`.
pub fn info_line(player: &PlayerModel) -> String {
    let mut parts = Vec::new();
    if let Some(album) = player.album() {
        parts.push(album.to_string());
    }
    parts.push(volume_label(player));
    let state = player.state();
    if let Some(mode) = usize::try_from(state.playback_mode)
        .ok()
        .and_then(|i| state.playback_modes.get(i))
    {
        parts.push(format!("Mode: {mode}"));
    }
    for option in player.options() {
        parts.push(format!("{}: {}", option.name, PlayerModel::option_value_label(option)));
    }
    parts.join(" | ")
}

pub fn volume_label(player: &PlayerModel) -> String {
    if player.is_muted() {
        return "Vol: muted".to_string();
    }
    let volume = &player.state().volume;
    match volume.volume_type {
        VolumeType::Db => format!("Vol: {:.1} dB", volume.value),
        VolumeType::Linear => format!("Vol: {:.0}%", player.volume_ratio() * 100.0),
        VolumeType::UpDown => "Vol: ±".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tunedeck_api::model::{
        ActiveItemInfo, OptionType, OptionValue, PlayerOption, PlayerState, VolumeInfo,
    };

    fn model(state: PlayerState) -> PlayerModel {
        let mut model = PlayerModel::default();
        model.apply(state, Instant::now());
        model
    }

    fn active(columns: &[&str]) -> ActiveItemInfo {
        ActiveItemInfo {
            playlist_id: "p1".into(),
            playlist_index: 0,
            index: 0,
            duration: 100.0,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            ..ActiveItemInfo::default()
        }
    }

    #[test]
    fn track_line_states() {
        assert_eq!(track_line(&PlayerModel::default()), "Waiting for player");
        assert_eq!(track_line(&model(PlayerState::default())), "■ Nothing playing");

        let playing = model(PlayerState {
            playback_state: PlaybackState::Playing,
            active_item: active(&["Band", "Song", "Record"]),
            ..PlayerState::default()
        });
        assert_eq!(track_line(&playing), "▶ Band - Song");

        let untitled = model(PlayerState {
            playback_state: PlaybackState::Paused,
            active_item: active(&["", "Song"]),
            ..PlayerState::default()
        });
        assert_eq!(track_line(&untitled), "⏸ Song");
    }

    #[test]
    fn info_line_lists_album_volume_and_options() {
        let player = model(PlayerState {
            active_item: active(&["Band", "Song", "Record"]),
            volume: VolumeInfo {
                value: -6.5,
                ..VolumeInfo::default()
            },
            options: vec![PlayerOption {
                id: "playbackOrder".into(),
                name: "Order".into(),
                option_type: OptionType::Enum,
                value: OptionValue::Index(1),
                enum_names: vec!["Default".into(), "Shuffle".into()],
            }],
            ..PlayerState::default()
        });
        assert_eq!(info_line(&player), "Record | Vol: -6.5 dB | Order: Shuffle");
    }

    #[test]
    fn volume_label_variants() {
        let linear = model(PlayerState {
            volume: VolumeInfo {
                volume_type: VolumeType::Linear,
                min: 0.0,
                max: 100.0,
                value: 40.0,
                is_muted: false,
            },
            ..PlayerState::default()
        });
        assert_eq!(volume_label(&linear), "Vol: 40%");

        let muted = model(PlayerState {
            volume: VolumeInfo {
                is_muted: true,
                ..VolumeInfo::default()
            },
            ..PlayerState::default()
        });
        assert_eq!(volume_label(&muted), "Vol: muted");
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(80, 3);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
