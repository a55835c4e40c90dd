// Terminal UI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` holding the latest snapshot from the app
// orchestrator plus purely local state (active tab, quit confirmation,
// status message). The orchestrator pushes `UiUpdate` messages over an mpsc
// channel; the TUI applies them and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream};
use crossterm::terminal::SetTitle;
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;
use tracing::warn;

use crate::protocol::{AppSnapshot, ConnectionStatus, TabId, UiUpdate, UserCommand};

use layout::build_layout;

/// How long a status message stays in the status bar.
pub const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(6);

const DEFAULT_WINDOW_TITLE: &str = "tunedeck";

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct ViewState {
    pub snapshot: AppSnapshot,
    pub connection_status: ConnectionStatus,
    /// Last status message and when it arrived.
    pub status_message: Option<(String, Instant)>,
    pub active_tab: TabId,
    pub confirm_quit: bool,
}

impl ViewState {
    /// The status message, if it has not expired yet.
    pub fn current_status(&self, now: Instant) -> Option<&str> {
        self.status_message
            .as_ref()
            .filter(|(_, at)| now.saturating_duration_since(*at) < STATUS_MESSAGE_TTL)
            .map(|(text, _)| text.as_str())
    }

    /// Terminal window title: the player's rendering of the configured title
    /// expression while a track is active.
    pub fn window_title(&self) -> String {
        let player = &self.snapshot.player;
        match player.window_title() {
            Some(title) if player.has_active_item() => format!("{title} - {DEFAULT_WINDOW_TITLE}"),
            _ => DEFAULT_WINDOW_TITLE.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Snapshot(snapshot) => {
            state.snapshot = *snapshot;
        }
        UiUpdate::ConnectionStatus(status) => {
            state.connection_status = status;
        }
        UiUpdate::Status(message) => {
            state.status_message = Some((message, Instant::now()));
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::now_playing::render(frame, layout.now_playing, state);
    widgets::tab_bar::render(frame, layout.tab_bar, state.active_tab);
    match state.active_tab {
        TabId::Playlist => widgets::playlist::render(frame, layout.main_panel, &state.snapshot),
        TabId::Browser => widgets::browser::render(frame, layout.main_panel, &state.snapshot),
        TabId::Settings => widgets::settings::render(frame, layout.main_panel, &state.snapshot),
    }
    widgets::help_bar::render(frame, layout.help_bar, state.active_tab);

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

fn set_window_title(title: &str) {
    if let Err(e) = crossterm::execute!(std::io::stdout(), SetTitle(title)) {
        warn!("failed to set window title: {}", e);
    }
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// Initializes the terminal, installs a panic hook that restores it, then
/// selects over UI updates, keyboard input and a render tick until the user
/// quits or the orchestrator goes away.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut window_title = String::new();
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // Orchestrator is shutting down.
                    None => break,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        match input::handle_key(key_event, &mut view_state) {
                            Some(UserCommand::Quit) => {
                                let _ = cmd_tx.send(UserCommand::Quit).await;
                                break;
                            }
                            Some(cmd) => {
                                let _ = cmd_tx.send(cmd).await;
                            }
                            None => {}
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        warn!("terminal input error: {}", e);
                        break;
                    }
                    None => break,
                }
            }

            _ = render_tick.tick() => {
                let title = view_state.window_title();
                if title != window_title {
                    set_window_title(&title);
                    window_title = title;
                }
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlayerModel;
    use tunedeck_api::model::{ActiveItemInfo, PlayerState};

    fn snapshot_with_title(index: i32, title: &str) -> AppSnapshot {
        let mut player = PlayerModel::default();
        player.apply(
            PlayerState {
                active_item: ActiveItemInfo {
                    playlist_id: "p1".into(),
                    playlist_index: 0,
                    index,
                    columns: vec!["A".into(), "T".into(), "".into(), title.into()],
                    ..ActiveItemInfo::default()
                },
                ..PlayerState::default()
            },
            Instant::now(),
        );
        AppSnapshot {
            player,
            ..AppSnapshot::default()
        }
    }

    #[test]
    fn view_state_default_is_sensible() {
        let state = ViewState::default();
        assert_eq!(state.active_tab, TabId::Playlist);
        assert_eq!(state.connection_status, ConnectionStatus::Connecting);
        assert!(!state.confirm_quit);
        assert!(state.current_status(Instant::now()).is_none());
        assert_eq!(state.window_title(), "tunedeck");
    }

    #[test]
    fn apply_ui_update_snapshot_replaces_models() {
        let mut state = ViewState::default();
        apply_ui_update(
            &mut state,
            UiUpdate::Snapshot(Box::new(snapshot_with_title(2, "A - T"))),
        );
        assert!(state.snapshot.player.is_ready());
        assert_eq!(state.window_title(), "A - T - tunedeck");
    }

    #[test]
    fn window_title_ignores_inactive_player() {
        let mut state = ViewState::default();
        state.snapshot = snapshot_with_title(-1, "stale");
        assert_eq!(state.window_title(), "tunedeck");
    }

    #[test]
    fn apply_ui_update_connection_status() {
        let mut state = ViewState::default();
        apply_ui_update(
            &mut state,
            UiUpdate::ConnectionStatus(ConnectionStatus::Connected),
        );
        assert_eq!(state.connection_status, ConnectionStatus::Connected);
    }

    #[test]
    fn status_message_expires() {
        let mut state = ViewState::default();
        apply_ui_update(&mut state, UiUpdate::Status("stop failed".into()));

        let now = Instant::now();
        assert_eq!(state.current_status(now), Some("stop failed"));
        assert!(state
            .current_status(now + STATUS_MESSAGE_TTL + Duration::from_secs(1))
            .is_none());
    }

    #[test]
    fn render_frame_does_not_panic_on_any_tab() {
        let backend = ratatui::backend::TestBackend::new(100, 30);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut state = ViewState::default();
        state.snapshot = snapshot_with_title(0, "x");
        state.confirm_quit = true;
        for tab in TabId::ALL {
            state.active_tab = tab;
            terminal.draw(|frame| render_frame(frame, &state)).unwrap();
        }
    }
}
