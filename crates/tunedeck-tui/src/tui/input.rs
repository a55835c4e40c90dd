// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// orchestrator, or into local ViewState changes (tab switching, quit
// confirmation, dismissing the status message).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::ViewState;
use crate::protocol::{TabId, UserCommand};

/// Seconds skipped by `,` and `.`.
pub const SEEK_STEP: f64 = 5.0;

/// Rows moved by PageUp / PageDown.
const PAGE_STEP: i32 = 10;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app orchestrator, `None` when it was handled locally or ignored.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of mode
    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    let tab = view_state.active_tab;
    match key_event.code {
        // Transport
        KeyCode::Char(' ') => Some(UserCommand::TogglePause),
        KeyCode::Char('s') => Some(UserCommand::Stop),
        KeyCode::Char('n') => Some(UserCommand::Next),
        KeyCode::Char('p') => Some(UserCommand::Previous),
        KeyCode::Char('r') => Some(UserCommand::PlayRandom),
        KeyCode::Char('+') | KeyCode::Char('=') => Some(UserCommand::VolumeUp),
        KeyCode::Char('-') => Some(UserCommand::VolumeDown),
        KeyCode::Char('m') => Some(UserCommand::ToggleMute),
        KeyCode::Char(',') => Some(UserCommand::Seek(-SEEK_STEP)),
        KeyCode::Char('.') => Some(UserCommand::Seek(SEEK_STEP)),
        KeyCode::Char('o') => Some(UserCommand::CycleOption),

        // Playlists
        KeyCode::Char('[') => Some(UserCommand::SwitchPlaylist(-1)),
        KeyCode::Char(']') => Some(UserCommand::SwitchPlaylist(1)),
        KeyCode::Char('N') => Some(UserCommand::AddPlaylist),
        KeyCode::Char('X') => Some(UserCommand::RemovePlaylist),

        // Tab switching
        KeyCode::Char('1') => switch_tab(view_state, TabId::Playlist),
        KeyCode::Char('2') => switch_tab(view_state, TabId::Browser),
        KeyCode::Char('3') => switch_tab(view_state, TabId::Settings),
        KeyCode::Tab => {
            let next = match tab {
                TabId::Playlist => TabId::Browser,
                TabId::Browser => TabId::Settings,
                TabId::Settings => TabId::Playlist,
            };
            switch_tab(view_state, next)
        }

        // Cursor
        KeyCode::Up | KeyCode::Char('k') => move_cursor(tab, -1),
        KeyCode::Down | KeyCode::Char('j') => move_cursor(tab, 1),
        KeyCode::PageUp => move_cursor(tab, -PAGE_STEP),
        KeyCode::PageDown => move_cursor(tab, PAGE_STEP),
        KeyCode::Home => move_cursor(tab, i32::MIN),
        KeyCode::End => move_cursor(tab, i32::MAX),
        KeyCode::Enter => Some(UserCommand::Activate(tab)),

        // Tab-specific actions
        KeyCode::Backspace if tab == TabId::Browser => Some(UserCommand::BrowseParent),
        KeyCode::Char('a') if tab == TabId::Browser => Some(UserCommand::AddSelected),
        KeyCode::Char('d') | KeyCode::Delete if tab == TabId::Playlist => {
            Some(UserCommand::RemoveSelected)
        }
        KeyCode::Char('K') if tab == TabId::Playlist => Some(UserCommand::MoveSelected(-1)),
        KeyCode::Char('J') if tab == TabId::Playlist => Some(UserCommand::MoveSelected(1)),
        KeyCode::Char('c') if tab == TabId::Playlist => Some(UserCommand::ClearPlaylist),
        KeyCode::Char('S') if tab == TabId::Playlist => Some(UserCommand::ShufflePlaylist),

        KeyCode::Esc => {
            view_state.status_message = None;
            None
        }

        // Quit: enter confirmation mode instead of quitting immediately
        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }

        _ => None,
    }
}

fn switch_tab(view_state: &mut ViewState, tab: TabId) -> Option<UserCommand> {
    view_state.active_tab = tab;
    None
}

fn move_cursor(tab: TabId, delta: i32) -> Option<UserCommand> {
    Some(UserCommand::MoveCursor { tab, delta })
}

/// `y`/`q` confirm, `n`/Esc cancel, everything else is blocked.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
