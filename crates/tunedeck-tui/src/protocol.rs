// Messages exchanged between the orchestrator and the terminal UI.

use crate::models::{BrowserModel, PlayerModel, PlaylistModel, SettingsModel};

/// Main panel tabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TabId {
    #[default]
    Playlist,
    Browser,
    Settings,
}

impl TabId {
    pub const ALL: [TabId; 3] = [TabId::Playlist, TabId::Browser, TabId::Settings];

    pub fn title(self) -> &'static str {
        match self {
            TabId::Playlist => "Playlist",
            TabId::Browser => "Browser",
            TabId::Settings => "Settings",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Disconnected(String),
}

/// Everything the UI renders, cloned out of the orchestrator's state.
#[derive(Debug, Clone, Default)]
pub struct AppSnapshot {
    pub player: PlayerModel,
    pub playlist: PlaylistModel,
    pub browser: BrowserModel,
    pub settings: SettingsModel,
}

/// Updates pushed from the orchestrator to the UI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    Snapshot(Box<AppSnapshot>),
    ConnectionStatus(ConnectionStatus),
    /// One-line message for the status bar (command failures, hints).
    Status(String),
}

/// Commands sent from the UI to the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    TogglePause,
    Stop,
    Next,
    Previous,
    PlayRandom,
    VolumeUp,
    VolumeDown,
    ToggleMute,
    /// Seek relative to the current position, in seconds.
    Seek(f64),
    CycleOption,
    /// Make the playlist `delta` positions away current.
    SwitchPlaylist(i32),
    MoveCursor { tab: TabId, delta: i32 },
    /// Enter on the selected row: play an item, open a directory, or change
    /// a setting.
    Activate(TabId),
    BrowseParent,
    /// Append the selected browser entry to the current playlist.
    AddSelected,
    RemoveSelected,
    /// Move the selected playlist item up (negative) or down.
    MoveSelected(i32),
    ClearPlaylist,
    ShufflePlaylist,
    AddPlaylist,
    RemovePlaylist,
    Quit,
}

impl UserCommand {
    /// Short description used in status messages.
    pub fn label(&self) -> &'static str {
        match self {
            UserCommand::TogglePause => "pause",
            UserCommand::Stop => "stop",
            UserCommand::Next => "next track",
            UserCommand::Previous => "previous track",
            UserCommand::PlayRandom => "random track",
            UserCommand::VolumeUp | UserCommand::VolumeDown => "volume",
            UserCommand::ToggleMute => "mute",
            UserCommand::Seek(_) => "seek",
            UserCommand::CycleOption => "player option",
            UserCommand::SwitchPlaylist(_) => "switch playlist",
            UserCommand::MoveCursor { .. } => "move cursor",
            UserCommand::Activate(TabId::Playlist) => "play item",
            UserCommand::Activate(TabId::Browser) => "open entry",
            UserCommand::Activate(TabId::Settings) => "change setting",
            UserCommand::BrowseParent => "open parent directory",
            UserCommand::AddSelected => "add to playlist",
            UserCommand::RemoveSelected => "remove item",
            UserCommand::MoveSelected(_) => "move item",
            UserCommand::ClearPlaylist => "clear playlist",
            UserCommand::ShufflePlaylist => "shuffle playlist",
            UserCommand::AddPlaylist => "add playlist",
            UserCommand::RemovePlaylist => "remove playlist",
            UserCommand::Quit => "quit",
        }
    }
}
