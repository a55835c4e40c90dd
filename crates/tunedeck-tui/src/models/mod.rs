// View-models mirroring slices of player state for rendering.
//
// Each model's `apply*` methods report whether anything visible changed so
// the orchestrator only pushes snapshots when needed.

pub mod browser;
pub mod player;
pub mod playlist;
pub mod settings;

pub use browser::BrowserModel;
pub use player::PlayerModel;
pub use playlist::PlaylistModel;
pub use settings::{SettingField, SettingsModel};
