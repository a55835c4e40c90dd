// Wire types for the player API.
//
// Field names follow the server's camelCase JSON. Response types are lenient
// (`#[serde(default)]`) so older or newer servers with missing fields still
// decode; request types omit unset optional fields.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::range::Range;

// ---------------------------------------------------------------------------
// Playlist references
// ---------------------------------------------------------------------------

/// Playlist reference used in API paths: either the playlist id or its index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlaylistRef {
    Id(String),
    Index(u32),
}

impl fmt::Display for PlaylistRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaylistRef::Id(id) => f.write_str(id),
            PlaylistRef::Index(index) => write!(f, "{index}"),
        }
    }
}

impl From<&str> for PlaylistRef {
    fn from(id: &str) -> Self {
        PlaylistRef::Id(id.to_string())
    }
}

impl From<String> for PlaylistRef {
    fn from(id: String) -> Self {
        PlaylistRef::Id(id)
    }
}

impl From<u32> for PlaylistRef {
    fn from(index: u32) -> Self {
        PlaylistRef::Index(index)
    }
}

impl Serialize for PlaylistRef {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            PlaylistRef::Id(id) => serializer.serialize_str(id),
            PlaylistRef::Index(index) => serializer.serialize_u32(*index),
        }
    }
}

// ---------------------------------------------------------------------------
// Player
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaybackState {
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerInfo {
    pub name: String,
    pub title: String,
    pub version: String,
    pub plugin_version: String,
}

/// The track the player is positioned on. Indices are `-1` when nothing is
/// active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ActiveItemInfo {
    pub playlist_id: String,
    pub playlist_index: i32,
    pub index: i32,
    pub position: f64,
    pub duration: f64,
    pub columns: Vec<String>,
}

impl Default for ActiveItemInfo {
    fn default() -> Self {
        ActiveItemInfo {
            playlist_id: String::new(),
            playlist_index: -1,
            index: -1,
            position: 0.0,
            duration: 0.0,
            columns: Vec::new(),
        }
    }
}

impl ActiveItemInfo {
    pub fn is_active(&self) -> bool {
        self.playlist_index >= 0 && self.index >= 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VolumeType {
    #[default]
    Db,
    Linear,
    UpDown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VolumeInfo {
    #[serde(rename = "type")]
    pub volume_type: VolumeType,
    pub min: f64,
    pub max: f64,
    pub value: f64,
    pub is_muted: bool,
}

impl Default for VolumeInfo {
    fn default() -> Self {
        VolumeInfo {
            volume_type: VolumeType::Db,
            min: -100.0,
            max: 0.0,
            value: 0.0,
            is_muted: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionType {
    #[default]
    Bool,
    Enum,
}

/// Value of a player option: a flag for `bool` options, an index into
/// `enum_names` for `enum` options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Index(i64),
}

impl Default for OptionValue {
    fn default() -> Self {
        OptionValue::Bool(false)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerOption {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub value: OptionValue,
    pub enum_names: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlayerState {
    pub info: PlayerInfo,
    pub active_item: ActiveItemInfo,
    pub playback_state: PlaybackState,
    pub volume: VolumeInfo,
    pub playback_mode: i32,
    pub playback_modes: Vec<String>,
    pub options: Vec<PlayerOption>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlayerResponse {
    pub player: PlayerState,
}

/// Body of `POST api/player`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPlayerRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_muted: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relative_position: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_mode: Option<i32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SetOptionRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetOptionRequest {
    pub id: String,
    pub value: OptionValue,
}

// ---------------------------------------------------------------------------
// Playlists
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistInfo {
    pub id: String,
    pub index: u32,
    pub title: String,
    pub is_current: bool,
    pub item_count: u32,
    pub total_time: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PlaylistsResponse {
    pub playlists: Vec<PlaylistInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaylistItem {
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaylistItemsResult {
    pub offset: u32,
    pub total_count: u32,
    pub items: Vec<PlaylistItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PlaylistItemsResponse {
    pub playlist_items: PlaylistItemsResult,
}

/// Body of `POST api/playlists/add`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPlaylistRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_current: Option<bool>,
}

/// Body of `POST api/playlists/:plref/items/add`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(rename = "async", skip_serializing_if = "Option::is_none")]
    pub is_async: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub replace: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub play: Option<bool>,
    pub items: Vec<String>,
}

impl AddItemsRequest {
    pub fn new(items: Vec<String>) -> Self {
        AddItemsRequest {
            items,
            ..AddItemsRequest::default()
        }
    }
}

/// Body of `POST api/playlists/:plref/items/sort`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortItemsRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub random: Option<bool>,
}

impl SortItemsRequest {
    pub fn by(expression: impl Into<String>, desc: bool) -> Self {
        SortItemsRequest {
            by: Some(expression.into()),
            desc: Some(desc),
            random: None,
        }
    }

    pub fn random() -> Self {
        SortItemsRequest {
            random: Some(true),
            ..SortItemsRequest::default()
        }
    }
}

/// Source and target of an item copy/move.
///
/// Within one playlist the request goes to `api/playlists/:plref/items/...`;
/// across playlists it goes to `api/playlists/items/...` with `from`/`to`
/// in the body. The two shapes cannot be mixed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemTransfer {
    Within(PlaylistRef),
    Between { from: PlaylistRef, to: PlaylistRef },
}

impl ItemTransfer {
    /// Build a transfer from loosely specified parts, rejecting ambiguous or
    /// incomplete combinations.
    pub fn from_parts(
        playlist: Option<PlaylistRef>,
        from: Option<PlaylistRef>,
        to: Option<PlaylistRef>,
    ) -> Result<Self, crate::error::ApiError> {
        use crate::error::ApiError;
        match (playlist, from, to) {
            (Some(playlist), None, None) => Ok(ItemTransfer::Within(playlist)),
            (None, Some(from), Some(to)) => Ok(ItemTransfer::Between { from, to }),
            (Some(_), _, _) => Err(ApiError::InvalidRequest(
                "`playlist` and `from`/`to` are mutually exclusive".into(),
            )),
            (None, _, _) => Err(ApiError::InvalidRequest(
                "either `playlist` or both `from` and `to` are required".into(),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TransferItemsBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<&'a PlaylistRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<&'a PlaylistRef>,
    pub items: &'a [u32],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_index: Option<u32>,
}

// ---------------------------------------------------------------------------
// File browser
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FileSystemEntryType {
    #[serde(rename = "D")]
    Directory,
    #[default]
    #[serde(rename = "F")]
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSystemEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: FileSystemEntryType,
    pub size: u64,
    /// Seconds since the Unix epoch.
    pub timestamp: i64,
}

impl FileSystemEntry {
    pub fn is_directory(&self) -> bool {
        self.entry_type == FileSystemEntryType::Directory
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserRoots {
    pub roots: Vec<FileSystemEntry>,
    pub path_separator: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BrowserEntries {
    pub entries: Vec<FileSystemEntry>,
    pub path_separator: String,
}

// ---------------------------------------------------------------------------
// Combined queries and subscriptions
// ---------------------------------------------------------------------------

/// Which state slices a query or subscription covers.
///
/// Serialized as query parameters (`player`, `trcolumns`, `playlists`,
/// `playlistItems`, `plref`, `plrange`, `plcolumns`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryOptions {
    pub player: bool,
    pub track_columns: Vec<String>,
    pub playlists: bool,
    pub playlist_items: bool,
    pub playlist_ref: Option<PlaylistRef>,
    pub playlist_range: Option<Range>,
    pub playlist_columns: Vec<String>,
}

impl QueryOptions {
    /// Flatten into query-string pairs. Slices that are not requested
    /// contribute no parameters.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if self.player {
            pairs.push(("player", "true".to_string()));
            if !self.track_columns.is_empty() {
                pairs.push(("trcolumns", self.track_columns.join(",")));
            }
        }

        if self.playlists {
            pairs.push(("playlists", "true".to_string()));
        }

        if self.playlist_items {
            pairs.push(("playlistItems", "true".to_string()));
            if let Some(plref) = &self.playlist_ref {
                pairs.push(("plref", plref.to_string()));
            }
            pairs.push(("plrange", self.playlist_range.unwrap_or_default().to_string()));
            if !self.playlist_columns.is_empty() {
                pairs.push(("plcolumns", self.playlist_columns.join(",")));
            }
        }

        pairs
    }

    pub fn is_empty(&self) -> bool {
        !self.player && !self.playlists && !self.playlist_items
    }
}

/// Combined snapshot from `api/query`, and the payload of each
/// `api/query/updates` message (only changed slices present).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub player: Option<PlayerState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlists: Option<Vec<PlaylistInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_items: Option<PlaylistItemsResult>,
}

impl QueryResult {
    pub fn is_empty(&self) -> bool {
        self.player.is_none() && self.playlists.is_none() && self.playlist_items.is_none()
    }
}

/// Change notification carried by each `api/query/events` message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryEvents {
    pub player: bool,
    pub playlists: bool,
    pub playlist_items: bool,
}

impl QueryEvents {
    pub fn any(&self) -> bool {
        self.player || self.playlists || self.playlist_items
    }
}
