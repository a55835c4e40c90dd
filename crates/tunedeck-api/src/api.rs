// The player API surface as a trait, so orchestration code can run against
// the HTTP client or a test double.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiResult;
use crate::model::{
    AddItemsRequest, AddPlaylistRequest, BrowserEntries, BrowserRoots, ItemTransfer,
    PlayerState, PlaylistInfo, PlaylistItemsResult, PlaylistRef, QueryOptions, QueryResult,
    SetPlayerRequest, SortItemsRequest,
};
use crate::range::Range;

#[async_trait]
pub trait PlayerApi: Send + Sync {
    // -- player --

    async fn get_player(&self, columns: &[String]) -> ApiResult<PlayerState>;
    async fn set_player(&self, request: &SetPlayerRequest) -> ApiResult<()>;
    async fn play(&self, playlist: &PlaylistRef, index: u32) -> ApiResult<()>;
    async fn play_current(&self) -> ApiResult<()>;
    async fn play_random(&self) -> ApiResult<()>;
    async fn stop(&self) -> ApiResult<()>;
    async fn pause(&self) -> ApiResult<()>;
    async fn toggle_pause(&self) -> ApiResult<()>;
    /// Skip forward; `by` is an optional title-format expression the next
    /// track must differ in (e.g. `%artist%`).
    async fn next(&self, by: Option<&str>) -> ApiResult<()>;
    async fn previous(&self, by: Option<&str>) -> ApiResult<()>;

    // -- playlists --

    async fn get_playlists(&self) -> ApiResult<Vec<PlaylistInfo>>;
    async fn set_current_playlist(&self, playlist: &PlaylistRef) -> ApiResult<()>;
    async fn add_playlist(&self, request: &AddPlaylistRequest) -> ApiResult<()>;
    async fn remove_playlist(&self, playlist: &PlaylistRef) -> ApiResult<()>;
    async fn move_playlist(&self, playlist: &PlaylistRef, index: u32) -> ApiResult<()>;
    async fn clear_playlist(&self, playlist: &PlaylistRef) -> ApiResult<()>;
    async fn rename_playlist(&self, playlist: &PlaylistRef, title: &str) -> ApiResult<()>;

    // -- playlist items --

    async fn get_playlist_items(
        &self,
        playlist: &PlaylistRef,
        range: Range,
        columns: &[String],
    ) -> ApiResult<PlaylistItemsResult>;
    async fn add_playlist_items(
        &self,
        playlist: &PlaylistRef,
        request: &AddItemsRequest,
    ) -> ApiResult<()>;
    async fn sort_playlist_items(
        &self,
        playlist: &PlaylistRef,
        request: &SortItemsRequest,
    ) -> ApiResult<()>;
    async fn remove_playlist_items(&self, playlist: &PlaylistRef, items: &[u32]) -> ApiResult<()>;
    async fn copy_playlist_items(
        &self,
        transfer: &ItemTransfer,
        items: &[u32],
        target_index: Option<u32>,
    ) -> ApiResult<()>;
    async fn move_playlist_items(
        &self,
        transfer: &ItemTransfer,
        items: &[u32],
        target_index: Option<u32>,
    ) -> ApiResult<()>;

    // -- file browser --

    async fn get_roots(&self) -> ApiResult<BrowserRoots>;
    async fn get_entries(&self, path: &str) -> ApiResult<BrowserEntries>;

    // -- misc --

    async fn query(&self, options: &QueryOptions) -> ApiResult<QueryResult>;
    /// Artwork of the current track, or `None` when the player has none.
    async fn get_current_artwork(&self) -> ApiResult<Option<Vec<u8>>>;
    async fn get_artwork(&self, playlist: &PlaylistRef, index: u32)
        -> ApiResult<Option<Vec<u8>>>;
    async fn get_client_config(&self, id: &str) -> ApiResult<Option<Value>>;
    async fn set_client_config(&self, id: &str, value: &Value) -> ApiResult<()>;
}
