// HTTP client for the player API.
//
// Every endpoint is a thin GET/POST under `{base}/api/`. JSON responses are
// decoded into the wire types in `model`; non-2xx responses become
// `ApiError::Http` carrying the server's error body untouched.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::api::PlayerApi;
use crate::error::{ApiError, ApiResult, ErrorBody};
use crate::model::{
    AddItemsRequest, AddPlaylistRequest, BrowserEntries, BrowserRoots, ItemTransfer,
    PlayerResponse, PlayerState, PlaylistInfo, PlaylistItemsResponse, PlaylistItemsResult,
    PlaylistRef, PlaylistsResponse, QueryOptions, QueryResult, SetPlayerRequest,
    SortItemsRequest, TransferItemsBody,
};
use crate::range::Range;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8880/";

const API_PREFIX: &str = "api";

// ---------------------------------------------------------------------------
// PlayerClient
// ---------------------------------------------------------------------------

/// HTTP client bound to one player instance.
#[derive(Debug, Clone)]
pub struct PlayerClient {
    http: reqwest::Client,
    base_url: Url,
}

impl PlayerClient {
    /// Create a client for the player at `base_url` (e.g.
    /// `http://127.0.0.1:8880/`).
    pub fn new(base_url: &str) -> ApiResult<Self> {
        Self::with_http(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`.
    pub fn with_http(http: reqwest::Client, base_url: &str) -> ApiResult<Self> {
        let base_url = parse_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Build `{base}/api/{segments...}`. Segments are percent-encoded
    /// individually, so playlist ids never introduce extra path levels.
    pub fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| ApiError::InvalidUrl {
                url: self.base_url.to_string(),
                message: "base url cannot have path segments".into(),
            })?;
            path.pop_if_empty();
            path.push(API_PREFIX);
            path.extend(segments);
        }
        Ok(url)
    }

    /// Fetch a client configuration object and decode it into `T`.
    pub async fn get_client_config_as<T: DeserializeOwned>(&self, id: &str) -> ApiResult<Option<T>> {
        match PlayerApi::get_client_config(self, id).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    /// Store a client configuration object.
    pub async fn set_client_config_from<T: Serialize + Sync>(&self, id: &str, value: &T) -> ApiResult<()> {
        let value = serde_json::to_value(value)?;
        PlayerApi::set_client_config(self, id, &value).await
    }

    // -- request helpers --

    fn request(&self, method: Method, segments: &[&str]) -> ApiResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        debug!(%method, %url, "player api request");
        Ok(self.http.request(method, url))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let mut request = self.request(Method::GET, segments)?;
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = check_status(request.send().await?).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn post_empty(&self, segments: &[&str], query: &[(&str, String)]) -> ApiResult<()> {
        let mut request = self.request(Method::POST, segments)?;
        if !query.is_empty() {
            request = request.query(query);
        }
        check_status(request.send().await?).await?;
        Ok(())
    }

    async fn post_json<B: Serialize + ?Sized>(&self, segments: &[&str], body: &B) -> ApiResult<()> {
        let request = self.request(Method::POST, segments)?.json(body);
        check_status(request.send().await?).await?;
        Ok(())
    }

    async fn get_bytes(&self, segments: &[&str]) -> ApiResult<Option<Vec<u8>>> {
        let response = self.request(Method::GET, segments)?.send().await?;
        match check_status(response).await {
            Ok(response) => Ok(Some(response.bytes().await?.to_vec())),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn transfer_items(
        &self,
        verb: &str,
        transfer: &ItemTransfer,
        items: &[u32],
        target_index: Option<u32>,
    ) -> ApiResult<()> {
        match transfer {
            ItemTransfer::Within(playlist) => {
                let plref = playlist.to_string();
                let body = TransferItemsBody {
                    from: None,
                    to: None,
                    items,
                    target_index,
                };
                self.post_json(&["playlists", &plref, "items", verb], &body)
                    .await
            }
            ItemTransfer::Between { from, to } => {
                let body = TransferItemsBody {
                    from: Some(from),
                    to: Some(to),
                    items,
                    target_index,
                };
                self.post_json(&["playlists", "items", verb], &body).await
            }
        }
    }
}

/// Turn a non-2xx response into `ApiError::Http`, parsing the body.
async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let status_text = status.canonical_reason().unwrap_or_default().to_string();
    let text = response.text().await.unwrap_or_default();
    Err(ApiError::Http {
        status: status.as_u16(),
        status_text,
        body: ErrorBody::parse(&text),
    })
}

fn parse_base_url(base_url: &str) -> ApiResult<Url> {
    let mut url = Url::parse(base_url).map_err(|e| ApiError::InvalidUrl {
        url: base_url.to_string(),
        message: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ApiError::InvalidUrl {
            url: base_url.to_string(),
            message: format!("unsupported scheme `{}`", url.scheme()),
        });
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn columns_query(columns: &[String]) -> Vec<(&'static str, String)> {
    if columns.is_empty() {
        Vec::new()
    } else {
        vec![("columns", columns.join(","))]
    }
}

fn by_query(by: Option<&str>) -> Vec<(&'static str, String)> {
    by.map(|by| vec![("by", by.to_string())]).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// PlayerApi implementation
// ---------------------------------------------------------------------------

#[async_trait]
impl PlayerApi for PlayerClient {
    async fn get_player(&self, columns: &[String]) -> ApiResult<PlayerState> {
        let response: PlayerResponse = self.get_json(&["player"], &columns_query(columns)).await?;
        Ok(response.player)
    }

    async fn set_player(&self, request: &SetPlayerRequest) -> ApiResult<()> {
        self.post_json(&["player"], request).await
    }

    async fn play(&self, playlist: &PlaylistRef, index: u32) -> ApiResult<()> {
        let plref = playlist.to_string();
        let index = index.to_string();
        self.post_empty(&["player", "play", &plref, &index], &[]).await
    }

    async fn play_current(&self) -> ApiResult<()> {
        self.post_empty(&["player", "play"], &[]).await
    }

    async fn play_random(&self) -> ApiResult<()> {
        self.post_empty(&["player", "play", "random"], &[]).await
    }

    async fn stop(&self) -> ApiResult<()> {
        self.post_empty(&["player", "stop"], &[]).await
    }

    async fn pause(&self) -> ApiResult<()> {
        self.post_empty(&["player", "pause"], &[]).await
    }

    async fn toggle_pause(&self) -> ApiResult<()> {
        self.post_empty(&["player", "pause", "toggle"], &[]).await
    }

    async fn next(&self, by: Option<&str>) -> ApiResult<()> {
        self.post_empty(&["player", "next"], &by_query(by)).await
    }

    async fn previous(&self, by: Option<&str>) -> ApiResult<()> {
        self.post_empty(&["player", "previous"], &by_query(by)).await
    }

    async fn get_playlists(&self) -> ApiResult<Vec<PlaylistInfo>> {
        let response: PlaylistsResponse = self.get_json(&["playlists"], &[]).await?;
        Ok(response.playlists)
    }

    async fn set_current_playlist(&self, playlist: &PlaylistRef) -> ApiResult<()> {
        self.post_json(&["playlists"], &serde_json::json!({ "current": playlist }))
            .await
    }

    async fn add_playlist(&self, request: &AddPlaylistRequest) -> ApiResult<()> {
        self.post_json(&["playlists", "add"], request).await
    }

    async fn remove_playlist(&self, playlist: &PlaylistRef) -> ApiResult<()> {
        let plref = playlist.to_string();
        self.post_empty(&["playlists", "remove", &plref], &[]).await
    }

    async fn move_playlist(&self, playlist: &PlaylistRef, index: u32) -> ApiResult<()> {
        let plref = playlist.to_string();
        let index = index.to_string();
        self.post_empty(&["playlists", "move", &plref, &index], &[])
            .await
    }

    async fn clear_playlist(&self, playlist: &PlaylistRef) -> ApiResult<()> {
        let plref = playlist.to_string();
        self.post_empty(&["playlists", &plref, "clear"], &[]).await
    }

    async fn rename_playlist(&self, playlist: &PlaylistRef, title: &str) -> ApiResult<()> {
        let plref = playlist.to_string();
        self.post_json(&["playlists", &plref], &serde_json::json!({ "title": title }))
            .await
    }

    async fn get_playlist_items(
        &self,
        playlist: &PlaylistRef,
        range: Range,
        columns: &[String],
    ) -> ApiResult<PlaylistItemsResult> {
        let plref = playlist.to_string();
        let range = range.to_string();
        let response: PlaylistItemsResponse = self
            .get_json(&["playlists", &plref, "items", &range], &columns_query(columns))
            .await?;
        Ok(response.playlist_items)
    }

    async fn add_playlist_items(
        &self,
        playlist: &PlaylistRef,
        request: &AddItemsRequest,
    ) -> ApiResult<()> {
        let plref = playlist.to_string();
        self.post_json(&["playlists", &plref, "items", "add"], request)
            .await
    }

    async fn sort_playlist_items(
        &self,
        playlist: &PlaylistRef,
        request: &SortItemsRequest,
    ) -> ApiResult<()> {
        let plref = playlist.to_string();
        self.post_json(&["playlists", &plref, "items", "sort"], request)
            .await
    }

    async fn remove_playlist_items(&self, playlist: &PlaylistRef, items: &[u32]) -> ApiResult<()> {
        let plref = playlist.to_string();
        self.post_json(
            &["playlists", &plref, "items", "remove"],
            &serde_json::json!({ "items": items }),
        )
        .await
    }

    async fn copy_playlist_items(
        &self,
        transfer: &ItemTransfer,
        items: &[u32],
        target_index: Option<u32>,
    ) -> ApiResult<()> {
        self.transfer_items("copy", transfer, items, target_index)
            .await
    }

    async fn move_playlist_items(
        &self,
        transfer: &ItemTransfer,
        items: &[u32],
        target_index: Option<u32>,
    ) -> ApiResult<()> {
        self.transfer_items("move", transfer, items, target_index)
            .await
    }

    async fn get_roots(&self) -> ApiResult<BrowserRoots> {
        self.get_json(&["browser", "roots"], &[]).await
    }

    async fn get_entries(&self, path: &str) -> ApiResult<BrowserEntries> {
        self.get_json(&["browser", "entries"], &[("path", path.to_string())])
            .await
    }

    async fn query(&self, options: &QueryOptions) -> ApiResult<QueryResult> {
        self.get_json(&["query"], &options.to_query_pairs()).await
    }

    async fn get_current_artwork(&self) -> ApiResult<Option<Vec<u8>>> {
        self.get_bytes(&["artwork", "current"]).await
    }

    async fn get_artwork(
        &self,
        playlist: &PlaylistRef,
        index: u32,
    ) -> ApiResult<Option<Vec<u8>>> {
        let plref = playlist.to_string();
        let index = index.to_string();
        self.get_bytes(&["artwork", &plref, &index]).await
    }

    async fn get_client_config(&self, id: &str) -> ApiResult<Option<Value>> {
        let response = self.request(Method::GET, &["clientconfig", id])?.send().await?;
        let response = match check_status(response).await {
            Ok(response) => response,
            Err(err) if err.is_not_found() => return Ok(None),
            Err(err) => return Err(err),
        };
        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(None);
        }
        match serde_json::from_str::<Value>(&text)? {
            Value::Null => Ok(None),
            value => Ok(Some(value)),
        }
    }

    async fn set_client_config(&self, id: &str, value: &Value) -> ApiResult<()> {
        self.post_json(&["clientconfig", id], value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_trailing_slash() {
        let client = PlayerClient::new("http://localhost:8880").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8880/");

        let client = PlayerClient::new("http://localhost:8880/player").unwrap();
        assert_eq!(client.base_url().as_str(), "http://localhost:8880/player/");
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = PlayerClient::new("ftp://localhost/").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }

    #[test]
    fn rejects_unparseable_url() {
        assert!(PlayerClient::new("not a url").is_err());
    }

    #[test]
    fn endpoint_joins_segments_under_api() {
        let client = PlayerClient::new("http://localhost:8880/").unwrap();
        let url = client.endpoint(&["player", "pause", "toggle"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8880/api/player/pause/toggle");
    }

    #[test]
    fn endpoint_keeps_base_path_prefix() {
        let client = PlayerClient::new("http://host/deadbeef/").unwrap();
        let url = client.endpoint(&["playlists"]).unwrap();
        assert_eq!(url.as_str(), "http://host/deadbeef/api/playlists");
    }

    #[test]
    fn endpoint_range_segment() {
        let client = PlayerClient::new("http://host/").unwrap();
        let range = Range::new(10, 20).to_string();
        let url = client.endpoint(&["playlists", "p1", "items", &range]).unwrap();
        assert_eq!(url.as_str(), "http://host/api/playlists/p1/items/10:20");
    }

    #[test]
    fn endpoint_escapes_slashes_in_ids() {
        let client = PlayerClient::new("http://host/").unwrap();
        let url = client.endpoint(&["clientconfig", "a/b"]).unwrap();
        assert_eq!(url.as_str(), "http://host/api/clientconfig/a%2Fb");
    }

    #[test]
    fn columns_query_is_comma_joined() {
        assert!(columns_query(&[]).is_empty());
        assert_eq!(
            columns_query(&["%artist%".into(), "%title%".into()]),
            vec![("columns", "%artist%,%title%".to_string())]
        );
    }
}
