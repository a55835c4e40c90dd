// Application state and orchestration logic.
//
// The central event loop that applies subscription updates from the player
// to the view-models, dispatches user commands to the player API, and pushes
// snapshots to the TUI render loop.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};
use tunedeck_api::model::{
    AddItemsRequest, AddPlaylistRequest, ItemTransfer, PlaylistRef, QueryEvents, QueryOptions,
    QueryResult, SetPlayerRequest, SortItemsRequest,
};
use tunedeck_api::{ApiError, ApiResult, DataSource, PlayerApi, SourceEvent};

use crate::config::{Config, EventsMode};
use crate::models::player::TRACK_COLUMNS;
use crate::models::{BrowserModel, PlayerModel, PlaylistModel, SettingsModel};
use crate::protocol::{AppSnapshot, ConnectionStatus, TabId, UiUpdate, UserCommand};
use crate::settings::SettingsStore;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// How often the displayed playback position is advanced between server
/// updates.
pub const PLAYBACK_TICK: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub api: Arc<dyn PlayerApi>,
    pub events_mode: EventsMode,
    pub page_size: u32,
    pub player: PlayerModel,
    pub playlist: PlaylistModel,
    pub browser: BrowserModel,
    pub settings: SettingsModel,
    pub settings_store: SettingsStore,
    pub connection_status: ConnectionStatus,
}

impl AppState {
    pub fn new(config: &Config, api: Arc<dyn PlayerApi>, settings_store: SettingsStore) -> Self {
        let settings = SettingsModel::new(settings_store.load());
        AppState {
            api,
            events_mode: config.events.mode,
            page_size: config.playlist.page_size,
            player: PlayerModel::default(),
            playlist: PlaylistModel::default(),
            browser: BrowserModel::default(),
            settings,
            settings_store,
            connection_status: ConnectionStatus::Connecting,
        }
    }

    pub fn snapshot(&self) -> AppSnapshot {
        AppSnapshot {
            player: self.player.clone(),
            playlist: self.playlist.clone(),
            browser: self.browser.clone(),
            settings: self.settings.clone(),
        }
    }

    /// What the subscription should cover given the current playlist, the
    /// cursor's item window, and the column settings.
    pub fn subscription_options(&self) -> QueryOptions {
        let settings = self.settings.values();
        let mut track_columns: Vec<String> = TRACK_COLUMNS.iter().map(|c| c.to_string()).collect();
        track_columns.push(settings.window_title.clone());

        let playlist_ref = self.playlist.current_ref();
        QueryOptions {
            player: true,
            track_columns,
            playlists: true,
            playlist_items: playlist_ref.is_some(),
            playlist_ref,
            playlist_range: Some(self.playlist.window(self.page_size)),
            playlist_columns: settings.playlist_columns.clone(),
        }
    }

    /// Apply a (possibly partial) snapshot. Returns whether anything visible
    /// changed.
    pub fn apply_query_result(&mut self, result: QueryResult, now: Instant) -> bool {
        let mut changed = false;

        let before = self.playlist.current_id().map(str::to_string);
        if let Some(playlists) = result.playlists {
            changed |= self.playlist.apply_playlists(playlists);
        }
        let switched = before.as_deref() != self.playlist.current_id();

        if let Some(items) = result.playlist_items {
            if switched {
                // These belong to the playlist we subscribed for, not the new one.
                debug!("dropping items of previous playlist {:?}", before);
            } else {
                changed |= self.playlist.apply_items(items);
            }
        }

        if let Some(player) = result.player {
            let previous = &self.player.state().active_item;
            let previous_active = (previous.playlist_id.clone(), previous.index);

            changed |= self.player.apply(player, now);

            let active = &self.player.state().active_item;
            let moved = (active.playlist_id.as_str(), active.index)
                != (previous_active.0.as_str(), previous_active.1);
            if moved && self.settings.values().cursor_follows_playback {
                changed |= self.playlist.follow(active);
            }
        }

        changed
    }

    /// Apply a pushed update. `subscribed` is the playlist the subscription
    /// that produced it was opened for; items for any other playlist are
    /// stale and dropped.
    pub fn apply_subscription_update(
        &mut self,
        subscribed: Option<&PlaylistRef>,
        mut result: QueryResult,
        now: Instant,
    ) -> bool {
        if result.playlist_items.is_some() {
            let current = self.playlist.current_ref();
            if subscribed.is_none() || subscribed != current.as_ref() {
                debug!(
                    "dropping items for {:?}, current playlist is {:?}",
                    subscribed, current
                );
                result.playlist_items = None;
            }
        }
        self.apply_query_result(result, now)
    }

    /// Refetch the slices flagged in `events` (events subscription mode).
    pub async fn refresh(&mut self, events: QueryEvents) -> ApiResult<bool> {
        let mut options = self.subscription_options();
        options.player &= events.player;
        options.playlists &= events.playlists;
        options.playlist_items &= events.playlist_items;
        if options.is_empty() {
            return Ok(false);
        }

        let result = self.api.query(&options).await?;
        Ok(self.apply_query_result(result, Instant::now()))
    }

    pub async fn load_roots(&mut self) -> ApiResult<bool> {
        let roots = self.api.get_roots().await?;
        Ok(self.browser.apply_roots(roots))
    }

    async fn open_directory(&mut self, path: String) -> ApiResult<bool> {
        let listing = self.api.get_entries(&path).await?;
        Ok(self.browser.apply_entries(path, listing))
    }

    fn require_current(&self) -> ApiResult<PlaylistRef> {
        self.playlist
            .current_ref()
            .ok_or_else(|| ApiError::InvalidRequest("no current playlist".into()))
    }

    fn cursor_index(&self) -> ApiResult<u32> {
        if self.playlist.total_count() == 0 {
            return Err(ApiError::InvalidRequest("playlist is empty".into()));
        }
        u32::try_from(self.playlist.cursor())
            .map_err(|_| ApiError::InvalidRequest("cursor out of range".into()))
    }

    async fn add_selected(&mut self, play: bool) -> ApiResult<bool> {
        let Some(entry) = self.browser.selected() else {
            return Ok(false);
        };
        let playlist = self.require_current()?;
        let request = AddItemsRequest {
            is_async: Some(true),
            play: play.then_some(true),
            ..AddItemsRequest::new(vec![entry.path.clone()])
        };
        info!("adding {} to playlist {}", entry.path, playlist);
        self.api.add_playlist_items(&playlist, &request).await?;
        Ok(false)
    }

    async fn cycle_option(&mut self) -> ApiResult<bool> {
        let state = self.player.state();
        let request = if let Some(option) = state.options.first() {
            let Some(next) = self.player.next_option_value(&option.id) else {
                return Ok(false);
            };
            SetPlayerRequest {
                options: vec![next],
                ..SetPlayerRequest::default()
            }
        } else if !state.playback_modes.is_empty() {
            let count = state.playback_modes.len() as i32;
            SetPlayerRequest {
                playback_mode: Some((state.playback_mode + 1).rem_euclid(count)),
                ..SetPlayerRequest::default()
            }
        } else {
            return Err(ApiError::InvalidRequest("player has no options".into()));
        };
        self.api.set_player(&request).await?;
        Ok(false)
    }

    /// Persist the settings after an edit. A write failure is logged; the
    /// in-memory value still applies.
    fn save_settings(&mut self) {
        if let Err(e) = self.settings_store.save(self.settings.values()) {
            warn!("failed to save settings: {}", e);
        }
    }

    /// Run one user command against the player. Returns whether local state
    /// changed (remote changes arrive through the subscription).
    pub async fn execute(&mut self, cmd: UserCommand) -> ApiResult<bool> {
        match cmd {
            UserCommand::TogglePause => self.api.toggle_pause().await.map(|_| false),
            UserCommand::Stop => self.api.stop().await.map(|_| false),
            UserCommand::Next => self.api.next(None).await.map(|_| false),
            UserCommand::Previous => self.api.previous(None).await.map(|_| false),
            UserCommand::PlayRandom => self.api.play_random().await.map(|_| false),
            UserCommand::VolumeUp | UserCommand::VolumeDown => {
                let steps = if cmd == UserCommand::VolumeUp { 1.0 } else { -1.0 };
                let volume = self
                    .player
                    .stepped_volume(steps, self.settings.values().volume_step);
                let request = SetPlayerRequest {
                    volume: Some(volume),
                    ..SetPlayerRequest::default()
                };
                self.api.set_player(&request).await.map(|_| false)
            }
            UserCommand::ToggleMute => {
                let request = SetPlayerRequest {
                    is_muted: Some(!self.player.is_muted()),
                    ..SetPlayerRequest::default()
                };
                self.api.set_player(&request).await.map(|_| false)
            }
            UserCommand::Seek(delta) => {
                let request = SetPlayerRequest {
                    relative_position: Some(delta),
                    ..SetPlayerRequest::default()
                };
                self.api.set_player(&request).await.map(|_| false)
            }
            UserCommand::CycleOption => self.cycle_option().await,
            UserCommand::SwitchPlaylist(delta) => {
                let Some(target) = self.playlist.neighbour(delta) else {
                    return Ok(false);
                };
                let target = PlaylistRef::Id(target.id.clone());
                self.api.set_current_playlist(&target).await.map(|_| false)
            }
            UserCommand::MoveCursor { tab, delta } => Ok(match tab {
                TabId::Playlist => self.playlist.move_cursor(delta),
                TabId::Browser => self.browser.move_cursor(delta),
                TabId::Settings => self.settings.move_cursor(delta),
            }),
            UserCommand::Activate(TabId::Playlist) => {
                let playlist = self.require_current()?;
                let index = self.cursor_index()?;
                self.api.play(&playlist, index).await.map(|_| false)
            }
            UserCommand::Activate(TabId::Browser) => match self.browser.selected() {
                Some(entry) if entry.is_directory() => {
                    let path = entry.path.clone();
                    self.open_directory(path).await
                }
                Some(_) => self.add_selected(true).await,
                None => Ok(false),
            },
            UserCommand::Activate(TabId::Settings) => {
                self.settings.advance_selected();
                self.save_settings();
                Ok(true)
            }
            UserCommand::BrowseParent => match self.browser.parent() {
                Some(Some(path)) => self.open_directory(path).await,
                Some(None) => self.load_roots().await,
                None => Ok(false),
            },
            UserCommand::AddSelected => self.add_selected(false).await,
            UserCommand::RemoveSelected => {
                let playlist = self.require_current()?;
                let index = self.cursor_index()?;
                self.api
                    .remove_playlist_items(&playlist, &[index])
                    .await
                    .map(|_| false)
            }
            UserCommand::MoveSelected(delta) => {
                let playlist = self.require_current()?;
                let index = self.cursor_index()?;
                let last = self.playlist.total_count().saturating_sub(1) as i64;
                let target = (i64::from(index) + i64::from(delta)).clamp(0, last) as u32;
                if target == index {
                    return Ok(false);
                }
                self.api
                    .move_playlist_items(&ItemTransfer::Within(playlist), &[index], Some(target))
                    .await?;
                Ok(self.playlist.move_cursor(target as i32 - index as i32))
            }
            UserCommand::ClearPlaylist => {
                let playlist = self.require_current()?;
                self.api.clear_playlist(&playlist).await.map(|_| false)
            }
            UserCommand::ShufflePlaylist => {
                let playlist = self.require_current()?;
                self.api
                    .sort_playlist_items(&playlist, &SortItemsRequest::random())
                    .await
                    .map(|_| false)
            }
            UserCommand::AddPlaylist => {
                let request = AddPlaylistRequest {
                    title: Some("New playlist".into()),
                    set_current: Some(true),
                    ..AddPlaylistRequest::default()
                };
                self.api.add_playlist(&request).await.map(|_| false)
            }
            UserCommand::RemovePlaylist => {
                let playlist = self.require_current()?;
                self.api.remove_playlist(&playlist).await.map(|_| false)
            }
            UserCommand::Quit => Ok(false),
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Listens on the subscription channel, the user command channel and a
/// playback tick using `tokio::select!`. After every event the subscription
/// is re-initialized if its options changed (new current playlist, item
/// window or columns).
pub async fn run(
    mut source_rx: mpsc::Receiver<SourceEvent>,
    mut source: DataSource,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");

    source.start(state.subscription_options());
    if let Err(e) = state.load_roots().await {
        warn!("failed to load browser roots: {}", e);
    }
    send_snapshot(&state, &ui_tx).await;

    let mut playback_tick = tokio::time::interval(PLAYBACK_TICK);
    playback_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    playback_tick.tick().await;

    loop {
        tokio::select! {
            // --- Subscription events ---
            event = source_rx.recv() => {
                match event {
                    Some(event) => handle_source_event(&mut state, event, &ui_tx).await,
                    None => {
                        info!("Subscription channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- User commands ---
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => handle_user_command(&mut state, cmd, &ui_tx).await,
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }

            // --- Playback position ---
            _ = playback_tick.tick() => {
                if state.player.tick(Instant::now()) {
                    send_snapshot(&state, &ui_tx).await;
                }
            }
        }

        if source.reinitialize(state.subscription_options()) {
            debug!("subscription re-initialized");
        }
    }

    source.stop();
    info!("Application event loop exiting");
    Ok(())
}

async fn send_snapshot(state: &AppState, ui_tx: &mpsc::Sender<UiUpdate>) {
    let _ = ui_tx
        .send(UiUpdate::Snapshot(Box::new(state.snapshot())))
        .await;
}

async fn set_connection_status(
    state: &mut AppState,
    status: ConnectionStatus,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if state.connection_status == status {
        return;
    }
    state.connection_status = status.clone();
    let _ = ui_tx.send(UiUpdate::ConnectionStatus(status)).await;
}

/// Handle one event from the player subscription.
pub async fn handle_source_event(
    state: &mut AppState,
    event: SourceEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match event {
        SourceEvent::Connected => {
            info!("Connected to player");
            set_connection_status(state, ConnectionStatus::Connected, ui_tx).await;
            if state.events_mode == EventsMode::Events {
                let everything = QueryEvents {
                    player: true,
                    playlists: true,
                    playlist_items: true,
                };
                refresh_and_send(state, everything, ui_tx).await;
            }
        }
        SourceEvent::Update { playlist, result } => {
            if state.apply_subscription_update(playlist.as_ref(), *result, Instant::now()) {
                send_snapshot(state, ui_tx).await;
            }
        }
        SourceEvent::Events(events) => refresh_and_send(state, events, ui_tx).await,
        SourceEvent::Disconnected(reason) => {
            info!("Disconnected from player: {}", reason);
            set_connection_status(state, ConnectionStatus::Disconnected(reason), ui_tx).await;
        }
    }
}

async fn refresh_and_send(
    state: &mut AppState,
    events: QueryEvents,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    match state.refresh(events).await {
        Ok(true) => send_snapshot(state, ui_tx).await,
        Ok(false) => {}
        Err(e) => warn!("refresh after change notification failed: {}", e),
    }
}

/// Execute a user command. Failures are logged and shown in the status bar;
/// they never stop the event loop.
pub async fn handle_user_command(
    state: &mut AppState,
    cmd: UserCommand,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    let label = cmd.label();
    debug!("executing command: {:?}", cmd);
    match state.execute(cmd).await {
        Ok(true) => send_snapshot(state, ui_tx).await,
        Ok(false) => {}
        Err(e) => {
            warn!("{} failed: {}", label, e);
            let _ = ui_tx
                .send(UiUpdate::Status(format!("{label} failed: {e}")))
                .await;
        }
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
