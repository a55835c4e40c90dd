// Push subscriptions over Server-Sent Events.
//
// A `DataSource` owns at most one live SSE connection to `api/query/updates`
// or `api/query/events` and forwards decoded payloads as `SourceEvent`s over
// an mpsc channel. A connection that stays silent for longer than the idle
// timeout is closed and re-opened; a failed connection is retried after a
// fixed delay.

use std::time::Duration;

use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::client::PlayerClient;
use crate::model::{PlaylistRef, QueryEvents, QueryOptions, QueryResult};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(3);

/// SSE event name carrying JSON payloads.
const MESSAGE_EVENT: &str = "message";

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which stream to subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionKind {
    /// `api/query/updates`: partial state snapshots.
    Updates,
    /// `api/query/events`: change flags only.
    Events,
}

impl SubscriptionKind {
    fn path(self) -> &'static str {
        match self {
            SubscriptionKind::Updates => "updates",
            SubscriptionKind::Events => "events",
        }
    }
}

/// What a `DataSource` reports to its consumer.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// The SSE connection is open.
    Connected,
    /// A `query/updates` payload. `playlist` is the playlist the subscription
    /// was opened for; any `playlist_items` in `result` belong to it.
    Update {
        playlist: Option<PlaylistRef>,
        result: Box<QueryResult>,
    },
    /// A `query/events` payload.
    Events(QueryEvents),
    /// The connection failed or ended; a reconnect is scheduled.
    Disconnected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSourceConfig {
    pub idle_timeout: Duration,
    pub reconnect_delay: Duration,
}

impl Default for DataSourceConfig {
    fn default() -> Self {
        DataSourceConfig {
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
        }
    }
}

#[derive(Debug, PartialEq)]
enum ConnectionOutcome {
    /// No message within the idle timeout.
    Idle,
    /// The server closed the stream.
    Ended,
    Failed(String),
    /// Nobody is listening any more.
    ReceiverClosed,
}

// ---------------------------------------------------------------------------
// DataSource
// ---------------------------------------------------------------------------

pub struct DataSource {
    client: PlayerClient,
    kind: SubscriptionKind,
    config: DataSourceConfig,
    tx: mpsc::Sender<SourceEvent>,
    options: Option<QueryOptions>,
    task: Option<JoinHandle<()>>,
}

impl DataSource {
    pub fn new(
        client: PlayerClient,
        kind: SubscriptionKind,
        config: DataSourceConfig,
        tx: mpsc::Sender<SourceEvent>,
    ) -> Self {
        DataSource {
            client,
            kind,
            config,
            tx,
            options: None,
            task: None,
        }
    }

    /// Start (or restart) the subscription with `options`. Any previous
    /// connection is dropped first.
    pub fn start(&mut self, options: QueryOptions) {
        self.stop();
        info!(kind = ?self.kind, ?options, "starting data source");

        let client = self.client.clone();
        let kind = self.kind;
        let config = self.config;
        let tx = self.tx.clone();
        let task_options = options.clone();
        self.task = Some(tokio::spawn(async move {
            run_subscription(client, kind, task_options, config, tx).await;
        }));
        self.options = Some(options);
    }

    /// Replace the subscription only if `options` differ from the running
    /// ones. Returns whether a new connection was started.
    pub fn reinitialize(&mut self, options: QueryOptions) -> bool {
        if self.is_running() && self.options.as_ref() == Some(&options) {
            return false;
        }
        self.start(options);
        true
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(kind = ?self.kind, "data source stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }

    pub fn options(&self) -> Option<&QueryOptions> {
        self.options.as_ref()
    }
}

impl Drop for DataSource {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Connection loop
// ---------------------------------------------------------------------------

async fn run_subscription(
    client: PlayerClient,
    kind: SubscriptionKind,
    options: QueryOptions,
    config: DataSourceConfig,
    tx: mpsc::Sender<SourceEvent>,
) {
    loop {
        match run_connection(&client, kind, &options, config.idle_timeout, &tx).await {
            ConnectionOutcome::ReceiverClosed => {
                debug!("data source receiver dropped, exiting");
                return;
            }
            ConnectionOutcome::Idle => {
                info!(
                    "no message for {:?}, restarting {} subscription",
                    config.idle_timeout,
                    kind.path()
                );
            }
            ConnectionOutcome::Ended => {
                if tx
                    .send(SourceEvent::Disconnected("stream ended".into()))
                    .await
                    .is_err()
                {
                    return;
                }
                tokio::time::sleep(config.reconnect_delay).await;
            }
            ConnectionOutcome::Failed(reason) => {
                warn!("{} subscription failed: {}", kind.path(), reason);
                if tx.send(SourceEvent::Disconnected(reason)).await.is_err() {
                    return;
                }
                tokio::time::sleep(config.reconnect_delay).await;
            }
        }
    }
}

async fn run_connection(
    client: &PlayerClient,
    kind: SubscriptionKind,
    options: &QueryOptions,
    idle_timeout: Duration,
    tx: &mpsc::Sender<SourceEvent>,
) -> ConnectionOutcome {
    let url = match client.endpoint(&["query", kind.path()]) {
        Ok(url) => url,
        Err(e) => return ConnectionOutcome::Failed(e.to_string()),
    };

    let request = client.http().get(url).query(&options.to_query_pairs());
    let mut es = match request.eventsource() {
        Ok(es) => es,
        Err(e) => return ConnectionOutcome::Failed(format!("failed to create event source: {e}")),
    };
    // Reconnects are driven from here, not by the event source itself.
    es.set_retry_policy(Box::new(reqwest_eventsource::retry::Never));

    let outcome = loop {
        let next = match tokio::time::timeout(idle_timeout, es.next()).await {
            Ok(next) => next,
            Err(_) => break ConnectionOutcome::Idle,
        };

        match next {
            None | Some(Err(reqwest_eventsource::Error::StreamEnded)) => {
                break ConnectionOutcome::Ended;
            }
            Some(Ok(Event::Open)) => {
                debug!("SSE connection opened");
                if tx.send(SourceEvent::Connected).await.is_err() {
                    break ConnectionOutcome::ReceiverClosed;
                }
            }
            Some(Ok(Event::Message(msg))) => {
                if msg.event != MESSAGE_EVENT {
                    debug!(event = %msg.event, "ignoring SSE event");
                    continue;
                }
                let Some(event) = decode_message(kind, options.playlist_ref.as_ref(), &msg.data)
                else {
                    continue;
                };
                if tx.send(event).await.is_err() {
                    break ConnectionOutcome::ReceiverClosed;
                }
            }
            Some(Err(err)) => break ConnectionOutcome::Failed(describe_error(&err)),
        }
    };

    es.close();
    outcome
}

/// Decode one SSE payload. Malformed payloads are logged and dropped.
fn decode_message(
    kind: SubscriptionKind,
    playlist: Option<&PlaylistRef>,
    data: &str,
) -> Option<SourceEvent> {
    let decoded = match kind {
        SubscriptionKind::Updates => parse_update(data).map(|r| SourceEvent::Update {
            playlist: playlist.cloned(),
            result: Box::new(r),
        }),
        SubscriptionKind::Events => parse_events(data).map(SourceEvent::Events),
    };
    match decoded {
        Ok(event) => Some(event),
        Err(e) => {
            warn!("failed to parse {} payload: {}", kind.path(), e);
            None
        }
    }
}

pub(crate) fn parse_update(data: &str) -> Result<QueryResult, serde_json::Error> {
    serde_json::from_str(data)
}

pub(crate) fn parse_events(data: &str) -> Result<QueryEvents, serde_json::Error> {
    serde_json::from_str(data)
}

fn describe_error(err: &reqwest_eventsource::Error) -> String {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => {
            format!("server returned status {status}")
        }
        reqwest_eventsource::Error::InvalidContentType(content_type, _response) => {
            format!("unexpected content type {content_type:?}")
        }
        reqwest_eventsource::Error::Transport(e) => format!("network error: {e}"),
        other => format!("stream error: {other}"),
    }
}
