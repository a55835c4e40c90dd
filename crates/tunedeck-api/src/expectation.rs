// Waiting for player state to settle: event expectations and fixed-interval
// polling.

use std::future::Future;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::debug;

use crate::api::PlayerApi;
use crate::client::PlayerClient;
use crate::error::{ApiError, ApiResult};
use crate::events::{DataSource, DataSourceConfig, SourceEvent, SubscriptionKind};
use crate::model::{PlayerState, QueryEvents, QueryOptions};

type Condition = Box<dyn Fn(&QueryEvents) -> bool + Send + Sync>;

/// A pending wait for a `query/events` notification that satisfies a
/// condition.
///
/// The subscription is opened by `new`, so anything the caller does after
/// construction is observed. Typical use: create the expectation, issue a
/// command, then `wait`.
pub struct EventExpectation {
    source: DataSource,
    rx: mpsc::Receiver<SourceEvent>,
    condition: Condition,
}

impl EventExpectation {
    /// Subscribe and wait (up to `connect_timeout`) for the connection to
    /// open.
    pub async fn new<F>(
        client: &PlayerClient,
        options: QueryOptions,
        connect_timeout: Duration,
        condition: F,
    ) -> ApiResult<Self>
    where
        F: Fn(&QueryEvents) -> bool + Send + Sync + 'static,
    {
        let (tx, mut rx) = mpsc::channel(64);
        let mut source = DataSource::new(
            client.clone(),
            SubscriptionKind::Events,
            DataSourceConfig::default(),
            tx,
        );
        source.start(options);

        match tokio::time::timeout(connect_timeout, next_connected(&mut rx)).await {
            Ok(Ok(())) => Ok(EventExpectation {
                source,
                rx,
                condition: Box::new(condition),
            }),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ApiError::Timeout(connect_timeout)),
        }
    }

    /// Resolve with the first matching notification, or fail after
    /// `timeout`.
    pub async fn wait(mut self, timeout: Duration) -> ApiResult<QueryEvents> {
        let result =
            tokio::time::timeout(timeout, next_matching(&mut self.rx, &self.condition)).await;
        self.source.stop();

        match result {
            Ok(outcome) => outcome,
            Err(_) => Err(ApiError::Timeout(timeout)),
        }
    }
}

async fn next_connected(rx: &mut mpsc::Receiver<SourceEvent>) -> ApiResult<()> {
    while let Some(event) = rx.recv().await {
        if event == SourceEvent::Connected {
            return Ok(());
        }
    }
    Err(ApiError::StreamClosed(
        "subscription ended before connecting".into(),
    ))
}

async fn next_matching(
    rx: &mut mpsc::Receiver<SourceEvent>,
    condition: &Condition,
) -> ApiResult<QueryEvents> {
    while let Some(event) = rx.recv().await {
        if let SourceEvent::Events(events) = event {
            if condition(&events) {
                return Ok(events);
            }
            debug!(?events, "event did not match expectation");
        }
    }
    Err(ApiError::StreamClosed("subscription ended while waiting".into()))
}

/// Call `probe` every `interval` until it yields a value or `timeout`
/// elapses.
pub async fn poll_until<F, Fut, T>(interval: Duration, timeout: Duration, mut probe: F) -> ApiResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Option<T>>,
{
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(value) = probe().await {
            return Ok(value);
        }
        if Instant::now() >= deadline {
            return Err(ApiError::Timeout(timeout));
        }
        tokio::time::sleep(interval).await;
    }
}

/// Poll `GET api/player` until it succeeds. Any failure counts as "not
/// ready yet".
pub async fn wait_for_player_ready(
    api: &dyn PlayerApi,
    interval: Duration,
    timeout: Duration,
) -> ApiResult<PlayerState> {
    poll_until(interval, timeout, || async move {
        match api.get_player(&[]).await {
            Ok(state) => Some(state),
            Err(e) => {
                debug!("player not ready: {}", e);
                None
            }
        }
    })
    .await
}
