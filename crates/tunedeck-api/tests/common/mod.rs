// In-process fake player used by the integration tests.
//
// Every plain HTTP request is recorded and answered from a table of canned
// responses (default: 200 with `{}`); the two SSE endpoints stream whatever
// the test pushes through `send_update` / `send_events`.

#![allow(dead_code)]

use std::collections::HashMap;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode, Uri};
use axum::response::sse::{Event, Sse};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use futures_util::Stream;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// Decoded query-string pairs.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        let Some(query) = &self.query else {
            return Vec::new();
        };
        let url = reqwest::Url::parse(&format!("http://fake/?{query}")).unwrap();
        url.query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

#[derive(Debug, Clone)]
struct CannedResponse {
    status: StatusCode,
    content_type: &'static str,
    body: Vec<u8>,
    /// Number of initial requests answered with 503 before this response.
    fail_first: usize,
}

#[derive(Default)]
struct FakeState {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<HashMap<(String, String), CannedResponse>>,
    hits: Mutex<HashMap<(String, String), usize>>,
    client_config: Mutex<HashMap<String, String>>,
    update_connections: AtomicUsize,
    event_connections: AtomicUsize,
    updates_tx: Option<broadcast::Sender<String>>,
    events_tx: Option<broadcast::Sender<String>>,
}

pub struct FakePlayer {
    pub addr: SocketAddr,
    state: Arc<FakeState>,
}

impl FakePlayer {
    pub async fn start() -> FakePlayer {
        let (updates_tx, _) = broadcast::channel(64);
        let (events_tx, _) = broadcast::channel(64);
        let state = Arc::new(FakeState {
            updates_tx: Some(updates_tx),
            events_tx: Some(events_tx),
            ..FakeState::default()
        });

        let router = Router::new()
            .route("/api/query/updates", get(sse_updates))
            .route("/api/query/events", get(sse_events))
            .fallback(record_and_respond)
            .with_state(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        FakePlayer { addr, state }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn respond_json(&self, method: &str, path: &str, status: u16, body: &str) {
        self.respond(method, path, status, "application/json", body.as_bytes().to_vec(), 0);
    }

    pub fn respond_bytes(&self, method: &str, path: &str, content_type: &'static str, body: &[u8]) {
        self.respond(method, path, 200, content_type, body.to_vec(), 0);
    }

    /// Answer the first `count` requests with 503, then `body`.
    pub fn fail_first(&self, method: &str, path: &str, count: usize, body: &str) {
        self.respond(method, path, 200, "application/json", body.as_bytes().to_vec(), count);
    }

    fn respond(
        &self,
        method: &str,
        path: &str,
        status: u16,
        content_type: &'static str,
        body: Vec<u8>,
        fail_first: usize,
    ) {
        self.state.responses.lock().unwrap().insert(
            (method.to_string(), path.to_string()),
            CannedResponse {
                status: StatusCode::from_u16(status).unwrap(),
                content_type,
                body,
                fail_first,
            },
        );
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests().last().cloned().expect("no request recorded")
    }

    pub fn send_update(&self, json: &str) {
        if let Some(tx) = &self.state.updates_tx {
            let _ = tx.send(json.to_string());
        }
    }

    pub fn send_events(&self, json: &str) {
        if let Some(tx) = &self.state.events_tx {
            let _ = tx.send(json.to_string());
        }
    }

    pub fn update_connections(&self) -> usize {
        self.state.update_connections.load(Ordering::SeqCst)
    }

    pub fn event_connections(&self) -> usize {
        self.state.event_connections.load(Ordering::SeqCst)
    }
}

async fn record_and_respond(
    State(state): State<Arc<FakeState>>,
    method: Method,
    uri: Uri,
    body: Bytes,
) -> Response {
    let method = method.as_str().to_string();
    let path = uri.path().to_string();
    let body = String::from_utf8_lossy(&body).into_owned();
    state.requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        query: uri.query().map(str::to_string),
        body: body.clone(),
    });

    if let Some(id) = path.strip_prefix("/api/clientconfig/") {
        let mut store = state.client_config.lock().unwrap();
        return if method == "POST" {
            store.insert(id.to_string(), body);
            StatusCode::NO_CONTENT.into_response()
        } else {
            match store.get(id) {
                Some(stored) => json_response(StatusCode::OK, stored.clone()),
                None => json_response(
                    StatusCode::NOT_FOUND,
                    r#"{"error":{"message":"not found","type":"notFound"}}"#.to_string(),
                ),
            }
        };
    }

    let key = (method, path);
    let hit = {
        let mut hits = state.hits.lock().unwrap();
        let counter = hits.entry(key.clone()).or_insert(0);
        *counter += 1;
        *counter
    };

    let canned = state.responses.lock().unwrap().get(&key).cloned();
    match canned {
        Some(canned) if hit <= canned.fail_first => {
            json_response(StatusCode::SERVICE_UNAVAILABLE, "{}".to_string())
        }
        Some(canned) => (
            canned.status,
            [(axum::http::header::CONTENT_TYPE, canned.content_type)],
            canned.body,
        )
            .into_response(),
        None => json_response(StatusCode::OK, "{}".to_string()),
    }
}

fn json_response(status: StatusCode, body: String) -> Response {
    (
        status,
        [(axum::http::header::CONTENT_TYPE, "application/json")],
        body,
    )
        .into_response()
}

async fn sse_updates(
    State(state): State<Arc<FakeState>>,
    uri: Uri,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    record_sse(&state, &uri);
    state.update_connections.fetch_add(1, Ordering::SeqCst);
    let rx = state.updates_tx.as_ref().unwrap().subscribe();
    Sse::new(broadcast_stream(rx))
}

async fn sse_events(
    State(state): State<Arc<FakeState>>,
    uri: Uri,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    record_sse(&state, &uri);
    state.event_connections.fetch_add(1, Ordering::SeqCst);
    let rx = state.events_tx.as_ref().unwrap().subscribe();
    Sse::new(broadcast_stream(rx))
}

fn record_sse(state: &FakeState, uri: &Uri) {
    state.requests.lock().unwrap().push(RecordedRequest {
        method: "GET".into(),
        path: uri.path().to_string(),
        query: uri.query().map(str::to_string),
        body: String::new(),
    });
}

fn broadcast_stream(
    rx: broadcast::Receiver<String>,
) -> impl Stream<Item = Result<Event, Infallible>> {
    futures_util::stream::unfold(rx, |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(data) => return Some((Ok(Event::default().data(data)), rx)),
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
}
