// Client library for the player's HTTP/SSE remote-control API.

pub mod api;
pub mod client;
pub mod error;
pub mod events;
pub mod expectation;
pub mod model;
pub mod range;

pub use api::PlayerApi;
pub use client::PlayerClient;
pub use error::{ApiError, ApiResult, ErrorBody, ErrorType};
pub use events::{DataSource, DataSourceConfig, SourceEvent, SubscriptionKind};
pub use expectation::{poll_until, wait_for_player_ready, EventExpectation};
pub use range::Range;
