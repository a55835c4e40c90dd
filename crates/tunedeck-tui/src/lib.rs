// Library root: exposes the orchestrator, view-models and terminal UI so the
// binary and tests share one crate.

pub mod app;
pub mod config;
pub mod models;
pub mod protocol;
pub mod settings;
pub mod tui;
