//! # GENOVISTA - Terminal Sequence Workspace
//!
//! A terminal client for a remote DNA sequence service using ratatui.
//!
//! ## Architecture
//!
//! The application follows an event-driven architecture with clear separation:
//! - `model`: Sequence summaries, details and analysis reports
//! - `validate`: Client-side sequence normalization
//! - `gateway`: HTTP calls to the sequence service
//! - `cache`, `selection`, `mode`, `analysis`: State slices with staleness checks
//! - `workspace`: The single owner of all state; intents in, requests out
//! - `dispatch`: Background execution of requests on a tokio runtime
//! - `event`: Keyboard event handling
//! - `ui`: TUI rendering with ratatui
//! - `controller`: Main loop and terminal lifecycle
//! - `config`, `logging`: Settings resolution and file logging

pub mod analysis;
pub mod cache;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod event;
pub mod gateway;
pub mod logging;
pub mod mode;
pub mod model;
pub mod selection;
pub mod ui;
pub mod validate;
pub mod workspace;
