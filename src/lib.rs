//! # ccentral-tui
//!
//! A terminal dashboard and library for browsing and editing the
//! configuration of services registered with ccentral.
//!
//! For the selected service the dashboard shows the merged configuration
//! (schema defaults plus live values), lets the operator edit and save
//! fields, and lists connected instances with health tags and per-minute
//! counter totals. The service is re-fetched on a fixed interval without
//! losing unsaved edits.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│ refresh  │───▶│  data   │───▶│   ui    │ │
//! │  │ (state) │    │(requests)│    │ (views) │    │(render) │ │
//! │  └─────────┘    └────┬─────┘    └─────────┘    └─────────┘ │
//! │                      │                                      │
//! │                      ▼                                      │
//! │                 ┌─────────┐                                 │
//! │                 │ source  │◀── HttpBackend | FileBackend    │
//! │                 └─────────┘                                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`Backend`] trait over the ccentral REST API, with an
//!   HTTP implementation and an offline file/mock implementation
//! - **[`data`]**: Field merging, instance annotation, counter totals and
//!   value formatting, tied together by [`ViewState`]
//! - **[`refresh`]**: The [`Orchestrator`], which runs requests in the
//!   background and applies their results
//! - **[`app`]**, **[`events`]**, **[`ui`]**: Terminal application state,
//!   input handling and ratatui rendering
//! - **[`config`]**, **[`logging`]**: Layered settings and tracing setup
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Dashboard against a local daemon
//! ccentral-tui --url http://127.0.0.1:3000
//!
//! # Offline, against a captured services file
//! ccentral-tui --file services.json
//!
//! # Export one service's view state and exit
//! ccentral-tui --service billing --export billing.json
//! ```
//!
//! ### As a library
//!
//! ```
//! use ccentral_tui::{Backend, FileBackend, ViewState};
//!
//! # tokio_test::block_on(async {
//! let backend = FileBackend::mock();
//! let descriptor = backend.fetch_service("example").await.unwrap();
//!
//! let mut view = ViewState::for_service("example");
//! view.apply(descriptor, ccentral_tui::data::unix_now());
//!
//! let field = view.service_data.as_ref().unwrap().get("example").unwrap();
//! assert_eq!(field.value.as_deref(), Some("Current value"));
//! # });
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod logging;
pub mod refresh;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use app::App;
pub use config::Settings;
pub use data::{FieldDefinition, FieldValue, InstanceTag, ServiceData, TagKind, ViewState};
pub use refresh::{Orchestrator, OrchestratorState};
pub use source::{ApiError, Backend, FileBackend, HttpBackend, ServiceDescriptor};
