//! ratatui rendering.
//!
//! The screen is four rows: header, tabs, the active view and the status
//! bar. [`services`], [`fields`] and [`instances`] each draw one view from
//! the orchestrator's current [`crate::ViewState`]; nothing here mutates
//! state. The field editor and the help screen are overlays drawn last,
//! on top of whatever view is active.

pub mod common;
pub mod editor;
pub mod fields;
pub mod instances;
pub mod services;
pub mod theme;

pub use theme::Theme;
