//! # Polarplot UI
//!
//! View models that sit between the session log and whatever draws it.

pub mod ui;

pub use ui::console_panel::{
    format_timestamp, truncate_response, ConsolePanel, ConsolePanelConfig, ScrollAction,
    ScrollFollow,
};
