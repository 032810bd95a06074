//! Console view model

pub mod console_panel;
