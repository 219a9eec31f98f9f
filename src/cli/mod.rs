//! Command handlers and terminal rendering

pub mod compare;
pub mod list;
pub mod setup;
pub mod ui;
