//! Command implementations and terminal rendering

pub mod dividends;
pub mod rank;
pub mod setup;
pub mod ui;
pub mod yearly;
