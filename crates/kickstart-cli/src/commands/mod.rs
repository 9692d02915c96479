//! Handlers for each run mode.

pub mod list;
pub mod run;
