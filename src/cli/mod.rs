//! CLI module - command handlers and report rendering

pub mod commands;
pub mod output;

pub use commands::RunOptions;
