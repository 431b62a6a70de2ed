//! Command-line front end for the SourceBridge verification scenarios.

pub mod cli;
pub mod commands;
pub mod console;
pub mod error;
pub mod logging;
pub mod scenarios;
pub mod ui;
