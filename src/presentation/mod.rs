//! Presentation layer: command-line parsing and terminal rendering

pub mod cli;
pub mod ui;
