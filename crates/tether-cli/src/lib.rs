//! Tether CLI - command line front end for the tether safety checker.
//!
//! Provides the `tether-check` binary: loads tether snapshots from JSON,
//! runs the safety checks and prints a text or JSON report.

pub mod config;
pub mod input;
pub mod report;

pub use config::Config;
pub use input::{load_input, parse_input, Input};
pub use report::{render_json, render_text};
