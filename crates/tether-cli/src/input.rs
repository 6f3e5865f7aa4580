//! Tether snapshot input files.
//!
//! Accepts either a bare array of tethers (one instant) or an array of
//! `{"frame": n, "tethers": [...]}` objects.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use tether_core::{Frame, Tether};

/// Variants are tried in order, so `[]` is an empty snapshot rather than an
/// empty frame sequence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Input {
    Snapshot(Vec<Tether>),
    Frames(Vec<Frame>),
}

impl Input {
    /// Normalize to frames; a single snapshot becomes frame 0.
    pub fn into_frames(self) -> Vec<Frame> {
        match self {
            Input::Frames(frames) => frames,
            Input::Snapshot(tethers) => vec![Frame::new(0, tethers)],
        }
    }
}

pub fn parse_input(text: &str) -> Result<Input> {
    serde_json::from_str(text).context("input is neither a tether array nor a frame array")
}

pub fn load_input(path: &Path) -> Result<Input> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    parse_input(&text).with_context(|| format!("failed to parse {}", path.display()))
}
