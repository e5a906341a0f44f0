//! Messages exchanged with the motion simulator
//!
//! Payloads are plain serde types so they can cross a JSON worker boundary
//! as well as an in-process channel.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifies one simulator instance; bumped every time a simulator is spawned
pub type Generation = u64;

/// Simulator-side state of one target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimTarget {
    /// Top-left corner
    pub pos: Vec2,
    /// Pixels per second
    pub vel: Vec2,
    pub size: Vec2,
}

/// Playfield extent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub w: f32,
    pub h: f32,
}

/// Authoritative initial state, sent exactly once per instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimInit {
    pub targets: Vec<SimTarget>,
    pub bounds: Bounds,
    pub movement_threshold: f32,
    pub use_interpolation: bool,
}

/// Controller -> simulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SimCommand {
    Init(SimInit),
    /// Advance to `time` (ms, frame clock)
    Animate { time: f64 },
    Pause { paused: bool },
}

/// Simulator -> controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SimReport {
    /// Positions for every target, index-aligned with the init payload
    Update { positions: Vec<Vec2> },
}

/// A report tagged with the instance that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub generation: Generation,
    pub report: SimReport,
}

/// A simulator report the controller cannot apply
#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("expected {expected} positions, got {got}")]
    LengthMismatch { expected: usize, got: usize },
    #[error("non-finite position at index {index}")]
    NonFinite { index: usize },
}

/// Check an update against the roster it will be applied to
pub fn validate_positions(positions: &[Vec2], expected: usize) -> Result<(), PayloadError> {
    if positions.len() != expected {
        return Err(PayloadError::LengthMismatch {
            expected,
            got: positions.len(),
        });
    }
    match positions.iter().position(|p| !p.is_finite()) {
        Some(index) => Err(PayloadError::NonFinite { index }),
        None => Ok(()),
    }
}
