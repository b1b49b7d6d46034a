//! Landmark sources — where per-frame hand observations come from.
//!
//! Provides:
//! - `LandmarkSource`: the per-frame boundary the frame loop polls
//! - `json`: newline-delimited JSON frames (replay files, pipes)
//! - `detector`: an external hand-landmark detector subprocess
//! - `synthetic`: scripted poses for demos and tests

pub mod detector;
pub mod json;
pub mod synthetic;

use anyhow::Result;

use crate::hand::landmarks::HandObservation;

/// Per-call options forwarded to the landmark detector.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EstimateOptions {
    /// Mirror the image left-to-right before reporting landmarks.
    pub flip_horizontal: bool,
}

/// Supplies zero or more hand observations per frame.
///
/// An `Err` means this frame failed; callers may retry on the next frame.
pub trait LandmarkSource {
    fn estimate_hands(&mut self, options: &EstimateOptions) -> Result<Vec<HandObservation>>;

    /// True once the source will never produce another frame.
    fn is_exhausted(&self) -> bool {
        false
    }
}

impl<S: LandmarkSource + ?Sized> LandmarkSource for Box<S> {
    fn estimate_hands(&mut self, options: &EstimateOptions) -> Result<Vec<HandObservation>> {
        (**self).estimate_hands(options)
    }

    fn is_exhausted(&self) -> bool {
        (**self).is_exhausted()
    }
}
