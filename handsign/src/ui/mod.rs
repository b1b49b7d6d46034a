//! UI boundary — where per-frame results are shown.
//!
//! The frame loop talks to a `GestureSink`: one result region per hand,
//! a drawing surface for keypoints, and optional per-finger debug fields.
//! `sexp::SexpSink` renders all of it as s-expression lines.

pub mod sexp;

use anyhow::Result;

use crate::hand::geometry::HandGeometry;
use crate::hand::landmarks::{Finger, HandJoint, Handedness};

/// Keypoint colors, one per finger plus the wrist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandmarkColor {
    Red,
    Blue,
    Yellow,
    Green,
    Pink,
    White,
}

impl LandmarkColor {
    pub fn for_joint(joint: Option<HandJoint>) -> LandmarkColor {
        match joint.and_then(|j| j.finger()) {
            Some(Finger::Thumb) => Self::Red,
            Some(Finger::Index) => Self::Blue,
            Some(Finger::Middle) => Self::Yellow,
            Some(Finger::Ring) => Self::Green,
            Some(Finger::Pinky) => Self::Pink,
            None => Self::White,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Green => "green",
            Self::Pink => "pink",
            Self::White => "white",
        }
    }
}

/// Radius used for keypoint dots.
pub const POINT_RADIUS: f32 = 3.0;

/// Receives the results of each frame cycle.
///
/// Each hand's region is independent: showing a gesture for one hand never
/// touches the other.
pub trait GestureSink {
    /// Clear the drawing surface and both result regions.
    fn begin_frame(&mut self) -> Result<()>;

    fn draw_point(&mut self, x: f32, y: f32, radius: f32, color: LandmarkColor) -> Result<()>;

    /// Show a gesture name in a hand's region, or clear it with `None`.
    fn show_gesture(&mut self, hand: Handedness, gesture: Option<&str>) -> Result<()>;

    /// Update the per-finger curl/direction fields for a hand.
    fn show_finger_debug(&mut self, hand: Handedness, geometry: &HandGeometry) -> Result<()>;

    fn end_frame(&mut self) -> Result<()> {
        Ok(())
    }
}
