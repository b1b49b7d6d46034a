//! Finger geometry extraction.
//!
//! Turns one hand's 3D joints into a curl scalar and a direction vector per
//! finger.  Curl is the summed bend angle along the wrist→tip chain, scaled
//! linearly so that a straight chain is 0 and three right-angle bends are 1.
//! Pure functions only; degenerate input yields fallbacks, never errors.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use super::landmarks::{Finger, HandJoint, Point3, FINGER_COUNT};

/// Cumulative bend (radians) at which a finger counts as fully curled.
pub const MAX_FLEXION_RAD: f32 = 1.5 * PI;

// ── Per-finger geometry ────────────────────────────────────

/// Curl and direction of a single finger.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FingerGeometry {
    /// Flexion in [0, 1]: 0 straight, 1 fully curled.
    pub curl: f32,
    /// Unit vector from the finger base to its tip (zero if degenerate).
    pub direction: Point3,
}

impl FingerGeometry {
    pub fn curl_level(&self) -> FingerCurl {
        FingerCurl::classify(self.curl)
    }

    pub fn direction_label(&self) -> Option<FingerDirection> {
        FingerDirection::classify(self.direction)
    }
}

/// Geometry for all five fingers of one hand, indexed by `Finger`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HandGeometry {
    pub fingers: [FingerGeometry; FINGER_COUNT],
}

impl HandGeometry {
    pub fn finger(&self, finger: Finger) -> &FingerGeometry {
        &self.fingers[finger.index()]
    }
}

/// Extract per-finger geometry from a joint sequence indexed by `HandJoint`.
///
/// Joints beyond the end of `joints` read as the origin.
pub fn extract(joints: &[Point3]) -> HandGeometry {
    let mut geometry = HandGeometry::default();
    for finger in Finger::ALL {
        let chain = finger.chain().map(|j| joint_at(joints, j));
        geometry.fingers[finger.index()] = FingerGeometry {
            curl: chain_curl(&chain),
            direction: chain_direction(&chain),
        };
    }
    geometry
}

fn joint_at(joints: &[Point3], joint: HandJoint) -> Point3 {
    joints.get(joint.index()).copied().unwrap_or_default()
}

/// Summed bend between consecutive segments, mapped to [0, 1].
fn chain_curl(chain: &[Point3]) -> f32 {
    let segments: Vec<Point3> = chain.windows(2).map(|w| w[1].sub(w[0])).collect();
    let bend: f32 = segments
        .windows(2)
        .filter_map(|pair| pair[0].angle_to(pair[1]))
        .sum();
    (bend / MAX_FLEXION_RAD).clamp(0.0, 1.0)
}

/// Base (first joint after the wrist) to tip, normalized.
fn chain_direction(chain: &[Point3]) -> Point3 {
    let base = chain[1];
    let tip = chain[chain.len() - 1];
    tip.sub(base).normalized().unwrap_or(Point3::ZERO)
}

// ── Discrete curl ──────────────────────────────────────────

/// Named curl levels used by templates and debug output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FingerCurl {
    NoCurl,
    HalfCurl,
    FullCurl,
}

impl FingerCurl {
    /// Representative curl value for this level.
    pub fn target(&self) -> f32 {
        match self {
            Self::NoCurl => 0.0,
            Self::HalfCurl => 0.5,
            Self::FullCurl => 1.0,
        }
    }

    pub fn classify(curl: f32) -> FingerCurl {
        if curl < 0.25 {
            Self::NoCurl
        } else if curl < 0.75 {
            Self::HalfCurl
        } else {
            Self::FullCurl
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoCurl => "no-curl",
            Self::HalfCurl => "half-curl",
            Self::FullCurl => "full-curl",
        }
    }
}

// ── Discrete direction ─────────────────────────────────────

/// Eight compass labels in the image plane (+y is down).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FingerDirection {
    VerticalUp,
    VerticalDown,
    HorizontalLeft,
    HorizontalRight,
    DiagonalUpRight,
    DiagonalUpLeft,
    DiagonalDownRight,
    DiagonalDownLeft,
}

impl FingerDirection {
    /// Unit vector for this label.
    pub fn vector(&self) -> Point3 {
        let d = std::f32::consts::FRAC_1_SQRT_2;
        match self {
            Self::VerticalUp => Point3::new(0.0, -1.0, 0.0),
            Self::VerticalDown => Point3::new(0.0, 1.0, 0.0),
            Self::HorizontalLeft => Point3::new(-1.0, 0.0, 0.0),
            Self::HorizontalRight => Point3::new(1.0, 0.0, 0.0),
            Self::DiagonalUpRight => Point3::new(d, -d, 0.0),
            Self::DiagonalUpLeft => Point3::new(-d, -d, 0.0),
            Self::DiagonalDownRight => Point3::new(d, d, 0.0),
            Self::DiagonalDownLeft => Point3::new(-d, d, 0.0),
        }
    }

    /// Nearest label by the x/y projection, or `None` if it has no length.
    pub fn classify(direction: Point3) -> Option<FingerDirection> {
        let planar = Point3::new(direction.x, direction.y, 0.0);
        if planar.normalized().is_none() {
            return None;
        }
        // Counter-clockwise from +x with "up" positive.
        let deg = (-direction.y).atan2(direction.x).to_degrees();
        let sector = (((deg + 360.0 + 22.5) % 360.0) / 45.0) as usize;
        Some(match sector {
            0 => Self::HorizontalRight,
            1 => Self::DiagonalUpRight,
            2 => Self::VerticalUp,
            3 => Self::DiagonalUpLeft,
            4 => Self::HorizontalLeft,
            5 => Self::DiagonalDownLeft,
            6 => Self::VerticalDown,
            _ => Self::DiagonalDownRight,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerticalUp => "vertical-up",
            Self::VerticalDown => "vertical-down",
            Self::HorizontalLeft => "horizontal-left",
            Self::HorizontalRight => "horizontal-right",
            Self::DiagonalUpRight => "diagonal-up-right",
            Self::DiagonalUpLeft => "diagonal-up-left",
            Self::DiagonalDownRight => "diagonal-down-right",
            Self::DiagonalDownLeft => "diagonal-down-left",
        }
    }
}

// ── Tests ──────────────────────────────────────────────────
