//! Hand skeleton data structures.
//!
//! Models the 21 joints per hand produced by MediaPipe-style hand landmark
//! detectors, plus closed enumerations for fingers and handedness so that
//! nothing downstream has to parse joint names at runtime.

use serde::{Deserialize, Serialize};

// ── Points ─────────────────────────────────────────────────

/// A 3D joint position in model space.
///
/// Image convention: +x right, +y down, +z away from the camera.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Point3 {
    pub const ZERO: Point3 = Point3::new(0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn sub(self, other: Point3) -> Point3 {
        Point3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }

    pub fn add(self, other: Point3) -> Point3 {
        Point3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }

    pub fn scale(self, s: f32) -> Point3 {
        Point3::new(self.x * s, self.y * s, self.z * s)
    }

    pub fn dot(self, other: Point3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Point3) -> Point3 {
        Point3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit vector in the same direction, or `None` for a (near) zero vector.
    pub fn normalized(self) -> Option<Point3> {
        let len = self.length();
        if len <= f32::EPSILON || !len.is_finite() {
            return None;
        }
        Some(self.scale(1.0 / len))
    }

    /// Angle in radians between two vectors, or `None` if either is degenerate.
    pub fn angle_to(self, other: Point3) -> Option<f32> {
        let a = self.normalized()?;
        let b = other.normalized()?;
        Some(a.dot(b).clamp(-1.0, 1.0).acos())
    }
}

/// A 2D keypoint in image pixels, used only for drawing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ── Joint definitions ──────────────────────────────────────

/// The 21 hand joints, in detector output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandJoint {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of joints per hand.
pub const JOINT_COUNT: usize = 21;

impl HandJoint {
    pub const ALL: [HandJoint; JOINT_COUNT] = [
        Self::Wrist,
        Self::ThumbCmc,
        Self::ThumbMcp,
        Self::ThumbIp,
        Self::ThumbTip,
        Self::IndexMcp,
        Self::IndexPip,
        Self::IndexDip,
        Self::IndexTip,
        Self::MiddleMcp,
        Self::MiddlePip,
        Self::MiddleDip,
        Self::MiddleTip,
        Self::RingMcp,
        Self::RingPip,
        Self::RingDip,
        Self::RingTip,
        Self::PinkyMcp,
        Self::PinkyPip,
        Self::PinkyDip,
        Self::PinkyTip,
    ];

    /// Convert joint enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Option<HandJoint> {
        Self::ALL.get(index).copied()
    }

    /// Finger this joint belongs to; the wrist belongs to none.
    pub fn finger(&self) -> Option<Finger> {
        match self.index() {
            0 => None,
            i => Finger::ALL.get((i - 1) / 4).copied(),
        }
    }
}

// ── Fingers ────────────────────────────────────────────────

/// The five fingers, indexable as a fixed array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

/// Number of fingers per hand.
pub const FINGER_COUNT: usize = 5;

impl Finger {
    pub const ALL: [Finger; FINGER_COUNT] = [
        Self::Thumb,
        Self::Index,
        Self::Middle,
        Self::Ring,
        Self::Pinky,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Thumb => "thumb",
            Self::Index => "index",
            Self::Middle => "middle",
            Self::Ring => "ring",
            Self::Pinky => "pinky",
        }
    }

    /// Joint chain from the wrist through the finger's base to its tip.
    pub fn chain(&self) -> [HandJoint; 5] {
        let first = 1 + self.index() * 4;
        [
            HandJoint::Wrist,
            HandJoint::ALL[first],
            HandJoint::ALL[first + 1],
            HandJoint::ALL[first + 2],
            HandJoint::ALL[first + 3],
        ]
    }
}

// ── Handedness ─────────────────────────────────────────────

/// Which hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    pub const ALL: [Handedness; 2] = [Self::Left, Self::Right];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Parse a detector label ("Left", "right", ...).
    pub fn parse(s: &str) -> Option<Handedness> {
        if s.eq_ignore_ascii_case("left") {
            Some(Self::Left)
        } else if s.eq_ignore_ascii_case("right") {
            Some(Self::Right)
        } else {
            None
        }
    }
}

// ── Observation ────────────────────────────────────────────

/// One detected hand in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct HandObservation {
    pub handedness: Handedness,
    /// 3D joints indexed by `HandJoint`; may be short or empty.
    pub joints: Vec<Point3>,
    /// Image-space keypoints for drawing; may be empty.
    pub keypoints: Vec<Point2>,
    /// Detector confidence, when the source reports one.
    pub score: Option<f32>,
}

impl HandObservation {
    pub fn new(handedness: Handedness, joints: Vec<Point3>) -> Self {
        Self {
            handedness,
            joints,
            keypoints: Vec::new(),
            score: None,
        }
    }

    /// Mirror the observation left-to-right.
    ///
    /// Keypoints are reflected across the frame width; 3D joints have
    /// their x axis negated.
    pub fn flip_horizontal(&mut self, frame_width: f32) {
        for kp in &mut self.keypoints {
            kp.x = frame_width - kp.x;
        }
        for joint in &mut self.joints {
            joint.x = -joint.x;
        }
    }
}

// ── Tests ──────────────────────────────────────────────────
