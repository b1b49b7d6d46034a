//! Synthetic hands for demos and tests.
//!
//! `synthetic_hand` builds a 21-joint skeleton whose fingers bend by an
//! exact, known amount, so extracted curls can be checked against the
//! requested ones.  `SyntheticSource` cycles through a fixed pose script.

use anyhow::Result;
use tracing::debug;

use super::{EstimateOptions, LandmarkSource};
use crate::hand::geometry::MAX_FLEXION_RAD;
use crate::hand::landmarks::{
    Finger, HandObservation, Handedness, Point2, Point3, FINGER_COUNT, JOINT_COUNT,
};

/// Lateral offset of each finger's base from the wrist axis.
const BASE_OFFSETS: [f32; FINGER_COUNT] = [-0.6, -0.2, 0.0, 0.2, 0.4];

/// Base-to-tip segment lengths.
const SEGMENT_LENGTHS: [f32; 3] = [0.4, 0.3, 0.25];

/// Pixels per model unit when projecting keypoints.
const PIXELS_PER_UNIT: f32 = 120.0;

/// Build a hand whose fingers are curled by the given amounts (0..=1).
///
/// Each finger bends by the same angle at its three joints, in the plane
/// spanned by the wrist→base axis and +z.
pub fn synthetic_hand(handedness: Handedness, curls: [f32; FINGER_COUNT]) -> HandObservation {
    let mut joints = vec![Point3::ZERO; JOINT_COUNT];
    let z_axis = Point3::new(0.0, 0.0, 1.0);

    for finger in Finger::ALL {
        let chain = finger.chain();
        let base = Point3::new(BASE_OFFSETS[finger.index()], -1.0, 0.0);
        joints[chain[1].index()] = base;

        let mut heading = base.normalized().unwrap_or(Point3::new(0.0, -1.0, 0.0));
        let axis = heading
            .cross(z_axis)
            .normalized()
            .unwrap_or(Point3::new(1.0, 0.0, 0.0));
        let bend = curls[finger.index()].clamp(0.0, 1.0) * MAX_FLEXION_RAD / 3.0;

        let mut pos = base;
        for (joint, len) in chain[2..].iter().zip(SEGMENT_LENGTHS) {
            heading = rotate_perpendicular(heading, axis, bend);
            pos = pos.add(heading.scale(len));
            joints[joint.index()] = pos;
        }
    }

    let keypoints = joints
        .iter()
        .map(|p| Point2::new(320.0 + p.x * PIXELS_PER_UNIT, 400.0 + p.y * PIXELS_PER_UNIT))
        .collect();

    HandObservation {
        handedness,
        joints,
        keypoints,
        score: Some(1.0),
    }
}

/// Rotate `v` about `axis`, both unit and mutually perpendicular.
fn rotate_perpendicular(v: Point3, axis: Point3, angle: f32) -> Point3 {
    v.scale(angle.cos()).add(axis.cross(v).scale(angle.sin()))
}

// ── Source ─────────────────────────────────────────────────

/// Named poses used by the demo script.
pub const POINTER: [f32; FINGER_COUNT] = [0.3, 0.0, 1.0, 1.0, 1.0];
pub const CLICK: [f32; FINGER_COUNT] = [0.3, 0.5, 1.0, 1.0, 1.0];
pub const FIST: [f32; FINGER_COUNT] = [1.0, 1.0, 1.0, 1.0, 1.0];

/// Replays a looped script of poses, switching every `frames_per_pose` frames.
pub struct SyntheticSource {
    script: Vec<Vec<(Handedness, [f32; FINGER_COUNT])>>,
    frames_per_pose: u64,
    frame: u64,
    frame_width: f32,
}

impl SyntheticSource {
    pub fn new(frames_per_pose: u64, frame_width: f32) -> Self {
        Self {
            script: vec![
                vec![(Handedness::Right, POINTER)],
                vec![(Handedness::Right, CLICK), (Handedness::Left, POINTER)],
                vec![(Handedness::Left, FIST)],
                Vec::new(),
            ],
            frames_per_pose: frames_per_pose.max(1),
            frame: 0,
            frame_width,
        }
    }
}

impl LandmarkSource for SyntheticSource {
    fn estimate_hands(&mut self, options: &EstimateOptions) -> Result<Vec<HandObservation>> {
        let step = (self.frame / self.frames_per_pose) as usize % self.script.len();
        if self.frame % self.frames_per_pose == 0 {
            debug!(step, "synthetic pose");
        }
        self.frame += 1;

        Ok(self.script[step]
            .iter()
            .map(|&(handedness, curls)| {
                let mut hand = synthetic_hand(handedness, curls);
                if options.flip_horizontal {
                    hand.flip_horizontal(self.frame_width);
                }
                hand
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_hand_shape() {
        let hand = synthetic_hand(Handedness::Left, [0.0; 5]);
        assert_eq!(hand.joints.len(), JOINT_COUNT);
        assert_eq!(hand.keypoints.len(), JOINT_COUNT);
        assert_eq!(hand.joints[0], Point3::ZERO);
    }

    #[test]
    fn test_source_cycles_script() {
        let mut src = SyntheticSource::new(2, 640.0);
        let opts = EstimateOptions::default();
        let counts: Vec<usize> = (0..8)
            .map(|_| src.estimate_hands(&opts).unwrap().len())
            .collect();
        assert_eq!(counts, vec![1, 1, 2, 2, 1, 1, 0, 0]);
        assert_eq!(src.estimate_hands(&opts).unwrap().len(), 1);
    }

    #[test]
    fn test_source_honours_flip() {
        let mut plain = SyntheticSource::new(1, 640.0);
        let mut flipped = SyntheticSource::new(1, 640.0);
        let a = plain.estimate_hands(&EstimateOptions { flip_horizontal: false }).unwrap();
        let b = flipped.estimate_hands(&EstimateOptions { flip_horizontal: true }).unwrap();
        let (ka, kb) = (a[0].keypoints[8], b[0].keypoints[8]);
        assert!((ka.x + kb.x - 640.0).abs() < 1e-3);
        assert!((a[0].joints[8].x + b[0].joints[8].x).abs() < 1e-6);
    }
}
