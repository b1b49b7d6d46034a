//! Hand pose subsystem — skeleton types, finger geometry, and gesture matching.
//!
//! Provides:
//! - `landmarks`: joints, fingers, handedness, and per-frame observations
//! - `geometry`: per-finger curl and direction extraction
//! - `template`: declarative gesture templates and the read-only registry
//! - `estimator`: template scoring and best-match selection

pub mod estimator;
pub mod geometry;
pub mod landmarks;
pub mod template;

pub use estimator::{best_match, GestureEstimator, MatchResult, DEFAULT_THRESHOLD};
pub use geometry::{extract, FingerCurl, FingerDirection, FingerGeometry, HandGeometry};
pub use landmarks::{Finger, HandJoint, HandObservation, Handedness, Point2, Point3};
pub use template::{GestureTemplate, TemplateRegistry};
