//! Gesture templates and the read-only template registry.
//!
//! A template is a declarative record: a name plus curl and direction
//! constraints on individual fingers.  Constraints of the same kind on the
//! same finger are alternatives (the best one counts).  The registry is
//! validated once at startup and never mutated afterwards.

use std::sync::OnceLock;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

use super::geometry::{FingerCurl, FingerDirection};
use super::landmarks::{Finger, Point3};

/// Default angular tolerance for direction constraints.
pub const DEFAULT_TOLERANCE_DEG: f32 = 22.5;

fn default_weight() -> f32 {
    1.0
}

fn default_tolerance() -> f32 {
    DEFAULT_TOLERANCE_DEG
}

// ── Constraints ────────────────────────────────────────────

/// Acceptable curl for a finger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CurlTarget {
    Level(FingerCurl),
    Value(f32),
    Range { min: f32, max: f32 },
}

impl CurlTarget {
    /// Inclusive `(min, max)` bounds on the curl scale.
    pub fn bounds(&self) -> (f32, f32) {
        match *self {
            Self::Level(level) => (level.target(), level.target()),
            Self::Value(v) => (v, v),
            Self::Range { min, max } => (min, max),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurlConstraint {
    pub finger: Finger,
    pub target: CurlTarget,
    /// How strongly a mismatch lowers the score, in (0, 1].
    #[serde(default = "default_weight")]
    pub weight: f32,
}

/// Acceptable pointing direction for a finger.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DirectionTarget {
    Label(FingerDirection),
    Vector([f32; 3]),
}

impl DirectionTarget {
    /// Unit target vector, or `None` for a zero vector.
    pub fn vector(&self) -> Option<Point3> {
        match *self {
            Self::Label(label) => Some(label.vector()),
            Self::Vector([x, y, z]) => Point3::new(x, y, z).normalized(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionConstraint {
    pub finger: Finger,
    pub target: DirectionTarget,
    #[serde(default = "default_tolerance")]
    pub tolerance_deg: f32,
    #[serde(default = "default_weight")]
    pub weight: f32,
}

// ── Template ───────────────────────────────────────────────

/// A named hand pose.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GestureTemplate {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub curls: Vec<CurlConstraint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub directions: Vec<DirectionConstraint>,
}

impl GestureTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            curls: Vec::new(),
            directions: Vec::new(),
        }
    }

    pub fn with_curl(mut self, finger: Finger, target: CurlTarget, weight: f32) -> Self {
        self.curls.push(CurlConstraint {
            finger,
            target,
            weight,
        });
        self
    }

    pub fn with_direction(
        mut self,
        finger: Finger,
        target: DirectionTarget,
        tolerance_deg: f32,
        weight: f32,
    ) -> Self {
        self.directions.push(DirectionConstraint {
            finger,
            target,
            tolerance_deg,
            weight,
        });
        self
    }

    pub fn curl_constraints(&self, finger: Finger) -> impl Iterator<Item = &CurlConstraint> {
        self.curls.iter().filter(move |c| c.finger == finger)
    }

    pub fn direction_constraints(
        &self,
        finger: Finger,
    ) -> impl Iterator<Item = &DirectionConstraint> {
        self.directions.iter().filter(move |c| c.finger == finger)
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("gesture template has an empty name");
        }
        if self.curls.is_empty() && self.directions.is_empty() {
            bail!("gesture template {:?} declares no constraints", self.name);
        }
        for c in &self.curls {
            check_weight(&self.name, c.weight)?;
            let (min, max) = c.target.bounds();
            if !(0.0..=1.0).contains(&min) || !(0.0..=1.0).contains(&max) || min > max {
                bail!(
                    "gesture template {:?}: invalid curl target {:?} for {}",
                    self.name,
                    c.target,
                    c.finger.as_str()
                );
            }
        }
        for c in &self.directions {
            check_weight(&self.name, c.weight)?;
            if c.target.vector().is_none() {
                bail!(
                    "gesture template {:?}: zero direction target for {}",
                    self.name,
                    c.finger.as_str()
                );
            }
            if !(0.0..180.0).contains(&c.tolerance_deg) {
                bail!(
                    "gesture template {:?}: tolerance {} out of range [0, 180)",
                    self.name,
                    c.tolerance_deg
                );
            }
        }
        Ok(())
    }
}

fn check_weight(name: &str, weight: f32) -> Result<()> {
    if !(weight > 0.0 && weight <= 1.0) {
        bail!("gesture template {:?}: weight {} not in (0, 1]", name, weight);
    }
    Ok(())
}

// ── Built-in templates ─────────────────────────────────────

/// Index finger extended, middle/ring/pinky curled.
pub fn index_pointer() -> GestureTemplate {
    GestureTemplate::new("index_pointer")
        .with_curl(Finger::Index, CurlTarget::Level(FingerCurl::NoCurl), 1.0)
        .with_curl(Finger::Middle, CurlTarget::Level(FingerCurl::FullCurl), 1.0)
        .with_curl(Finger::Ring, CurlTarget::Level(FingerCurl::FullCurl), 1.0)
        .with_curl(Finger::Pinky, CurlTarget::Level(FingerCurl::FullCurl), 1.0)
}

/// Index finger half bent, middle/ring/pinky curled.
///
/// A closed fist misses only the index constraint and scores 0.8875, just
/// under `DEFAULT_THRESHOLD`.
pub fn index_click() -> GestureTemplate {
    GestureTemplate::new("index_click")
        .with_curl(Finger::Index, CurlTarget::Level(FingerCurl::HalfCurl), 0.9)
        .with_curl(Finger::Middle, CurlTarget::Level(FingerCurl::FullCurl), 1.0)
        .with_curl(Finger::Ring, CurlTarget::Level(FingerCurl::FullCurl), 1.0)
        .with_curl(Finger::Pinky, CurlTarget::Level(FingerCurl::FullCurl), 1.0)
}

// ── Registry ───────────────────────────────────────────────

/// Immutable, ordered set of gesture templates.
///
/// Registration order is significant: it breaks score ties.
#[derive(Debug, Clone)]
pub struct TemplateRegistry {
    templates: Vec<GestureTemplate>,
}

impl TemplateRegistry {
    /// Validate and freeze a template list.
    pub fn new(templates: Vec<GestureTemplate>) -> Result<Self> {
        for (i, t) in templates.iter().enumerate() {
            t.validate()?;
            if templates[..i].iter().any(|other| other.name == t.name) {
                bail!("duplicate gesture template name {:?}", t.name);
            }
        }
        Ok(Self { templates })
    }

    /// The built-in template set, constructed on first use.
    pub fn builtin() -> &'static TemplateRegistry {
        static BUILTIN: OnceLock<TemplateRegistry> = OnceLock::new();
        BUILTIN.get_or_init(|| Self {
            templates: vec![index_pointer(), index_click()],
        })
    }

    pub fn templates(&self) -> &[GestureTemplate] {
        &self.templates
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.templates.iter().map(|t| t.name.as_str()).collect()
    }
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let reg = TemplateRegistry::builtin();
        assert_eq!(reg.names(), vec!["index_pointer", "index_click"]);
    }

    #[test]
    fn test_builtin_templates_validate() {
        let reg = TemplateRegistry::new(vec![index_pointer(), index_click()]).unwrap();
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_empty_template_rejected() {
        let err = TemplateRegistry::new(vec![GestureTemplate::new("nothing")]).unwrap_err();
        assert!(err.to_string().contains("no constraints"));
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let err = TemplateRegistry::new(vec![index_pointer(), index_pointer()]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_bad_weight_rejected() {
        let t = GestureTemplate::new("bad").with_curl(
            Finger::Index,
            CurlTarget::Level(FingerCurl::NoCurl),
            0.0,
        );
        assert!(TemplateRegistry::new(vec![t]).is_err());

        let t = GestureTemplate::new("bad").with_curl(
            Finger::Index,
            CurlTarget::Level(FingerCurl::NoCurl),
            1.5,
        );
        assert!(TemplateRegistry::new(vec![t]).is_err());
    }

    #[test]
    fn test_bad_curl_range_rejected() {
        let t = GestureTemplate::new("bad").with_curl(
            Finger::Ring,
            CurlTarget::Range { min: 0.8, max: 0.2 },
            1.0,
        );
        assert!(TemplateRegistry::new(vec![t]).is_err());
    }

    #[test]
    fn test_zero_direction_rejected() {
        let t = GestureTemplate::new("bad").with_direction(
            Finger::Index,
            DirectionTarget::Vector([0.0, 0.0, 0.0]),
            DEFAULT_TOLERANCE_DEG,
            1.0,
        );
        assert!(TemplateRegistry::new(vec![t]).is_err());
    }

    #[test]
    fn test_curl_target_bounds() {
        assert_eq!(CurlTarget::Level(FingerCurl::HalfCurl).bounds(), (0.5, 0.5));
        assert_eq!(CurlTarget::Value(0.3).bounds(), (0.3, 0.3));
        assert_eq!(CurlTarget::Range { min: 0.1, max: 0.4 }.bounds(), (0.1, 0.4));
    }

    #[test]
    fn test_constraint_lookup_by_finger() {
        let t = index_click();
        assert_eq!(t.curl_constraints(Finger::Index).count(), 1);
        assert_eq!(t.curl_constraints(Finger::Thumb).count(), 0);
        assert_eq!(t.direction_constraints(Finger::Index).count(), 0);
    }

    #[test]
    fn test_template_from_toml() {
        let src = r#"
            name = "thumbs_up"

            [[curls]]
            finger = "thumb"
            target = "no-curl"

            [[curls]]
            finger = "index"
            target = { min = 0.6, max = 1.0 }
            weight = 0.8

            [[directions]]
            finger = "thumb"
            target = "vertical-up"
            tolerance_deg = 30.0
        "#;
        let t: GestureTemplate = toml::from_str(src).unwrap();
        assert_eq!(t.name, "thumbs_up");
        assert_eq!(t.curls[0].target, CurlTarget::Level(FingerCurl::NoCurl));
        assert_eq!(t.curls[0].weight, 1.0);
        assert_eq!(t.curls[1].target, CurlTarget::Range { min: 0.6, max: 1.0 });
        assert_eq!(
            t.directions[0].target,
            DirectionTarget::Label(FingerDirection::VerticalUp)
        );
        assert_eq!(t.directions[0].tolerance_deg, 30.0);
        assert!(TemplateRegistry::new(vec![t]).is_ok());
    }
}
