//! Gesture estimation: score every registered template against one hand.
//!
//! Scores live on a fixed [0, 1] scale.  For each finger a template
//! constrains, a sub-score `1 - weight * distance` is computed for curl and
//! for direction separately; alternatives on the same finger keep the best
//! sub-score.  The template score is the mean over those constrained
//! (finger, kind) groups, so 1.0 means every group matched exactly.

use tracing::trace;

use super::geometry::{FingerGeometry, HandGeometry};
use super::landmarks::Finger;
use super::template::{CurlConstraint, DirectionConstraint, GestureTemplate, TemplateRegistry};

/// Default acceptance threshold as a fraction of the maximum score.
///
/// A fully closed fist scores 0.8875 against `index_click`; any threshold
/// at or below that reports a fist as a click.
pub const DEFAULT_THRESHOLD: f32 = 0.9;

/// Score of one template for one hand in one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub name: String,
    pub score: f32,
}

/// Stateless scorer over a template registry.
#[derive(Debug, Clone, Copy)]
pub struct GestureEstimator<'r> {
    registry: &'r TemplateRegistry,
}

impl<'r> GestureEstimator<'r> {
    pub fn new(registry: &'r TemplateRegistry) -> Self {
        Self { registry }
    }

    /// All templates scoring at least `threshold`, in registration order.
    pub fn estimate(&self, hand: &HandGeometry, threshold: f32) -> Vec<MatchResult> {
        self.registry
            .templates()
            .iter()
            .filter_map(|template| {
                let score = score_template(template, hand)?;
                trace!(gesture = %template.name, score, "template scored");
                (score >= threshold).then(|| MatchResult {
                    name: template.name.clone(),
                    score,
                })
            })
            .collect()
    }

    /// Highest-scoring template at or above `threshold`, if any.
    pub fn best(&self, hand: &HandGeometry, threshold: f32) -> Option<MatchResult> {
        best_match(self.estimate(hand, threshold))
    }
}

/// Pick the highest score; on ties the earliest entry wins.
pub fn best_match(matches: impl IntoIterator<Item = MatchResult>) -> Option<MatchResult> {
    let mut best: Option<MatchResult> = None;
    for m in matches {
        match &best {
            Some(current) if m.score <= current.score => {}
            _ => best = Some(m),
        }
    }
    best
}

/// Mean group sub-score, or `None` when the template constrains nothing.
pub fn score_template(template: &GestureTemplate, hand: &HandGeometry) -> Option<f32> {
    let mut total = 0.0;
    let mut groups = 0usize;

    for finger in Finger::ALL {
        let observed = hand.finger(finger);

        let curl = template
            .curl_constraints(finger)
            .map(|c| curl_subscore(c, observed))
            .reduce(f32::max);
        if let Some(s) = curl {
            total += s;
            groups += 1;
        }

        let direction = template
            .direction_constraints(finger)
            .map(|c| direction_subscore(c, observed))
            .reduce(f32::max);
        if let Some(s) = direction {
            total += s;
            groups += 1;
        }
    }

    if groups == 0 {
        return None;
    }
    Some((total / groups as f32).clamp(0.0, 1.0))
}

/// Distance outside the target range on the [0, 1] curl scale.
fn curl_distance(constraint: &CurlConstraint, curl: f32) -> f32 {
    let (min, max) = constraint.target.bounds();
    let d = if curl < min {
        min - curl
    } else if curl > max {
        curl - max
    } else {
        0.0
    };
    d.clamp(0.0, 1.0)
}

fn curl_subscore(constraint: &CurlConstraint, observed: &FingerGeometry) -> f32 {
    1.0 - constraint.weight * curl_distance(constraint, observed.curl)
}

/// Angle beyond tolerance, normalized by the remaining half-turn.
fn direction_distance(constraint: &DirectionConstraint, observed: &FingerGeometry) -> f32 {
    let Some(target) = constraint.target.vector() else {
        return 1.0;
    };
    let Some(angle) = observed.direction.angle_to(target) else {
        return 1.0;
    };
    let angle = angle.to_degrees();
    let tolerance = constraint.tolerance_deg;
    if angle <= tolerance {
        0.0
    } else {
        ((angle - tolerance) / (180.0 - tolerance)).clamp(0.0, 1.0)
    }
}

fn direction_subscore(constraint: &DirectionConstraint, observed: &FingerGeometry) -> f32 {
    1.0 - constraint.weight * direction_distance(constraint, observed)
}

// ── Tests ──────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hand::geometry::{extract, FingerCurl, FingerDirection};
    use crate::hand::landmarks::{Handedness, Point3};
    use crate::hand::template::{CurlTarget, DirectionTarget, DEFAULT_TOLERANCE_DEG};
    use crate::source::synthetic::synthetic_hand;

    fn geometry(curls: [f32; 5]) -> HandGeometry {
        extract(&synthetic_hand(Handedness::Right, curls).joints)
    }

    fn builtin() -> GestureEstimator<'static> {
        GestureEstimator::new(TemplateRegistry::builtin())
    }

    #[test]
    fn test_pointer_pose_selects_index_pointer() {
        let hand = geometry([0.0, 0.0, 1.0, 1.0, 1.0]);
        let matches = builtin().estimate(&hand, DEFAULT_THRESHOLD);
        let best = best_match(matches).expect("expected a match");
        assert_eq!(best.name, "index_pointer");
        assert!((best.score - 1.0).abs() < 1e-3, "score {}", best.score);
    }

    #[test]
    fn test_half_curled_index_selects_index_click() {
        let hand = geometry([0.0, 0.5, 1.0, 1.0, 1.0]);
        let best = builtin().best(&hand, DEFAULT_THRESHOLD).expect("expected a match");
        assert_eq!(best.name, "index_click");
        assert!((best.score - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_closed_fist_matches_nothing() {
        let hand = geometry([1.0; 5]);
        assert!(builtin().estimate(&hand, DEFAULT_THRESHOLD).is_empty());
    }

    #[test]
    fn test_closed_fist_stays_below_click_threshold() {
        let hand = geometry([1.0; 5]);
        let click = TemplateRegistry::builtin()
            .templates()
            .iter()
            .find(|t| t.name == "index_click")
            .unwrap();
        let score = score_template(click, &hand).unwrap();
        assert!((score - 0.8875).abs() < 1e-3, "score {}", score);
        assert!(score < DEFAULT_THRESHOLD);
        assert_eq!(
            builtin().best(&hand, 0.88).map(|m| m.name),
            Some("index_click".to_string())
        );
    }

    #[test]
    fn test_open_hand_matches_nothing() {
        let hand = geometry([0.0; 5]);
        assert!(builtin().estimate(&hand, DEFAULT_THRESHOLD).is_empty());
    }

    #[test]
    fn test_score_is_scale_invariant() {
        let obs = synthetic_hand(Handedness::Left, [0.2, 0.3, 0.8, 0.9, 0.6]);
        let scaled: Vec<Point3> = obs.joints.iter().map(|p| p.scale(7.5)).collect();
        let a = extract(&obs.joints);
        let b = extract(&scaled);
        for template in TemplateRegistry::builtin().templates() {
            let sa = score_template(template, &a).unwrap();
            let sb = score_template(template, &b).unwrap();
            assert!((sa - sb).abs() < 1e-4, "{}: {} vs {}", template.name, sa, sb);
        }
    }

    #[test]
    fn test_scores_bounded() {
        for curls in [[0.0; 5], [1.0; 5], [0.3, 0.9, 0.1, 0.5, 0.7]] {
            let hand = geometry(curls);
            for m in builtin().estimate(&hand, 0.0) {
                assert!((0.0..=1.0).contains(&m.score), "{} out of range", m.score);
            }
        }
    }

    #[test]
    fn test_score_monotonic_in_curl_distance() {
        let template = GestureTemplate::new("straight")
            .with_curl(Finger::Index, CurlTarget::Level(FingerCurl::NoCurl), 1.0);
        let mut last = f32::INFINITY;
        for step in 0..=10 {
            let c = step as f32 / 10.0;
            let score = score_template(&template, &geometry([0.0, c, 0.0, 0.0, 0.0])).unwrap();
            assert!(score <= last + 1e-6);
            last = score;
        }
    }

    #[test]
    fn test_threshold_zero_returns_every_template() {
        let hand = geometry([1.0; 5]);
        let matches = builtin().estimate(&hand, 0.0);
        let names: Vec<&str> = matches.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["index_pointer", "index_click"]);
    }

    #[test]
    fn test_higher_score_wins_partial_match() {
        let reg = TemplateRegistry::new(vec![
            GestureTemplate::new("loose")
                .with_curl(Finger::Index, CurlTarget::Value(0.4), 1.0)
                .with_curl(Finger::Middle, CurlTarget::Value(1.0), 1.0),
            GestureTemplate::new("close")
                .with_curl(Finger::Index, CurlTarget::Value(0.3), 1.0)
                .with_curl(Finger::Middle, CurlTarget::Value(1.0), 1.0),
        ])
        .unwrap();
        let hand = geometry([0.0, 0.25, 1.0, 1.0, 1.0]);
        let best = GestureEstimator::new(&reg).best(&hand, 0.5).unwrap();
        assert_eq!(best.name, "close");
    }

    #[test]
    fn test_tie_goes_to_first_registered() {
        let reg = TemplateRegistry::new(vec![
            GestureTemplate::new("first")
                .with_curl(Finger::Ring, CurlTarget::Level(FingerCurl::FullCurl), 1.0),
            GestureTemplate::new("second")
                .with_curl(Finger::Pinky, CurlTarget::Level(FingerCurl::FullCurl), 1.0),
        ])
        .unwrap();
        let hand = geometry([0.0, 0.0, 0.0, 1.0, 1.0]);
        let best = GestureEstimator::new(&reg).best(&hand, 0.9).unwrap();
        assert_eq!(best.name, "first");
    }

    #[test]
    fn test_best_match_ties() {
        let matches = vec![
            MatchResult { name: "a".into(), score: 0.95 },
            MatchResult { name: "b".into(), score: 0.97 },
            MatchResult { name: "c".into(), score: 0.97 },
        ];
        assert_eq!(best_match(matches).unwrap().name, "b");
        assert!(best_match(Vec::new()).is_none());
    }

    #[test]
    fn test_curl_alternatives_take_best() {
        let template = GestureTemplate::new("either")
            .with_curl(Finger::Index, CurlTarget::Level(FingerCurl::FullCurl), 1.0)
            .with_curl(Finger::Index, CurlTarget::Level(FingerCurl::HalfCurl), 0.9);
        let half = score_template(&template, &geometry([0.0, 0.5, 0.0, 0.0, 0.0])).unwrap();
        let full = score_template(&template, &geometry([0.0, 1.0, 0.0, 0.0, 0.0])).unwrap();
        assert!((half - 1.0).abs() < 1e-3);
        assert!((full - 1.0).abs() < 1e-3);
    }

    #[test]
    fn test_curl_range_inside_is_exact() {
        let template = GestureTemplate::new("range").with_curl(
            Finger::Middle,
            CurlTarget::Range { min: 0.2, max: 0.6 },
            1.0,
        );
        let score = score_template(&template, &geometry([0.0, 0.0, 0.4, 0.0, 0.0])).unwrap();
        assert!((score - 1.0).abs() < 1e-3);
        let score = score_template(&template, &geometry([0.0, 0.0, 0.9, 0.0, 0.0])).unwrap();
        assert!((score - 0.7).abs() < 1e-2, "score {}", score);
    }

    #[test]
    fn test_direction_within_tolerance() {
        let template = GestureTemplate::new("up").with_direction(
            Finger::Index,
            DirectionTarget::Label(FingerDirection::VerticalUp),
            DEFAULT_TOLERANCE_DEG,
            1.0,
        );
        let up = score_template(&template, &geometry([0.0; 5])).unwrap();
        assert!((up - 1.0).abs() < 1e-4);

        let mut down = HandGeometry::default();
        down.fingers[Finger::Index.index()].direction = Point3::new(0.0, 1.0, 0.0);
        let score = score_template(&template, &down).unwrap();
        assert!(score.abs() < 1e-4, "opposite direction scored {}", score);
    }

    #[test]
    fn test_zero_direction_scores_worst() {
        let template = GestureTemplate::new("up").with_direction(
            Finger::Index,
            DirectionTarget::Label(FingerDirection::VerticalUp),
            DEFAULT_TOLERANCE_DEG,
            0.5,
        );
        let score = score_template(&template, &HandGeometry::default()).unwrap();
        assert!((score - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_hand_yields_no_error() {
        let hand = extract(&[]);
        let matches = builtin().estimate(&hand, DEFAULT_THRESHOLD);
        assert!(matches.is_empty());
    }
}
