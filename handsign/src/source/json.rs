//! Newline-delimited JSON landmark frames.
//!
//! One frame per line:
//!
//! ```text
//! {"hands":[{"handedness":"Left","score":0.93,
//!            "keypoints":[{"x":312.0,"y":208.5}, ...],
//!            "keypoints3D":[{"x":0.01,"y":-0.07,"z":0.02}, ...]}],
//!  "error":null}
//! ```
//!
//! `z` may be missing or null and reads as 0.  Hands with an unknown
//! handedness label are skipped.  A non-null `error` fails the frame.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{EstimateOptions, LandmarkSource};
use crate::hand::landmarks::{HandObservation, Handedness, Point2, Point3};

#[derive(Deserialize, Debug)]
struct KeypointJson {
    x: f32,
    y: f32,
    #[serde(default)]
    z: Option<f32>,
}

#[derive(Deserialize, Debug)]
struct HandJson {
    handedness: String,
    #[serde(default)]
    score: Option<f32>,
    #[serde(default)]
    keypoints: Vec<KeypointJson>,
    #[serde(default, rename = "keypoints3D")]
    keypoints_3d: Vec<KeypointJson>,
}

#[derive(Deserialize, Debug)]
struct FrameJson {
    #[serde(default)]
    hands: Vec<HandJson>,
    #[serde(default)]
    error: Option<String>,
}

/// Parse one JSON frame into hand observations.
pub fn parse_frame(line: &str) -> Result<Vec<HandObservation>> {
    let frame: FrameJson = serde_json::from_str(line)
        .with_context(|| format!("failed to parse landmark frame: {}", line.trim()))?;

    if let Some(error) = frame.error {
        return Err(anyhow!("detector error: {}", error));
    }

    let mut hands = Vec::with_capacity(frame.hands.len());
    for hand in frame.hands {
        let Some(handedness) = Handedness::parse(&hand.handedness) else {
            warn!("skipping hand with unknown handedness {:?}", hand.handedness);
            continue;
        };
        hands.push(HandObservation {
            handedness,
            joints: hand
                .keypoints_3d
                .iter()
                .map(|k| Point3::new(k.x, k.y, k.z.unwrap_or(0.0)))
                .collect(),
            keypoints: hand.keypoints.iter().map(|k| Point2::new(k.x, k.y)).collect(),
            score: hand.score,
        });
    }
    Ok(hands)
}

/// Reads frames line by line from any buffered reader.
pub struct JsonLinesSource<R> {
    reader: R,
    frame_width: f32,
    line_no: u64,
    exhausted: bool,
}

impl JsonLinesSource<BufReader<File>> {
    /// Open a recorded landmark file.
    pub fn open<P: AsRef<Path>>(path: P, frame_width: f32) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open landmark replay {}", path.display()))?;
        info!("replaying landmarks from {}", path.display());
        Ok(Self::new(BufReader::new(file), frame_width))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    /// `frame_width` is used to mirror keypoints when flipping.
    pub fn new(reader: R, frame_width: f32) -> Self {
        Self {
            reader,
            frame_width,
            line_no: 0,
            exhausted: false,
        }
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn estimate_hands(&mut self, options: &EstimateOptions) -> Result<Vec<HandObservation>> {
        if self.exhausted {
            return Ok(Vec::new());
        }

        let mut line = String::new();
        loop {
            line.clear();
            let read = self.reader.read_line(&mut line)?;
            if read == 0 {
                debug!(lines = self.line_no, "landmark input exhausted");
                self.exhausted = true;
                return Ok(Vec::new());
            }
            self.line_no += 1;
            if !line.trim().is_empty() {
                break;
            }
        }

        let mut hands =
            parse_frame(&line).with_context(|| format!("line {}", self.line_no))?;
        if options.flip_horizontal {
            for hand in &mut hands {
                hand.flip_horizontal(self.frame_width);
            }
        }
        Ok(hands)
    }

    fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const FRAME: &str = r#"{"hands":[{"handedness":"Left","score":0.9,"keypoints":[{"x":10.0,"y":20.0}],"keypoints3D":[{"x":0.1,"y":0.2,"z":0.3},{"x":0.4,"y":0.5}]}],"error":null}"#;

    #[test]
    fn test_parse_frame() {
        let hands = parse_frame(FRAME).unwrap();
        assert_eq!(hands.len(), 1);
        let hand = &hands[0];
        assert_eq!(hand.handedness, Handedness::Left);
        assert_eq!(hand.score, Some(0.9));
        assert_eq!(hand.keypoints, vec![Point2::new(10.0, 20.0)]);
        assert_eq!(hand.joints[0], Point3::new(0.1, 0.2, 0.3));
        assert_eq!(hand.joints[1], Point3::new(0.4, 0.5, 0.0));
    }

    #[test]
    fn test_null_z_reads_zero() {
        let hands = parse_frame(
            r#"{"hands":[{"handedness":"Right","keypoints3D":[{"x":1.0,"y":2.0,"z":null}]}]}"#,
        )
        .unwrap();
        assert_eq!(hands[0].joints[0], Point3::new(1.0, 2.0, 0.0));
        assert!(hands[0].keypoints.is_empty());
    }

    #[test]
    fn test_unknown_handedness_skipped() {
        let hands = parse_frame(r#"{"hands":[{"handedness":"Unknown"}]}"#).unwrap();
        assert!(hands.is_empty());
    }

    #[test]
    fn test_error_field_fails_frame() {
        let err = parse_frame(r#"{"hands":[],"error":"model not loaded"}"#).unwrap_err();
        assert!(err.to_string().contains("model not loaded"));
    }

    #[test]
    fn test_malformed_json_fails_frame() {
        assert!(parse_frame("{not json").is_err());
    }

    #[test]
    fn test_source_reads_until_exhausted() {
        let input = format!("{}\n\n{{\"hands\":[]}}\n", FRAME);
        let mut src = JsonLinesSource::new(Cursor::new(input), 640.0);
        let opts = EstimateOptions::default();

        assert_eq!(src.estimate_hands(&opts).unwrap().len(), 1);
        assert!(!src.is_exhausted());
        assert_eq!(src.estimate_hands(&opts).unwrap().len(), 0);
        assert!(!src.is_exhausted());
        assert!(src.estimate_hands(&opts).unwrap().is_empty());
        assert!(src.is_exhausted());
    }

    #[test]
    fn test_source_error_keeps_reading() {
        let input = format!("garbage\n{}\n", FRAME);
        let mut src = JsonLinesSource::new(Cursor::new(input), 640.0);
        let opts = EstimateOptions::default();

        let err = src.estimate_hands(&opts).unwrap_err();
        assert!(format!("{:#}", err).contains("line 1"));
        assert_eq!(src.estimate_hands(&opts).unwrap().len(), 1);
    }

    #[test]
    fn test_source_flips() {
        let mut src = JsonLinesSource::new(Cursor::new(FRAME.to_string()), 640.0);
        let hands = src
            .estimate_hands(&EstimateOptions { flip_horizontal: true })
            .unwrap();
        assert!((hands[0].keypoints[0].x - 630.0).abs() < 1e-4);
        assert!((hands[0].joints[0].x + 0.1).abs() < 1e-6);
    }
}
