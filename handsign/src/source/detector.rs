//! Hand landmark detection through an external detector subprocess.
//!
//! The detector owns the camera and the pose-estimation model.  It is
//! started with the capture geometry as arguments, must print `READY` once
//! the model is loaded, and then answers each request line
//! `{"flip_horizontal":true}` with one JSON frame (see `source::json`).

use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use anyhow::{bail, Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::json::parse_frame;
use super::{EstimateOptions, LandmarkSource};
use crate::config::{DetectorConfig, VideoConfig};
use crate::hand::landmarks::HandObservation;

#[derive(Serialize)]
struct FrameRequest {
    flip_horizontal: bool,
}

/// Running detector subprocess.
pub struct DetectorProcess {
    process: Child,
    stdin: ChildStdin,
    stdout_reader: BufReader<ChildStdout>,
    exited: bool,
}

impl DetectorProcess {
    /// Spawn the detector and wait for its ready signal.
    pub fn spawn(detector: &DetectorConfig, video: &VideoConfig) -> Result<Self> {
        let Some(program) = detector.command.first() else {
            bail!("detector command is empty; set [detector] command in the config");
        };

        info!("starting hand detector: {}", detector.command.join(" "));

        let mut process = Command::new(program)
            .args(&detector.command[1..])
            .arg("--width")
            .arg(video.width.to_string())
            .arg("--height")
            .arg(video.height.to_string())
            .arg("--fps")
            .arg(video.fps.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .with_context(|| format!("failed to start detector {:?}", program))?;

        let stdin = process.stdin.take().context("failed to get detector stdin")?;
        let stdout = process.stdout.take().context("failed to get detector stdout")?;
        let mut stdout_reader = BufReader::new(stdout);

        let mut ready_line = String::new();
        stdout_reader.read_line(&mut ready_line)?;
        if ready_line.trim() != "READY" {
            let _ = process.kill();
            bail!("detector did not signal ready, got: {:?}", ready_line.trim());
        }

        info!("hand detector ready");

        Ok(Self {
            process,
            stdin,
            stdout_reader,
            exited: false,
        })
    }
}

impl LandmarkSource for DetectorProcess {
    fn estimate_hands(&mut self, options: &EstimateOptions) -> Result<Vec<HandObservation>> {
        if self.exited {
            return Ok(Vec::new());
        }

        let request = serde_json::to_string(&FrameRequest {
            flip_horizontal: options.flip_horizontal,
        })?;
        if let Err(e) = writeln!(self.stdin, "{}", request).and_then(|_| self.stdin.flush()) {
            self.exited = true;
            return Err(e).context("failed to send frame request to detector");
        }

        let mut response = String::new();
        if self.stdout_reader.read_line(&mut response)? == 0 {
            warn!("detector closed its output");
            self.exited = true;
            return Ok(Vec::new());
        }

        let hands = parse_frame(&response)?;
        debug!(hands = hands.len(), "detector frame");
        Ok(hands)
    }

    fn is_exhausted(&self) -> bool {
        self.exited
    }
}

impl Drop for DetectorProcess {
    fn drop(&mut self) {
        let _ = self.process.kill();
        let _ = self.process.wait();
    }
}
