//! S-expression rendering of frame results, one event per line.
//!
//! ```text
//! (:type :frame :seq 12)
//! (:type :point :x 312.0 :y 208.5 :radius 3.0 :color :blue)
//! (:type :gesture :hand :right :name "index_pointer")
//! (:type :gesture :hand :left :name nil)
//! (:type :finger-debug :hand :right :fingers ((:finger :thumb :curl 0.31 :curl-level :half-curl :direction :vertical-up) ...))
//! ```

use std::fmt::Write as _;
use std::io::Write;

use anyhow::Result;

use super::{GestureSink, LandmarkColor};
use crate::hand::geometry::HandGeometry;
use crate::hand::landmarks::{Finger, Handedness};

/// Writes one s-expression per event to `out`.
pub struct SexpSink<W: Write> {
    out: W,
    emit_points: bool,
    seq: u64,
    /// Last value written to each hand's region, indexed by `Handedness`.
    shown: [Option<String>; 2],
}

impl<W: Write> SexpSink<W> {
    pub fn new(out: W, emit_points: bool) -> Self {
        Self {
            out,
            emit_points,
            seq: 0,
            shown: [None, None],
        }
    }

    /// Current text of a hand's result region.
    pub fn shown(&self, hand: Handedness) -> Option<&str> {
        self.shown[hand.index()].as_deref()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> GestureSink for SexpSink<W> {
    fn begin_frame(&mut self) -> Result<()> {
        self.seq += 1;
        self.shown = [None, None];
        writeln!(self.out, "(:type :frame :seq {})", self.seq)?;
        Ok(())
    }

    fn draw_point(&mut self, x: f32, y: f32, radius: f32, color: LandmarkColor) -> Result<()> {
        if !self.emit_points {
            return Ok(());
        }
        writeln!(
            self.out,
            "(:type :point :x {:.1} :y {:.1} :radius {:.1} :color :{})",
            x,
            y,
            radius,
            color.as_str()
        )?;
        Ok(())
    }

    fn show_gesture(&mut self, hand: Handedness, gesture: Option<&str>) -> Result<()> {
        let name = match gesture {
            Some(g) => format!("\"{}\"", escape_string(g)),
            None => "nil".to_string(),
        };
        writeln!(
            self.out,
            "(:type :gesture :hand :{} :name {})",
            hand.as_str(),
            name
        )?;
        self.shown[hand.index()] = gesture.map(str::to_string);
        Ok(())
    }

    fn show_finger_debug(&mut self, hand: Handedness, geometry: &HandGeometry) -> Result<()> {
        let mut fingers = String::from("(");
        for (i, finger) in Finger::ALL.iter().enumerate() {
            let g = geometry.finger(*finger);
            if i > 0 {
                fingers.push(' ');
            }
            let direction = g
                .direction_label()
                .map(|d| format!(":{}", d.as_str()))
                .unwrap_or_else(|| "nil".to_string());
            write!(
                fingers,
                "(:finger :{} :curl {:.2} :curl-level :{} :direction {})",
                finger.as_str(),
                g.curl,
                g.curl_level().as_str(),
                direction
            )?;
        }
        fingers.push(')');
        writeln!(
            self.out,
            "(:type :finger-debug :hand :{} :fingers {})",
            hand.as_str(),
            fingers
        )?;
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// Escape a string for s-expression output.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
