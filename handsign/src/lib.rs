//! handsign — per-frame hand gesture matching from 3D hand landmarks.
//!
//! A landmark source supplies hand skeletons each frame; finger curl and
//! direction are extracted, scored against a fixed set of gesture
//! templates, and the best match per hand is published to a UI sink.

pub mod config;
pub mod frame_loop;
pub mod hand;
pub mod shutdown;
pub mod source;
pub mod ui;
