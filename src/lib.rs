// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! DRILL - metronome and pitch detection core for music practice.
//!
//! Two pieces do the real work:
//! - [`timing::LookaheadScheduler`] emits beats with audio-accurate
//!   timestamps despite a coarse, jittery poll.
//! - [`pitch::estimate_pitch`] finds the dominant frequency of a sample
//!   window by autocorrelation, and [`music::frequency_to_note`] names it.

pub mod config;
pub mod error;
pub mod midi;
pub mod music;
pub mod pitch;
pub mod timing;

pub use error::{Error, Result};
