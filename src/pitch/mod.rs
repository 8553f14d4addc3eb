// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch detection module.
//!
//! This module provides sample windows, the autocorrelation estimator,
//! and the tracking loop that turns captured audio into notes.

pub mod autocorrelation;
pub mod tracker;
pub mod window;

pub use autocorrelation::{
    estimate_pitch, estimate_pitch_with, EstimatorSettings, PitchEstimate, NOISE_FLOOR,
    TRIM_THRESHOLD,
};
pub use tracker::{FrequencyBand, NoteSink, PitchTracker, SampleSource};
pub use window::{SampleWindow, DEFAULT_WINDOW_SIZE};
