// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Captured sample windows.

use std::sync::Arc;

/// Window length the capture pipeline has historically delivered
pub const DEFAULT_WINDOW_SIZE: usize = 2048;

/// A fixed block of mono samples in [-1.0, 1.0] plus its sample rate.
///
/// Immutable once built; cloning shares the sample buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleWindow {
    samples: Arc<[f32]>,
    sample_rate: u32,
}

impl SampleWindow {
    /// Wrap captured samples
    pub fn new(samples: impl Into<Arc<[f32]>>, sample_rate: u32) -> Self {
        Self {
            samples: samples.into(),
            sample_rate,
        }
    }

    /// The samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True when the window holds no samples
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Root-mean-square amplitude (0.0 for an empty window)
    pub fn rms(&self) -> f32 {
        rms(&self.samples)
    }

    /// Window length in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Root-mean-square amplitude of `samples` (0.0 when empty)
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (sum / samples.len() as f64).sqrt() as f32
}
