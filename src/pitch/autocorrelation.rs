// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Time-domain autocorrelation pitch estimation.
//!
//! 1. Reject windows quieter than the noise floor (RMS).
//! 2. Trim loud edges: the analysed span starts at the first sample below the
//!    trim threshold in the first half and ends at the last such sample in
//!    the second half.
//! 3. Compute the unnormalised autocorrelation of the trimmed span.
//! 4. Walk past the descending slope from lag 0, then take the highest lag
//!    as the period.
//! 5. Refine the period with a parabola through its neighbours.

/// RMS below which a window is treated as silence
pub const NOISE_FLOOR: f32 = 0.01;

/// Magnitude below which a sample counts as a quiet edge for trimming
pub const TRIM_THRESHOLD: f32 = 0.2;

/// Trimmed spans this short carry no usable period
const MIN_TRIMMED_LEN: usize = 3;

/// Largest sub-sample shift accepted from parabolic refinement
const MAX_REFINEMENT_SHIFT: f64 = 1.0;

/// Outcome of a single estimation
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PitchEstimate {
    /// Dominant frequency in Hz
    Frequency(f64),
    /// Silence, noise, or a window too short to analyse
    Invalid,
}

impl PitchEstimate {
    /// The frequency, if any
    pub fn frequency(self) -> Option<f64> {
        match self {
            PitchEstimate::Frequency(hz) => Some(hz),
            PitchEstimate::Invalid => None,
        }
    }

    /// Whether a frequency was found
    pub fn is_valid(self) -> bool {
        matches!(self, PitchEstimate::Frequency(_))
    }
}

/// Thresholds for [`estimate_pitch_with`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EstimatorSettings {
    /// RMS below which the window is rejected
    pub noise_floor: f32,
    /// Edge-trim magnitude threshold
    pub trim_threshold: f32,
}

impl Default for EstimatorSettings {
    fn default() -> Self {
        Self {
            noise_floor: NOISE_FLOOR,
            trim_threshold: TRIM_THRESHOLD,
        }
    }
}

/// Estimate the dominant frequency of `samples` with the default thresholds
pub fn estimate_pitch(samples: &[f32], sample_rate: u32) -> PitchEstimate {
    estimate_pitch_with(samples, sample_rate, &EstimatorSettings::default())
}

/// Estimate the dominant frequency of `samples`.
///
/// Never panics: empty, silent or degenerate input yields
/// [`PitchEstimate::Invalid`]. Range gating (e.g. 50-2000 Hz) is left to
/// the caller.
pub fn estimate_pitch_with(
    samples: &[f32],
    sample_rate: u32,
    settings: &EstimatorSettings,
) -> PitchEstimate {
    if sample_rate == 0 || super::window::rms(samples) < settings.noise_floor {
        return PitchEstimate::Invalid;
    }

    let trimmed = trim(samples, settings.trim_threshold);
    if trimmed.len() < MIN_TRIMMED_LEN {
        return PitchEstimate::Invalid;
    }

    let correlation = autocorrelate(trimmed);
    let Some(coarse) = peak_lag(&correlation) else {
        return PitchEstimate::Invalid;
    };
    if coarse == 0 {
        return PitchEstimate::Invalid;
    }

    let period = refine(&correlation, coarse);
    let frequency = f64::from(sample_rate) / period;
    if frequency.is_finite() && frequency > 0.0 {
        PitchEstimate::Frequency(frequency)
    } else {
        PitchEstimate::Invalid
    }
}

/// Drop loud leading and trailing samples.
///
/// The left bound is the first index in the first half whose magnitude is
/// below `threshold` (0 if none). The right bound (exclusive) is the last
/// such index scanning inward from the end over the second half (the full
/// length if none). On odd lengths both scans include the middle sample.
pub fn trim(samples: &[f32], threshold: f32) -> &[f32] {
    let len = samples.len();
    let half = len.div_ceil(2);

    let start = samples[..half]
        .iter()
        .position(|s| s.abs() < threshold)
        .unwrap_or(0);

    let end = (1..half)
        .map(|offset| len - offset)
        .find(|&i| samples[i].abs() < threshold)
        .unwrap_or(len);

    if start >= end {
        return &[];
    }
    &samples[start..end]
}

/// Unnormalised autocorrelation for every lag in `0..samples.len()`
pub fn autocorrelate(samples: &[f32]) -> Vec<f64> {
    let len = samples.len();
    (0..len)
        .map(|lag| {
            samples[..len - lag]
                .iter()
                .zip(&samples[lag..])
                .map(|(&a, &b)| f64::from(a) * f64::from(b))
                .sum()
        })
        .collect()
}

/// Lag of the highest correlation after the initial descent from lag 0
fn peak_lag(correlation: &[f64]) -> Option<usize> {
    let mut cursor = 0;
    while cursor + 1 < correlation.len() && correlation[cursor] > correlation[cursor + 1] {
        cursor += 1;
    }

    let mut best: Option<(usize, f64)> = None;
    for (lag, &value) in correlation.iter().enumerate().skip(cursor) {
        if best.map_or(true, |(_, max)| value > max) {
            best = Some((lag, value));
        }
    }
    best.map(|(lag, _)| lag)
}

/// Parabolic interpolation around `lag`.
///
/// Left unrefined at the array edges, when the curvature vanishes relative
/// to the peak, or when the vertex lands more than a sample away.
fn refine(correlation: &[f64], lag: usize) -> f64 {
    if lag == 0 || lag + 1 >= correlation.len() {
        return lag as f64;
    }

    let left = correlation[lag - 1];
    let centre = correlation[lag];
    let right = correlation[lag + 1];

    let a = (left + right - 2.0 * centre) / 2.0;
    let b = (right - left) / 2.0;

    let scale = centre.abs().max(f64::MIN_POSITIVE);
    if a.abs() <= scale * 1e-12 {
        return lag as f64;
    }

    let shift = b / (2.0 * a);
    if !shift.is_finite() || shift.abs() > MAX_REFINEMENT_SHIFT {
        return lag as f64;
    }
    lag as f64 - shift
}
