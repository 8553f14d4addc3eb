// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Audio timeline clocks.
//!
//! The scheduler never reads wall-clock time directly. It asks a
//! [`ClockSource`] for the current position on the audio timeline, in
//! seconds, which lets playback engines supply their own render clock and
//! lets tests drive time by hand.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// A monotonically non-decreasing time source, in seconds.
pub trait ClockSource: Send + Sync {
    /// Current position on the audio timeline in seconds
    fn now(&self) -> f64;
}

/// Clock handle shared between the scheduler and its driver
pub type SharedClock = Arc<dyn ClockSource>;

/// Clock backed by the host's monotonic timer.
///
/// Time is measured from the moment the clock was created, so the
/// timeline starts at zero like an audio context does.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Create a clock whose timeline starts now
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ClockSource for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// Clock that only moves when told to.
///
/// Used for offline rendering and deterministic tests. The stored value
/// never decreases: setting an earlier time is ignored.
#[derive(Debug, Default)]
pub struct ManualClock {
    // f64 bit pattern
    seconds: AtomicU64,
}

impl ManualClock {
    /// Create a clock positioned at `seconds`
    pub fn new(seconds: f64) -> Self {
        Self {
            seconds: AtomicU64::new(seconds.max(0.0).to_bits()),
        }
    }

    /// Move the clock to `seconds` if that is not earlier than the current time
    pub fn set(&self, seconds: f64) {
        let _ = self
            .seconds
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                (seconds > f64::from_bits(bits)).then(|| seconds.to_bits())
            });
    }

    /// Advance the clock by `delta` seconds (negative deltas are ignored)
    pub fn advance(&self, delta: f64) {
        if delta > 0.0 {
            self.set(self.now() + delta);
        }
    }
}

impl ClockSource for ManualClock {
    fn now(&self) -> f64 {
        f64::from_bits(self.seconds.load(Ordering::Acquire))
    }
}
