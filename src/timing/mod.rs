// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Timing and clock module.
//!
//! This module provides audio timeline clocks, the lookahead beat
//! scheduler, and the Tokio driver that polls it.

pub mod clock;
pub mod metronome;
pub mod scheduler;

pub use clock::{ClockSource, ManualClock, SharedClock, SystemClock};
pub use metronome::{BeatSink, Metronome};
pub use scheduler::{
    BeatCallback, Bpm, LookaheadScheduler, ScheduleState, ScheduledBeat, SchedulerConfig,
    SchedulerState, DEFAULT_BAR_LENGTH,
};
