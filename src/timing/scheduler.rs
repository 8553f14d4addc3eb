// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Lookahead beat scheduler.
//!
//! A coarse, jittery poll (every ~25ms) checks whether any beat falls inside
//! a short window ahead of the audio clock. Every beat inside the window is
//! emitted with its precomputed timeline timestamp, so playback stays
//! sample-accurate even when the poll itself runs late. A late poll catches
//! up by emitting several beats at once; beats are never dropped.

use std::time::Duration;

use tracing::{debug, trace, warn};

use super::clock::SharedClock;
use crate::error::{Error, Result};

/// Default number of beats in a bar
pub const DEFAULT_BAR_LENGTH: u32 = 4;

/// Tempo in beats per minute. Always finite and greater than zero.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Bpm(f64);

impl Bpm {
    /// Validate a tempo
    pub fn new(bpm: f64) -> Result<Self> {
        if bpm.is_finite() && bpm > 0.0 {
            Ok(Self(bpm))
        } else {
            Err(Error::InvalidTempo(bpm))
        }
    }

    /// Tempo in beats per minute
    pub fn get(self) -> f64 {
        self.0
    }

    /// Seconds between consecutive beats
    pub fn beat_interval(self) -> f64 {
        60.0 / self.0
    }
}

impl Default for Bpm {
    fn default() -> Self {
        Self(60.0)
    }
}

impl TryFrom<f64> for Bpm {
    type Error = Error;

    fn try_from(bpm: f64) -> Result<Self> {
        Self::new(bpm)
    }
}

/// Lifecycle of the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Never started, or stopped
    Idle,
    /// Polling and emitting beats
    Running,
    /// Halted with beat position preserved
    Paused,
}

/// Scheduler tuning
#[derive(Debug, Clone, PartialEq)]
pub struct SchedulerConfig {
    /// How often the driver should call [`LookaheadScheduler::tick`]
    pub poll_interval: Duration,
    /// How far ahead of the clock beats are emitted, in seconds
    pub schedule_ahead: f64,
    /// Gap between start/resume and the first beat, in seconds
    pub start_delay: f64,
    /// Beats per bar; the counter wraps back to 1 after this
    bar_length: u32,
}

impl SchedulerConfig {
    /// Replace the bar length (must be at least one beat)
    pub fn with_bar_length(mut self, bar_length: u32) -> Result<Self> {
        if bar_length == 0 {
            return Err(Error::InvalidBarLength(bar_length));
        }
        self.bar_length = bar_length;
        Ok(self)
    }

    /// Beats per bar
    pub fn bar_length(&self) -> u32 {
        self.bar_length
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(25),
            schedule_ahead: 0.1,
            start_delay: 0.1,
            bar_length: DEFAULT_BAR_LENGTH,
        }
    }
}

/// Snapshot of the scheduler's internal position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduleState {
    /// Timeline time at which the next beat is due
    pub next_beat_time: f64,
    /// Beat number the next emitted beat will carry (0 only when idle)
    pub beat_counter: u32,
    /// Current tempo
    pub tempo: Bpm,
    /// Whether polling is active
    pub running: bool,
}

impl Default for ScheduleState {
    fn default() -> Self {
        Self {
            next_beat_time: 0.0,
            beat_counter: 0,
            tempo: Bpm::default(),
            running: false,
        }
    }
}

/// A beat handed to the beat callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledBeat {
    /// Position in the bar, 1..=bar_length
    pub beat: u32,
    /// Timeline time the beat should sound at
    pub time: f64,
    /// How long a UI notification should wait to line up with `time`
    pub notify_delay: Duration,
}

/// Callback invoked once per emitted beat
pub type BeatCallback = Box<dyn FnMut(&ScheduledBeat) + Send>;

/// Drift-resistant metronome scheduler.
///
/// All state changes go through [`start`](Self::start),
/// [`pause`](Self::pause), [`resume`](Self::resume), [`stop`](Self::stop),
/// [`set_tempo`](Self::set_tempo) and [`tick`](Self::tick). Without an
/// attached clock every operation is a silent no-op.
pub struct LookaheadScheduler {
    clock: Option<SharedClock>,
    config: SchedulerConfig,
    schedule: ScheduleState,
    on_beat: Option<BeatCallback>,
}

impl LookaheadScheduler {
    /// Create a scheduler with no clock attached
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            clock: None,
            config,
            schedule: ScheduleState::default(),
            on_beat: None,
        }
    }

    /// Create a scheduler reading time from `clock`
    pub fn with_clock(clock: SharedClock, config: SchedulerConfig) -> Self {
        Self {
            clock: Some(clock),
            ..Self::new(config)
        }
    }

    /// Attach (or replace) the clock source
    pub fn attach_clock(&mut self, clock: SharedClock) {
        self.clock = Some(clock);
    }

    /// Whether a clock is attached
    pub fn has_clock(&self) -> bool {
        self.clock.is_some()
    }

    /// Scheduler configuration
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Copy of the current schedule state
    pub fn state(&self) -> ScheduleState {
        self.schedule
    }

    /// Current lifecycle state
    pub fn phase(&self) -> SchedulerState {
        if self.schedule.running {
            SchedulerState::Running
        } else if self.schedule.beat_counter == 0 {
            SchedulerState::Idle
        } else {
            SchedulerState::Paused
        }
    }

    /// Current tempo
    pub fn tempo(&self) -> Bpm {
        self.schedule.tempo
    }

    /// Change tempo. Beats already emitted keep their timestamps; the new
    /// interval applies from the next advance.
    pub fn set_tempo(&mut self, tempo: Bpm) {
        debug!(bpm = tempo.get(), "tempo changed");
        self.schedule.tempo = tempo;
    }

    fn now(&self, operation: &str) -> Option<f64> {
        match &self.clock {
            Some(clock) => Some(clock.now()),
            None => {
                warn!(operation, "no clock source attached; ignoring");
                None
            }
        }
    }

    /// Start from beat 1. The first beat is due `start_delay` after now.
    ///
    /// Restarts the bar if already running or paused.
    pub fn start<F>(&mut self, tempo: Bpm, on_beat: F)
    where
        F: FnMut(&ScheduledBeat) + Send + 'static,
    {
        let Some(now) = self.now("start") else {
            return;
        };

        self.schedule = ScheduleState {
            next_beat_time: now + self.config.start_delay,
            beat_counter: 1,
            tempo,
            running: true,
        };
        self.on_beat = Some(Box::new(on_beat));

        debug!(
            bpm = tempo.get(),
            first_beat = self.schedule.next_beat_time,
            "scheduler started"
        );
    }

    /// Halt polling, keeping the beat counter and next beat time.
    pub fn pause(&mut self) {
        if self.clock.is_none() || !self.schedule.running {
            return;
        }
        self.schedule.running = false;
        debug!(beat = self.schedule.beat_counter, "scheduler paused");
    }

    /// Continue a paused bar. Time spent paused is discarded: the next beat
    /// is due `start_delay` after now rather than at its pre-pause time.
    pub fn resume(&mut self) {
        if self.phase() != SchedulerState::Paused {
            return;
        }
        let Some(now) = self.now("resume") else {
            return;
        };

        self.schedule.next_beat_time = now + self.config.start_delay;
        self.schedule.running = true;

        debug!(
            beat = self.schedule.beat_counter,
            next_beat = self.schedule.next_beat_time,
            "scheduler resumed"
        );
    }

    /// Halt polling, reset the counters and drop the beat callback.
    pub fn stop(&mut self) {
        if self.clock.is_none() {
            return;
        }
        self.schedule.running = false;
        self.schedule.beat_counter = 0;
        self.schedule.next_beat_time = 0.0;
        self.on_beat = None;
        debug!("scheduler stopped");
    }

    /// One poll: emit every beat due before `now + schedule_ahead`.
    ///
    /// Returns the emitted beats in order, after handing each to the
    /// callback. Returns nothing while idle, paused, or without a clock.
    pub fn tick(&mut self) -> Vec<ScheduledBeat> {
        if !self.schedule.running {
            return Vec::new();
        }
        let Some(now) = self.now("tick") else {
            return Vec::new();
        };

        let horizon = now + self.config.schedule_ahead;
        let mut emitted = Vec::new();

        while self.schedule.next_beat_time < horizon {
            let time = self.schedule.next_beat_time;
            let beat = ScheduledBeat {
                beat: self.schedule.beat_counter,
                time,
                notify_delay: Duration::from_secs_f64((time - now).max(0.0)),
            };
            trace!(beat = beat.beat, time, "beat scheduled");

            if let Some(on_beat) = self.on_beat.as_mut() {
                on_beat(&beat);
            }
            emitted.push(beat);
            self.advance();
        }

        emitted
    }

    fn advance(&mut self) {
        self.schedule.next_beat_time += self.schedule.tempo.beat_interval();
        self.schedule.beat_counter += 1;
        if self.schedule.beat_counter > self.config.bar_length {
            self.schedule.beat_counter = 1;
        }
    }
}

impl Default for LookaheadScheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl std::fmt::Debug for LookaheadScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookaheadScheduler")
            .field("has_clock", &self.clock.is_some())
            .field("config", &self.config)
            .field("schedule", &self.schedule)
            .field("has_callback", &self.on_beat.is_some())
            .finish()
    }
}
