// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Pitch tracking loop.
//!
//! Runs the estimator once per captured window, keeps only in-band results,
//! maps them to notes and hands them to a registered sink. Rejected windows
//! produce nothing at all.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use tracing::{debug, trace};

use super::autocorrelation::{estimate_pitch_with, EstimatorSettings};
use super::window::SampleWindow;
use crate::music::note::{frequency_to_note, NoteIdentity};

/// Frequency range accepted as a playable note (bounds exclusive)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBand {
    /// Lower bound in Hz
    pub min: f64,
    /// Upper bound in Hz
    pub max: f64,
}

impl FrequencyBand {
    /// Whether `frequency` lies strictly inside the band
    pub fn contains(&self, frequency: f64) -> bool {
        frequency > self.min && frequency < self.max
    }
}

impl Default for FrequencyBand {
    fn default() -> Self {
        Self {
            min: 50.0,
            max: 2000.0,
        }
    }
}

/// Supplies captured windows to [`PitchTracker::run`].
///
/// Returning `None` means the capture has ended.
pub trait SampleSource {
    /// Next window to analyse
    fn next_window(&mut self) -> Option<SampleWindow>;
}

impl SampleSource for Receiver<SampleWindow> {
    fn next_window(&mut self) -> Option<SampleWindow> {
        self.recv().ok()
    }
}

impl SampleSource for VecDeque<SampleWindow> {
    fn next_window(&mut self) -> Option<SampleWindow> {
        self.pop_front()
    }
}

/// Receives every accepted note
pub type NoteSink = Box<dyn FnMut(&NoteIdentity) + Send>;

/// Per-window pitch detection with band gating
pub struct PitchTracker {
    settings: EstimatorSettings,
    band: FrequencyBand,
    enabled: Arc<AtomicBool>,
    last_note: Option<NoteIdentity>,
    sink: Option<NoteSink>,
}

impl PitchTracker {
    /// Create a disabled tracker
    pub fn new(settings: EstimatorSettings, band: FrequencyBand) -> Self {
        Self {
            settings,
            band,
            enabled: Arc::new(AtomicBool::new(false)),
            last_note: None,
            sink: None,
        }
    }

    /// Register the note sink, replacing any previous one
    pub fn on_note<F>(&mut self, sink: F)
    where
        F: FnMut(&NoteIdentity) + Send + 'static,
    {
        self.sink = Some(Box::new(sink));
    }

    /// Accepted frequency band
    pub fn band(&self) -> FrequencyBand {
        self.band
    }

    /// Flag checked at the top of every [`run`](Self::run) iteration.
    /// Clearing it from any thread ends the loop.
    pub fn enabled_flag(&self) -> Arc<AtomicBool> {
        self.enabled.clone()
    }

    /// Whether the loop is allowed to run
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Allow [`run`](Self::run) to process windows
    pub fn start(&mut self) {
        self.enabled.store(true, Ordering::Release);
        debug!("pitch tracking enabled");
    }

    /// Disable the loop and forget the last note
    pub fn stop(&mut self) {
        self.enabled.store(false, Ordering::Release);
        self.last_note = None;
        debug!("pitch tracking disabled");
    }

    /// Most recently published note
    pub fn last_note(&self) -> Option<NoteIdentity> {
        self.last_note
    }

    /// Analyse one window. Returns the note when one was published.
    pub fn process(&mut self, window: &SampleWindow) -> Option<NoteIdentity> {
        let frequency = estimate_pitch_with(window.samples(), window.sample_rate(), &self.settings)
            .frequency()
            .filter(|&hz| self.band.contains(hz))?;
        let note = frequency_to_note(frequency)?;

        trace!(frequency, note = %note, "pitch detected");
        self.last_note = Some(note);
        if let Some(sink) = self.sink.as_mut() {
            sink(&note);
        }
        Some(note)
    }

    /// Process windows until the source ends or the enabled flag clears.
    ///
    /// Returns the number of windows analysed.
    pub fn run<S>(&mut self, source: &mut S) -> usize
    where
        S: SampleSource + ?Sized,
    {
        let mut processed = 0;
        while self.is_enabled() {
            let Some(window) = source.next_window() else {
                debug!(processed, "sample source exhausted");
                break;
            };
            self.process(&window);
            processed += 1;
        }
        processed
    }
}

impl Default for PitchTracker {
    fn default() -> Self {
        Self::new(EstimatorSettings::default(), FrequencyBand::default())
    }
}

impl std::fmt::Debug for PitchTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PitchTracker")
            .field("settings", &self.settings)
            .field("band", &self.band)
            .field("enabled", &self.is_enabled())
            .field("last_note", &self.last_note)
            .field("has_sink", &self.sink.is_some())
            .finish()
    }
}
