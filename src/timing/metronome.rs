// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Async metronome driver.
//!
//! Runs a [`LookaheadScheduler`] on a Tokio interval and delivers beat
//! notifications close to the moment each beat actually sounds. The
//! scheduler's timestamps stay authoritative; the notification delay only
//! lines the UI up with the audio.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::debug;

use super::scheduler::{Bpm, LookaheadScheduler, SchedulerState};

/// Receives beat numbers (1..=bar_length) as they arrive
pub type BeatSink = Arc<dyn Fn(u32) + Send + Sync>;

fn lock(scheduler: &Mutex<LookaheadScheduler>) -> MutexGuard<'_, LookaheadScheduler> {
    scheduler.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Tokio-driven metronome.
///
/// `start`, `resume` and `pause`/`stop` must be called from within a Tokio
/// runtime, since they spawn or cancel the polling task.
pub struct Metronome {
    scheduler: Arc<Mutex<LookaheadScheduler>>,
    // Bumped on every start/stop so pending notifications from an older
    // run are dropped instead of delivered.
    epoch: Arc<AtomicU64>,
    poller: Option<JoinHandle<()>>,
}

impl Metronome {
    /// Wrap a scheduler
    pub fn new(scheduler: LookaheadScheduler) -> Self {
        Self {
            scheduler: Arc::new(Mutex::new(scheduler)),
            epoch: Arc::new(AtomicU64::new(0)),
            poller: None,
        }
    }

    /// Shared handle to the underlying scheduler.
    ///
    /// `tick` may be called on it from any thread: notifications are
    /// spawned on the runtime that was current when `start` ran.
    pub fn scheduler(&self) -> Arc<Mutex<LookaheadScheduler>> {
        self.scheduler.clone()
    }

    /// Current lifecycle state
    pub fn phase(&self) -> SchedulerState {
        lock(&self.scheduler).phase()
    }

    /// Start a new bar at `tempo`, delivering beat numbers to `sink`
    pub fn start<F>(&mut self, tempo: Bpm, sink: F)
    where
        F: Fn(u32) + Send + Sync + 'static,
    {
        let sink: BeatSink = Arc::new(sink);
        let epoch = self.epoch.fetch_add(1, Ordering::AcqRel) + 1;
        let current = self.epoch.clone();
        let runtime = Handle::current();

        lock(&self.scheduler).start(tempo, move |beat| {
            let sink = sink.clone();
            let current = current.clone();
            let number = beat.beat;
            let delay = beat.notify_delay;
            runtime.spawn(async move {
                if !delay.is_zero() {
                    time::sleep(delay).await;
                }
                if current.load(Ordering::Acquire) == epoch {
                    sink(number);
                }
            });
        });

        self.spawn_poller();
    }

    /// Halt polling; the bar position is kept
    pub fn pause(&mut self) {
        lock(&self.scheduler).pause();
        self.cancel_poller();
    }

    /// Continue a paused bar
    pub fn resume(&mut self) {
        lock(&self.scheduler).resume();
        self.spawn_poller();
    }

    /// Halt polling, reset the bar and drop any undelivered notifications
    pub fn stop(&mut self) {
        lock(&self.scheduler).stop();
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.cancel_poller();
    }

    fn spawn_poller(&mut self) {
        let poll_interval = {
            let scheduler = lock(&self.scheduler);
            if scheduler.phase() != SchedulerState::Running {
                return;
            }
            scheduler.config().poll_interval
        };

        if self.poller.as_ref().is_some_and(|task| !task.is_finished()) {
            return;
        }

        let scheduler = self.scheduler.clone();
        self.poller = Some(tokio::spawn(async move {
            let mut ticker = time::interval(poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let running = {
                    let mut scheduler = lock(&scheduler);
                    if scheduler.phase() == SchedulerState::Running {
                        scheduler.tick();
                        true
                    } else {
                        false
                    }
                };
                if !running {
                    debug!("metronome poller exiting");
                    break;
                }
            }
        }));
    }

    fn cancel_poller(&mut self) {
        if let Some(task) = self.poller.take() {
            task.abort();
        }
    }
}

impl Drop for Metronome {
    fn drop(&mut self) {
        self.epoch.fetch_add(1, Ordering::AcqRel);
        self.cancel_poller();
    }
}
