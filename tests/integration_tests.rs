// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Integration tests for DRILL
//!
//! These tests verify that multiple components work together correctly.

use std::collections::VecDeque;
use std::f32::consts::PI;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use drill::config::DrillConfig;
use drill::midi::MidiMessage;
use drill::music::{frequency_to_note, note_to_frequency, NoteEvent, NoteOrigin, PitchClass};
use drill::pitch::{estimate_pitch, PitchTracker, SampleWindow};
use drill::timing::{
    Bpm, ClockSource, LookaheadScheduler, ManualClock, Metronome, SchedulerConfig,
    SchedulerState, SystemClock,
};

fn sine(frequency: f32, sample_rate: u32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 * (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin())
        .collect()
}

fn manual_scheduler(start: f64) -> (Arc<ManualClock>, LookaheadScheduler) {
    let clock = Arc::new(ManualClock::new(start));
    let scheduler = LookaheadScheduler::with_clock(clock.clone(), SchedulerConfig::default());
    (clock, scheduler)
}

/// Beats stay on the tempo grid however jittery the poll is
#[test]
fn test_no_drift_under_jittery_polling() {
    let (clock, mut scheduler) = manual_scheduler(10.0);
    let times = Arc::new(Mutex::new(Vec::new()));
    let sink = times.clone();
    scheduler.start(Bpm::new(120.0).unwrap(), move |beat| {
        sink.lock().unwrap().push(beat.time)
    });

    // Irregular poll gaps between 5 and 45 ms, for about 30 seconds
    let gaps = [0.005, 0.045, 0.012, 0.031, 0.025, 0.040, 0.018];
    let mut i = 0;
    while clock.now() < 40.0 {
        clock.advance(gaps[i % gaps.len()]);
        scheduler.tick();
        i += 1;
    }

    let times = times.lock().unwrap();
    assert!(times.len() > 50);
    for (n, time) in times.iter().enumerate() {
        let expected = 10.1 + n as f64 * 0.5;
        assert!(
            (time - expected).abs() < 1e-6,
            "beat {} at {} expected {}",
            n,
            time,
            expected
        );
    }
}

/// Beat numbers cycle through the bar in order and never skip
#[test]
fn test_beat_numbers_cycle_through_bar() {
    let clock = Arc::new(ManualClock::new(0.0));
    let config = SchedulerConfig::default().with_bar_length(3).unwrap();
    let mut scheduler = LookaheadScheduler::with_clock(clock.clone(), config);
    scheduler.start(Bpm::new(240.0).unwrap(), |_| {});

    let mut beats = Vec::new();
    for _ in 0..120 {
        clock.advance(0.025);
        beats.extend(scheduler.tick().into_iter().map(|b| b.beat));
    }

    assert!(beats.len() >= 10);
    for (n, beat) in beats.iter().enumerate() {
        assert_eq!(*beat as usize, n % 3 + 1);
    }
}

/// Pause, resume and stop follow the lifecycle
#[test]
fn test_scheduler_lifecycle() {
    let (clock, mut scheduler) = manual_scheduler(0.0);
    assert_eq!(scheduler.phase(), SchedulerState::Idle);

    scheduler.start(Bpm::new(60.0).unwrap(), |_| {});
    clock.set(0.05);
    assert_eq!(scheduler.tick().len(), 1);
    assert_eq!(scheduler.phase(), SchedulerState::Running);

    scheduler.pause();
    assert_eq!(scheduler.phase(), SchedulerState::Paused);
    clock.set(5.0);
    assert!(scheduler.tick().is_empty());

    scheduler.resume();
    clock.set(5.05);
    let beats = scheduler.tick();
    assert_eq!(beats.len(), 1);
    assert_eq!(beats[0].beat, 2);
    assert!((beats[0].time - 5.1).abs() < 1e-9);

    scheduler.stop();
    assert_eq!(scheduler.phase(), SchedulerState::Idle);
    assert_eq!(scheduler.state().beat_counter, 0);
}

/// Without a clock, nothing happens and nothing panics
#[test]
fn test_scheduler_without_clock() {
    let mut scheduler = LookaheadScheduler::new(SchedulerConfig::default());
    scheduler.start(Bpm::default(), |_| panic!("no beats expected"));
    assert!(scheduler.tick().is_empty());
    scheduler.pause();
    scheduler.resume();
    scheduler.stop();
    assert_eq!(scheduler.phase(), SchedulerState::Idle);
}

/// Audio window to note name
#[test]
fn test_pitch_to_note_pipeline() {
    let cases = [
        (82.41f32, PitchClass::E, 2),
        (110.0, PitchClass::A, 2),
        (196.0, PitchClass::G, 3),
        (261.63, PitchClass::C, 4),
        (440.0, PitchClass::A, 4),
        (659.26, PitchClass::E, 5),
    ];

    for (frequency, pitch_class, octave) in cases {
        let samples = sine(frequency, 44_100, 2048);
        let hz = estimate_pitch(&samples, 44_100)
            .frequency()
            .unwrap_or_else(|| panic!("no pitch for {} Hz", frequency));
        let note = frequency_to_note(hz).unwrap();
        assert_eq!(
            (note.pitch_class(), note.octave()),
            (pitch_class, octave),
            "{} Hz detected as {}",
            frequency,
            note
        );
    }
}

/// Tracker fed from a queue publishes only real notes
#[test]
fn test_tracker_publishes_events() {
    let config = DrillConfig::default();
    let mut tracker: PitchTracker = config.pitch.tracker();

    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    tracker.on_note(move |note| sink.lock().unwrap().push(NoteEvent::microphone(*note)));

    let mut source: VecDeque<SampleWindow> = vec![
        SampleWindow::new(sine(440.0, 44_100, 2048), 44_100),
        SampleWindow::new(vec![0.0f32; 2048], 44_100),
        SampleWindow::new(sine(30.0, 44_100, 8192), 44_100),
        SampleWindow::new(sine(329.63, 44_100, 2048), 44_100),
    ]
    .into();

    tracker.start();
    assert_eq!(tracker.run(&mut source), 4);

    let events = events.lock().unwrap();
    let names: Vec<String> = events.iter().map(|e| e.note.to_string()).collect();
    assert_eq!(names, vec!["A4", "E4"]);
    assert!(events.iter().all(|e| e.origin == NoteOrigin::Microphone));
}

/// Microphone, keyboard and MIDI resolve to the same note
#[test]
fn test_inputs_agree_on_note() {
    let samples = sine(261.63, 44_100, 2048);
    let hz = estimate_pitch(&samples, 44_100).frequency().unwrap();
    let mic = NoteEvent::microphone(frequency_to_note(hz).unwrap());

    let keyboard = NoteEvent::keyboard(PitchClass::C, 4);
    let midi = NoteEvent::midi(&MidiMessage::parse(&[0x90, 60, 100]).unwrap()).unwrap();

    assert!(mic.same_note(&keyboard));
    assert!(mic.same_note(&midi));
    assert_eq!(midi.origin, NoteOrigin::Midi);
}

/// Every table note survives the frequency round trip
#[test]
fn test_note_round_trip() {
    for octave in 0..=8 {
        for pitch_class in PitchClass::ALL {
            let note = frequency_to_note(note_to_frequency(pitch_class, octave)).unwrap();
            assert_eq!((note.pitch_class(), note.octave()), (pitch_class, octave));
        }
    }
}

/// Config file drives both the scheduler and the tracker
#[test]
fn test_config_file_drives_components() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drill.toml");
    std::fs::write(
        &path,
        "[metronome]\ntempo = 90.0\nbar_length = 3\n\n[pitch]\nmax_frequency = 400.0\n",
    )
    .unwrap();

    let config = DrillConfig::load(&path).unwrap();
    let scheduler_config = config.metronome.scheduler_config().unwrap();
    assert_eq!(scheduler_config.bar_length(), 3);
    assert!((config.metronome.bpm().unwrap().beat_interval() - 60.0 / 90.0).abs() < 1e-12);

    let mut tracker = config.pitch.tracker();
    assert!(tracker
        .process(&SampleWindow::new(sine(440.0, 44_100, 2048), 44_100))
        .is_none());
    assert!(tracker
        .process(&SampleWindow::new(sine(220.0, 44_100, 2048), 44_100))
        .is_some());
}

/// Invalid config files are rejected on load
#[test]
fn test_invalid_config_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("drill.yaml");
    std::fs::write(&path, "metronome:\n  tempo: -5\n").unwrap();

    let err = DrillConfig::load(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("invalid tempo"));
}

/// Real-time metronome delivers a full bar in order
#[tokio::test]
async fn test_metronome_real_time_bar() {
    let mut config = SchedulerConfig::default();
    config.start_delay = 0.02;
    let clock = Arc::new(SystemClock::new());
    let mut metronome = Metronome::new(LookaheadScheduler::with_clock(clock, config));

    let beats = Arc::new(Mutex::new(Vec::new()));
    let sink = beats.clone();
    metronome.start(Bpm::new(600.0).unwrap(), move |beat: u32| {
        sink.lock().unwrap().push(beat)
    });

    // 0.02 s delay + four beats at 0.1 s, with headroom
    tokio::time::sleep(Duration::from_millis(450)).await;
    metronome.stop();

    let beats = beats.lock().unwrap();
    assert!(beats.len() >= 4, "got {:?}", *beats);
    assert_eq!(&beats[..4], &[1, 2, 3, 4]);
}
