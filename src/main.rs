// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

use std::env;
use std::f32::consts::PI;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use drill::config::DrillConfig;
use drill::midi::MidiMessage;
use drill::music::{note_to_frequency, NoteEvent, NoteIdentity, PitchClass};
use drill::pitch::{SampleSource, SampleWindow};
use drill::timing::{Bpm, LookaheadScheduler, Metronome, SystemClock};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn print_usage() {
    println!("DRILL - Practice metronome and pitch detector");
    println!();
    println!("Usage: drill [--config <PATH>] <COMMAND>");
    println!();
    println!("Commands:");
    println!("  --metronome [BPM] [BARS]     Run the metronome (default: config tempo, 2 bars)");
    println!("  --detect <HZ> [WINDOWS]      Detect the note of a synthetic tone");
    println!("  --note <NAME> <OCTAVE>       Print the frequency of a note (e.g. --note A 4)");
    println!("  --midi <STATUS> <NOTE> <VEL> Resolve a raw MIDI message to a note");
    println!("  --print-config               Print the active configuration as YAML");
    println!("  --help                       Show this help message");
}

/// Emits copies of a sine window, then ends
struct ToneSource {
    window: SampleWindow,
    remaining: usize,
}

impl ToneSource {
    fn new(frequency: f32, size: usize, sample_rate: u32, count: usize) -> Self {
        let samples: Vec<f32> = (0..size)
            .map(|i| 0.6 * (2.0 * PI * frequency * i as f32 / sample_rate as f32).sin())
            .collect();
        Self {
            window: SampleWindow::new(samples, sample_rate),
            remaining: count,
        }
    }
}

impl SampleSource for ToneSource {
    fn next_window(&mut self) -> Option<SampleWindow> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.window.clone())
    }
}

fn parse_arg<T: std::str::FromStr>(args: &[String], index: usize, what: &str) -> Result<Option<T>> {
    match args.get(index) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("Invalid {}: {}", what, raw)),
        None => Ok(None),
    }
}

/// Total beats in `bars` bars, rejecting counts that do not fit
fn beat_count(bars: u32, bar_length: u32) -> Result<u32> {
    match bars.checked_mul(bar_length) {
        Some(beats) => Ok(beats),
        None => bail!("Too many bars: {} bars of {} beats", bars, bar_length),
    }
}

async fn run_metronome(config: &DrillConfig, bpm: Option<f64>, bars: u32) -> Result<()> {
    let tempo = match bpm {
        Some(bpm) => Bpm::new(bpm)?,
        None => config.metronome.bpm()?,
    };
    let scheduler_config = config.metronome.scheduler_config()?;
    let beats = beat_count(bars, scheduler_config.bar_length())?;
    let run_time = scheduler_config.start_delay
        + f64::from(beats) * tempo.beat_interval()
        - tempo.beat_interval() / 2.0;

    let clock = Arc::new(SystemClock::new());
    let mut metronome = Metronome::new(LookaheadScheduler::with_clock(clock, scheduler_config));

    println!(
        "Metronome at {} BPM for {} bars (press Ctrl+C to stop)...",
        tempo.get(),
        bars
    );
    metronome.start(tempo, |beat| {
        if beat == 1 {
            println!("Beat {} *", beat);
        } else {
            println!("Beat {}", beat);
        }
    });

    tokio::select! {
        _ = tokio::time::sleep(Duration::from_secs_f64(run_time.max(0.0))) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted");
        }
    }

    metronome.stop();
    println!("Metronome stopped");
    Ok(())
}

fn detect(config: &DrillConfig, frequency: f32, windows: usize) -> Result<()> {
    let pitch = &config.pitch;
    let mut source = ToneSource::new(frequency, pitch.window_size, pitch.sample_rate, windows);
    let mut tracker = pitch.tracker();
    tracker.on_note(|note| {
        println!(
            "Detected {} at {:.2} Hz ({:+.1} cents)",
            NoteEvent::microphone(*note),
            note.frequency(),
            note.cents_offset()
        );
    });

    tracker.start();
    let processed = tracker.run(&mut source);
    tracker.stop();

    if processed == 0 {
        bail!("No windows were analysed");
    }
    info!(processed, "detection complete");
    Ok(())
}

fn print_note(name: &str, octave: i32) -> Result<()> {
    let pitch_class: PitchClass = name.parse()?;
    let note = NoteIdentity::nominal(pitch_class, octave);
    println!("{} = {:.2} Hz", note, note_to_frequency(pitch_class, octave));
    Ok(())
}

fn resolve_midi(bytes: &[u8]) -> Result<()> {
    let message = MidiMessage::parse(bytes).ok_or_else(|| anyhow!("Empty MIDI message"))?;
    match NoteEvent::midi(&message) {
        Some(event) => println!("{} = {:.2} Hz", event, event.note.frequency()),
        None => println!("Not a note-on: {:?}", message),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut args: Vec<String> = env::args().collect();

    let config = if args.get(1).map(String::as_str) == Some("--config") {
        let path = args
            .get(2)
            .cloned()
            .ok_or_else(|| anyhow!("--config requires a path"))?;
        args.drain(1..3);
        info!(%path, "loading configuration");
        DrillConfig::load(&path)?
    } else {
        DrillConfig::default()
    };

    if args.len() < 2 {
        println!("DRILL - Practice metronome and pitch detector");
        println!("Run with --help for usage information");
        return Ok(());
    }

    match args[1].as_str() {
        "--metronome" => {
            let bpm = parse_arg::<f64>(&args, 2, "tempo")?;
            let bars = parse_arg::<u32>(&args, 3, "bar count")?.unwrap_or(2);
            run_metronome(&config, bpm, bars).await?;
        }
        "--detect" => {
            let frequency = parse_arg::<f32>(&args, 2, "frequency")?
                .ok_or_else(|| anyhow!("--detect requires a frequency in Hz"))?;
            let windows = parse_arg::<usize>(&args, 3, "window count")?.unwrap_or(1);
            detect(&config, frequency, windows)?;
        }
        "--note" => {
            let name = args
                .get(2)
                .ok_or_else(|| anyhow!("--note requires a note name"))?;
            let octave = parse_arg::<i32>(&args, 3, "octave")?.unwrap_or(4);
            print_note(name, octave)?;
        }
        "--midi" => {
            let bytes = args[2..]
                .iter()
                .map(|raw| {
                    raw.parse::<u8>()
                        .map_err(|_| anyhow!("Invalid MIDI byte: {}", raw))
                })
                .collect::<Result<Vec<u8>>>()?;
            resolve_midi(&bytes)?;
        }
        "--print-config" => {
            print!("{}", config.to_yaml()?);
        }
        "--help" | "-h" => {
            print_usage();
        }
        _ => {
            eprintln!("Unknown option: {}", args[1]);
            print_usage();
            std::process::exit(1);
        }
    }

    Ok(())
}
