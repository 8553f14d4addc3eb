// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Equal-temperament note mapping.
//!
//! Converts between frequencies and note identities (pitch class + octave),
//! with A4 tuned to exactly 440 Hz. Microphone, keyboard and MIDI input all
//! resolve to the same [`NoteIdentity`] so consumers can treat them alike.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Concert pitch of A4 in Hz
pub const A4_FREQUENCY: f64 = 440.0;

/// Frequency of C0, 4.75 octaves (57 semitones) below A4
pub fn c0_frequency() -> f64 {
    A4_FREQUENCY * 2f64.powf(-4.75)
}

/// The twelve pitch classes, sharps only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PitchClass {
    C,
    Cs, // C#
    D,
    Ds, // D#
    E,
    F,
    Fs, // F#
    G,
    Gs, // G#
    A,
    As, // A#
    B,
}

impl PitchClass {
    /// All pitch classes in chromatic order starting at C
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::Cs,
        PitchClass::D,
        PitchClass::Ds,
        PitchClass::E,
        PitchClass::F,
        PitchClass::Fs,
        PitchClass::G,
        PitchClass::Gs,
        PitchClass::A,
        PitchClass::As,
        PitchClass::B,
    ];

    /// Semitones above C (0-11)
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Pitch class for a semitone offset from C; any integer wraps into 0-11
    pub fn from_index(index: i32) -> Self {
        Self::ALL[index.rem_euclid(12) as usize]
    }

    /// Canonical name ("C", "C#", ...)
    pub fn name(self) -> &'static str {
        match self {
            PitchClass::C => "C",
            PitchClass::Cs => "C#",
            PitchClass::D => "D",
            PitchClass::Ds => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::Fs => "F#",
            PitchClass::G => "G",
            PitchClass::Gs => "G#",
            PitchClass::A => "A",
            PitchClass::As => "A#",
            PitchClass::B => "B",
        }
    }

    /// Frequency of this pitch class in octave 4 (A4 = 440 Hz).
    ///
    /// Computed from the equal-temperament curve instead of a rounded
    /// lookup table, so C4 is 261.6256 Hz rather than 261.63 Hz.
    pub fn base_frequency(self) -> f64 {
        let semitones_from_a = self.index() as f64 - PitchClass::A.index() as f64;
        A4_FREQUENCY * 2f64.powf(semitones_from_a / 12.0)
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error parsing a pitch class name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown pitch class: {0:?}")]
pub struct ParsePitchClassError(String);

impl FromStr for PitchClass {
    type Err = ParsePitchClassError;

    /// Accepts sharps and flats ("C#", "Db", "cs")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        match upper.as_str() {
            "C" | "B#" | "BS" => Ok(PitchClass::C),
            "C#" | "CS" | "DB" => Ok(PitchClass::Cs),
            "D" => Ok(PitchClass::D),
            "D#" | "DS" | "EB" => Ok(PitchClass::Ds),
            "E" | "FB" => Ok(PitchClass::E),
            "F" | "E#" | "ES" => Ok(PitchClass::F),
            "F#" | "FS" | "GB" => Ok(PitchClass::Fs),
            "G" => Ok(PitchClass::G),
            "G#" | "GS" | "AB" => Ok(PitchClass::Gs),
            "A" => Ok(PitchClass::A),
            "A#" | "AS" | "BB" => Ok(PitchClass::As),
            "B" | "CB" => Ok(PitchClass::B),
            _ => Err(ParsePitchClassError(s.to_string())),
        }
    }
}

/// A note resolved from a frequency or a MIDI note number.
///
/// Always derived: from a frequency ([`frequency_to_note`]), a key
/// ([`NoteIdentity::nominal`]) or a MIDI note number
/// ([`NoteIdentity::from_midi`]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoteIdentity {
    pitch_class: PitchClass,
    octave: i32,
    frequency: f64,
}

impl NoteIdentity {
    /// Pitch class
    pub fn pitch_class(&self) -> PitchClass {
        self.pitch_class
    }

    /// Octave number (C4 is middle C)
    pub fn octave(&self) -> i32 {
        self.octave
    }

    /// The frequency this identity was derived from, in Hz
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Exact equal-temperament frequency of the note itself
    pub fn nominal_frequency(&self) -> f64 {
        note_to_frequency(self.pitch_class, self.octave)
    }

    /// Deviation of [`frequency`](Self::frequency) from the nominal pitch, in cents
    pub fn cents_offset(&self) -> f64 {
        cents_between(self.frequency, self.nominal_frequency())
    }

    /// The note at its exact equal-temperament frequency
    pub fn nominal(pitch_class: PitchClass, octave: i32) -> Self {
        Self {
            pitch_class,
            octave,
            frequency: note_to_frequency(pitch_class, octave),
        }
    }

    /// Map a MIDI note number (60 = C4) to a note
    pub fn from_midi(note: u8) -> Self {
        Self::nominal(
            PitchClass::from_index(i32::from(note % 12)),
            i32::from(note / 12) - 1,
        )
    }
}

impl fmt::Display for NoteIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class, self.octave)
    }
}

/// Nearest equal-temperament note to `frequency`.
///
/// Returns `None` for frequencies that are not finite and positive.
pub fn frequency_to_note(frequency: f64) -> Option<NoteIdentity> {
    if !frequency.is_finite() || frequency <= 0.0 {
        return None;
    }

    let half_steps = (12.0 * (frequency / c0_frequency()).log2()).round() as i32;
    Some(NoteIdentity {
        pitch_class: PitchClass::from_index(half_steps),
        octave: half_steps.div_euclid(12),
        frequency,
    })
}

/// Equal-temperament frequency of `pitch_class` in `octave`
pub fn note_to_frequency(pitch_class: PitchClass, octave: i32) -> f64 {
    pitch_class.base_frequency() * 2f64.powi(octave - 4)
}

/// Interval from `reference` to `frequency` in cents (positive = sharp)
pub fn cents_between(frequency: f64, reference: f64) -> f64 {
    1200.0 * (frequency / reference).log2()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_a4_is_440() {
        let note = frequency_to_note(440.0).unwrap();
        assert_eq!(note.pitch_class(), PitchClass::A);
        assert_eq!(note.octave(), 4);
        assert_eq!(note.frequency(), 440.0);
        assert!((note_to_frequency(PitchClass::A, 4) - 440.0).abs() < 1e-6);
    }

    #[test]
    fn test_middle_c() {
        let note = frequency_to_note(261.63).unwrap();
        assert_eq!(note.pitch_class(), PitchClass::C);
        assert_eq!(note.octave(), 4);
        assert_eq!(note.to_string(), "C4");
    }

    #[test]
    fn test_octave_boundaries() {
        // B3 and C4 sit either side of the octave change
        let b3 = frequency_to_note(246.94).unwrap();
        assert_eq!((b3.pitch_class(), b3.octave()), (PitchClass::B, 3));

        let a0 = frequency_to_note(27.5).unwrap();
        assert_eq!((a0.pitch_class(), a0.octave()), (PitchClass::A, 0));
    }

    #[test]
    fn test_negative_half_steps_wrap() {
        // Below C0 the half-step count is negative
        let note = frequency_to_note(c0_frequency() / 2f64.powf(1.0 / 12.0)).unwrap();
        assert_eq!(note.pitch_class(), PitchClass::B);
        assert_eq!(note.octave(), -1);
    }

    #[test]
    fn test_rejects_invalid_frequency() {
        assert!(frequency_to_note(0.0).is_none());
        assert!(frequency_to_note(-440.0).is_none());
        assert!(frequency_to_note(f64::NAN).is_none());
        assert!(frequency_to_note(f64::INFINITY).is_none());
    }

    #[test]
    fn test_round_trip_every_table_entry() {
        for octave in -1..=8 {
            for pitch_class in PitchClass::ALL {
                let note = frequency_to_note(note_to_frequency(pitch_class, octave)).unwrap();
                assert_eq!(
                    (note.pitch_class(), note.octave()),
                    (pitch_class, octave),
                    "round trip failed for {}{}",
                    pitch_class,
                    octave
                );
            }
        }
    }

    #[test]
    fn test_base_frequencies() {
        assert!((PitchClass::C.base_frequency() - 261.6256).abs() < 1e-3);
        assert!((PitchClass::B.base_frequency() - 493.8833).abs() < 1e-3);
        assert_eq!(PitchClass::A.base_frequency(), 440.0);
        // Exact curve, not the two-decimal table value
        assert!((PitchClass::C.base_frequency() - 261.63).abs() > 1e-3);
    }

    #[test]
    fn test_pitch_class_names() {
        let names: Vec<&str> = PitchClass::ALL.iter().map(|pc| pc.name()).collect();
        assert_eq!(
            names,
            vec!["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"]
        );
        for (i, pc) in PitchClass::ALL.iter().enumerate() {
            assert_eq!(pc.index() as usize, i);
        }
    }

    #[test]
    fn test_parse_pitch_class() {
        assert_eq!("C".parse::<PitchClass>(), Ok(PitchClass::C));
        assert_eq!("c#".parse::<PitchClass>(), Ok(PitchClass::Cs));
        assert_eq!("Db".parse::<PitchClass>(), Ok(PitchClass::Cs));
        assert_eq!(" Bb ".parse::<PitchClass>(), Ok(PitchClass::As));
        assert!("H".parse::<PitchClass>().is_err());
    }

    #[test]
    fn test_parse_error_message() {
        let err = "H".parse::<PitchClass>().unwrap_err();
        assert_eq!(err.to_string(), "unknown pitch class: \"H\"");

        let boxed: Box<dyn std::error::Error + Send + Sync> = Box::new(err);
        assert_eq!(boxed.to_string(), "unknown pitch class: \"H\"");
    }

    #[test]
    fn test_from_midi() {
        let middle_c = NoteIdentity::from_midi(60);
        assert_eq!(middle_c.to_string(), "C4");

        let a4 = NoteIdentity::from_midi(69);
        assert_eq!((a4.pitch_class(), a4.octave()), (PitchClass::A, 4));
        assert!((a4.frequency() - 440.0).abs() < 1e-9);

        let lowest = NoteIdentity::from_midi(0);
        assert_eq!((lowest.pitch_class(), lowest.octave()), (PitchClass::C, -1));
    }

    #[test]
    fn test_midi_and_microphone_agree() {
        for midi in 21..=108u8 {
            let from_midi = NoteIdentity::from_midi(midi);
            let from_mic = frequency_to_note(from_midi.frequency()).unwrap();
            assert_eq!(from_mic.pitch_class(), from_midi.pitch_class());
            assert_eq!(from_mic.octave(), from_midi.octave());
        }
    }

    #[test]
    fn test_cents_offset() {
        let sharp = frequency_to_note(445.0).unwrap();
        assert_eq!(sharp.pitch_class(), PitchClass::A);
        assert!((sharp.cents_offset() - 19.56).abs() < 0.01);

        let exact = frequency_to_note(440.0).unwrap();
        assert!(exact.cents_offset().abs() < 1e-9);
    }
}
