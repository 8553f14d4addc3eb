// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Notes played into the practice session, whatever the input.

use std::fmt;

use serde::Serialize;

use super::note::{NoteIdentity, PitchClass};
use crate::midi::MidiMessage;

/// Where a played note came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteOrigin {
    /// On-screen or computer keyboard
    Keyboard,
    /// Detected from the microphone
    Microphone,
    /// MIDI note-on
    Midi,
}

/// A note played by the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NoteEvent {
    pub origin: NoteOrigin,
    pub note: NoteIdentity,
}

impl NoteEvent {
    /// A key pressed on the on-screen keyboard
    pub fn keyboard(pitch_class: PitchClass, octave: i32) -> Self {
        Self {
            origin: NoteOrigin::Keyboard,
            note: NoteIdentity::nominal(pitch_class, octave),
        }
    }

    /// A note published by the pitch tracker
    pub fn microphone(note: NoteIdentity) -> Self {
        Self {
            origin: NoteOrigin::Microphone,
            note,
        }
    }

    /// A MIDI note-on; other messages yield `None`
    pub fn midi(message: &MidiMessage) -> Option<Self> {
        message.note_on().map(|note| Self {
            origin: NoteOrigin::Midi,
            note,
        })
    }

    /// Whether two events name the same key, ignoring origin and tuning
    pub fn same_note(&self, other: &NoteEvent) -> bool {
        self.note.pitch_class() == other.note.pitch_class()
            && self.note.octave() == other.note.octave()
    }
}

impl fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.note, self.origin)
    }
}
