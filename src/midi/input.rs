// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Parsing incoming MIDI bytes into note events.

use super::messages;
use crate::music::note::NoteIdentity;

/// The parts of a MIDI stream note input cares about
#[derive(Debug, Clone, PartialEq)]
pub enum MidiMessage {
    /// Note On: channel (0-15), note (0-127), velocity (1-127)
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note Off: channel (0-15), note (0-127), velocity (0-127)
    NoteOff { channel: u8, note: u8, velocity: u8 },
    /// Control Change: channel (0-15), controller (0-127), value (0-127)
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Anything else, kept raw
    Other(Vec<u8>),
}

impl MidiMessage {
    /// Parse one complete MIDI message
    pub fn parse(data: &[u8]) -> Option<Self> {
        let (&status, rest) = data.split_first()?;
        let channel = status & messages::CHANNEL_MASK;

        match (status & messages::STATUS_MASK, rest) {
            (messages::NOTE_ON, &[note, velocity, ..]) => {
                let note = note & messages::DATA_MASK;
                let velocity = velocity & messages::DATA_MASK;
                // Note On with velocity 0 is a Note Off
                if velocity == 0 {
                    Some(MidiMessage::NoteOff { channel, note, velocity })
                } else {
                    Some(MidiMessage::NoteOn { channel, note, velocity })
                }
            }
            (messages::NOTE_OFF, &[note, velocity, ..]) => Some(MidiMessage::NoteOff {
                channel,
                note: note & messages::DATA_MASK,
                velocity: velocity & messages::DATA_MASK,
            }),
            (messages::CONTROL_CHANGE, &[controller, value, ..]) => {
                Some(MidiMessage::ControlChange {
                    channel,
                    controller: controller & messages::DATA_MASK,
                    value: value & messages::DATA_MASK,
                })
            }
            _ => Some(MidiMessage::Other(data.to_vec())),
        }
    }

    /// The note struck by a Note On, if this is one
    pub fn note_on(&self) -> Option<NoteIdentity> {
        match self {
            MidiMessage::NoteOn { note, .. } => Some(NoteIdentity::from_midi(*note)),
            _ => None,
        }
    }
}
