// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! MIDI note input.
//!
//! Device access lives outside this crate; whatever backend delivers raw
//! bytes hands them to [`MidiMessage::parse`], and note-ons resolve to the
//! same [`NoteIdentity`](crate::music::NoteIdentity) the pitch tracker
//! produces.

pub mod input;

pub use input::MidiMessage;

/// MIDI status bytes
pub mod messages {
    // Channel Voice Messages (upper nibble, lower nibble is channel 0-15)
    pub const NOTE_OFF: u8 = 0x80;
    pub const NOTE_ON: u8 = 0x90;
    pub const CONTROL_CHANGE: u8 = 0xB0;

    /// Mask selecting the message type from a status byte
    pub const STATUS_MASK: u8 = 0xF0;
    /// Mask selecting the channel from a status byte
    pub const CHANNEL_MASK: u8 = 0x0F;
    /// Mask for 7-bit data bytes
    pub const DATA_MASK: u8 = 0x7F;
}
