// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Musical theory module.
//!
//! This module provides pitch classes, equal-temperament note mapping,
//! and the common note event shared by all inputs.

pub mod event;
pub mod note;

pub use event::{NoteEvent, NoteOrigin};
pub use note::{
    cents_between, frequency_to_note, note_to_frequency, NoteIdentity, PitchClass, A4_FREQUENCY,
};
