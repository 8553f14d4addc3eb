// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Error types for DRILL.

use thiserror::Error;

/// Validation errors raised by the library.
///
/// The metronome and pitch core never raise these for expected runtime
/// conditions (silence, paused playback, missing clock); they only guard
/// values handed in by the caller.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// Tempo must be a finite number of beats per minute above zero
    #[error("invalid tempo {0} BPM: tempo must be finite and greater than zero")]
    InvalidTempo(f64),

    /// A bar needs at least one beat
    #[error("invalid bar length {0}: a bar needs at least one beat")]
    InvalidBarLength(u32),

    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias for library operations
pub type Result<T> = std::result::Result<T, Error>;
