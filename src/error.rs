//! Centralized error type for the midicue crate.
//!
//! Wraps the subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Rules(#[from] midicue_core::Error),

    #[error("MIDI: {0}")]
    Midi(#[from] midicue_io::Error),

    #[error("Signal handler: {0}")]
    Signal(#[from] ctrlc::Error),

    #[error("Dispatch worker: {0}")]
    Worker(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
