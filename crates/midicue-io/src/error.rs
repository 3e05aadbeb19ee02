//! Error types for the MIDI transport.

use crate::backend::Backend;
use midicue_core::PortError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("MIDI device error: {0}")]
    MidiDevice(String),

    #[error("MIDI port error: {0}")]
    MidiPort(String),

    #[error("No MIDI {direction} port matching '{selector}'")]
    PortNotFound {
        direction: &'static str,
        selector: String,
    },

    #[error("Backend '{requested}' is not available; this build uses '{compiled}'")]
    BackendUnavailable { requested: Backend, compiled: Backend },

    #[error("Unknown backend '{0}' (expected alsa, jack, coremidi or windowsmm)")]
    UnknownBackend(String),
}

impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::MidiDevice(e.to_string())
    }
}

impl From<midir::ConnectError<midir::MidiOutput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiOutput>) -> Self {
        Error::MidiPort(e.to_string())
    }
}

impl From<midir::ConnectError<midir::MidiInput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiInput>) -> Self {
        Error::MidiPort(e.to_string())
    }
}

impl From<Error> for PortError {
    fn from(e: Error) -> Self {
        PortError::Unavailable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
