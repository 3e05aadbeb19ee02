//! The two action paths: external commands and outbound MIDI.

mod emitter;
mod process;

pub use emitter::{OutputEmitter, DEFAULT_MESSAGE_GAP};
pub use process::ProcessLauncher;

use crate::error::{ExecError, PortError};

/// Runs a rendered command line without waiting for it.
pub trait CommandRunner: Send {
    fn execute(&mut self, command_line: &str) -> Result<(), ExecError>;
}

/// An output port that is opened for each emission and released afterwards.
pub trait OutputPort: Send {
    /// Open connection. Dropping it releases the port.
    type Connection: PortConnection;

    fn acquire(&mut self) -> Result<Self::Connection, PortError>;
}

pub trait PortConnection {
    fn send(&mut self, message: &[u8]) -> Result<(), PortError>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for Box<R> {
    fn execute(&mut self, command_line: &str) -> Result<(), ExecError> {
        (**self).execute(command_line)
    }
}
