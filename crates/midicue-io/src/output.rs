//! MIDI output port opened per emission.

use crate::error::Error;
use crate::ports::{select_port, PortSelector};
use midicue_core::{OutputPort, PortConnection, PortError};
use midir::{MidiOutput, MidiOutputConnection};
use tracing::debug;

/// Connects to the selected output on every [`OutputPort::acquire`].
#[derive(Debug, Clone)]
pub struct MidirOutputPort {
    client_name: String,
    selector: PortSelector,
}

impl MidirOutputPort {
    pub fn new(client_name: impl Into<String>, selector: PortSelector) -> Self {
        Self {
            client_name: client_name.into(),
            selector,
        }
    }

    pub fn selector(&self) -> &PortSelector {
        &self.selector
    }
}

impl OutputPort for MidirOutputPort {
    type Connection = ScopedOutput;

    fn acquire(&mut self) -> Result<ScopedOutput, PortError> {
        let output = MidiOutput::new(&self.client_name).map_err(Error::from)?;
        let (port, port_name) = select_port(&output, &self.selector, "output")?;
        let connection = output
            .connect(&port, "midicue-output")
            .map_err(Error::from)?;

        debug!("Opened MIDI output '{}'", port_name);
        Ok(ScopedOutput {
            connection: Some(connection),
            port_name,
        })
    }
}

/// An open output connection, closed when dropped.
pub struct ScopedOutput {
    connection: Option<MidiOutputConnection>,
    port_name: String,
}

impl ScopedOutput {
    pub fn port_name(&self) -> &str {
        &self.port_name
    }
}

impl PortConnection for ScopedOutput {
    fn send(&mut self, message: &[u8]) -> Result<(), PortError> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| PortError::Unavailable(self.port_name.clone()))?;
        connection
            .send(message)
            .map_err(|e| PortError::Send(format!("{}: {}", self.port_name, e)))
    }
}

impl Drop for ScopedOutput {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
            debug!("Closed MIDI output '{}'", self.port_name);
        }
    }
}
