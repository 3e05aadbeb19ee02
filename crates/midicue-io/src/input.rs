//! MIDI input: opens one port and forwards every message to a handler.

use crate::error::Result;
use crate::ports::{select_port, PortSelector};
use midir::{Ignore, MidiInput, MidiInputConnection};
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct InputConfig {
    pub client_name: String,
    /// Port to connect to. `None` opens a virtual port where the platform
    /// supports one, otherwise the first physical port.
    pub port: Option<PortSelector>,
    /// Name of our side of the connection, and of the virtual port.
    pub port_name: String,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            client_name: "midicue".to_string(),
            port: None,
            port_name: "MIDI input".to_string(),
        }
    }
}

/// Turns midir's absolute microsecond stamps into inter-message deltas.
#[derive(Debug, Default)]
pub(crate) struct DeltaTracker {
    last: Option<u64>,
}

impl DeltaTracker {
    pub(crate) fn delta(&mut self, stamp: u64) -> Duration {
        let delta = self.last.map_or(0, |last| stamp.saturating_sub(last));
        self.last = Some(stamp);
        Duration::from_micros(delta)
    }
}

/// An open input port. Closing it (or dropping it) stops the handler.
pub struct InputHandle {
    connection: Option<MidiInputConnection<()>>,
    port_name: String,
    is_virtual: bool,
}

impl InputHandle {
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    pub fn is_virtual(&self) -> bool {
        self.is_virtual
    }

    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(connection) = self.connection.take() {
            connection.close();
            info!("Closed MIDI input '{}'", self.port_name);
        }
    }
}

impl Drop for InputHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Open the configured input and call `handler(raw, delta)` for every message.
///
/// SysEx, timing clock and active sensing are filtered out by midir before
/// they reach the handler.
pub fn open_input<F>(config: &InputConfig, mut handler: F) -> Result<InputHandle>
where
    F: FnMut(&[u8], Duration) + Send + 'static,
{
    let mut input = MidiInput::new(&config.client_name)?;
    input.ignore(Ignore::All);

    let mut deltas = DeltaTracker::default();
    let callback = move |stamp: u64, message: &[u8], _: &mut ()| {
        handler(message, deltas.delta(stamp));
    };

    let (connection, port_name, is_virtual) = match &config.port {
        Some(selector) => {
            let (port, name) = select_port(&input, selector, "input")?;
            let connection = input.connect(&port, &config.port_name, callback, ())?;
            (connection, name, false)
        }
        None => open_default(input, &config.port_name, callback)?,
    };

    info!(
        "Listening on MIDI input '{}'{}",
        port_name,
        if is_virtual { " (virtual)" } else { "" }
    );
    Ok(InputHandle {
        connection: Some(connection),
        port_name,
        is_virtual,
    })
}

#[cfg(unix)]
fn open_default<F>(
    input: MidiInput,
    port_name: &str,
    callback: F,
) -> Result<(MidiInputConnection<()>, String, bool)>
where
    F: FnMut(u64, &[u8], &mut ()) + Send + 'static,
{
    use midir::os::unix::VirtualInput;

    debug!("Creating virtual MIDI input '{}'", port_name);
    let connection = input.create_virtual(port_name, callback, ())?;
    Ok((connection, port_name.to_string(), true))
}

#[cfg(not(unix))]
fn open_default<F>(
    input: MidiInput,
    port_name: &str,
    callback: F,
) -> Result<(MidiInputConnection<()>, String, bool)>
where
    F: FnMut(u64, &[u8], &mut ()) + Send + 'static,
{
    debug!("No virtual ports on this platform, using the first input");
    let (port, name) = select_port(&input, &PortSelector::Index(0), "input")?;
    let connection = input.connect(&port, port_name, callback, ())?;
    Ok((connection, name, false))
}
