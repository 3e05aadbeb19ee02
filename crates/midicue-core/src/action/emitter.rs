//! Sends resolved translation templates through an [`OutputPort`].

use super::{OutputPort, PortConnection};
use crate::error::EmitError;
use crate::event::Event;
use crate::template::OutputTemplate;
use std::thread;
use std::time::Duration;
use tracing::trace;

/// Pause between consecutive messages of one emission.
pub const DEFAULT_MESSAGE_GAP: Duration = Duration::from_millis(1);

pub struct OutputEmitter<P> {
    port: P,
    gap: Duration,
}

impl<P: OutputPort> OutputEmitter<P> {
    pub fn new(port: P) -> Self {
        Self {
            port,
            gap: DEFAULT_MESSAGE_GAP,
        }
    }

    pub fn with_gap(mut self, gap: Duration) -> Self {
        self.gap = gap;
        self
    }

    pub fn port(&self) -> &P {
        &self.port
    }

    /// Resolve `template` against `event` and send it. Returns the number of
    /// messages sent.
    ///
    /// Nothing is acquired when the template cannot be resolved. The port
    /// connection is dropped, and so released, on every return path.
    pub fn emit(&mut self, template: &OutputTemplate, event: &Event) -> Result<usize, EmitError> {
        let messages = template.render(event)?;

        let mut connection = self.port.acquire()?;
        for (i, message) in messages.iter().enumerate() {
            if i > 0 && !self.gap.is_zero() {
                thread::sleep(self.gap);
            }
            trace!("Sending {:02X?}", message.as_slice());
            connection.send(message)?;
        }
        Ok(messages.len())
    }
}
