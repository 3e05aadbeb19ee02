//! Dispatch on a dedicated thread.
//!
//! The MIDI input callback only enqueues; a single consumer owns the
//! [`Dispatcher`] so events are handled strictly in arrival order and slow
//! actions never stall the driver thread.

use crate::error::{Error, Result};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use midicue_core::{CommandRunner, DispatchStats, Dispatcher, OutputPort};
use smallvec::SmallVec;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub bytes: SmallVec<[u8; 3]>,
    pub delta: Duration,
}

/// Cloneable producer side of the queue, handed to the input callback.
#[derive(Clone)]
pub struct WorkerSender {
    sender: Sender<InboundMessage>,
}

impl WorkerSender {
    /// Enqueue without blocking. Returns `false` if the message was dropped.
    pub fn submit(&self, raw: &[u8], delta: Duration) -> bool {
        let message = InboundMessage {
            bytes: SmallVec::from_slice(raw),
            delta,
        };
        match self.sender.try_send(message) {
            Ok(()) => true,
            Err(TrySendError::Full(message)) => {
                debug!("Dispatch queue full, dropping {:02X?}", message.bytes.as_slice());
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                debug!("Dispatch worker stopped, dropping message");
                false
            }
        }
    }
}

pub struct DispatchWorker {
    sender: WorkerSender,
    thread: JoinHandle<DispatchStats>,
}

impl DispatchWorker {
    pub fn spawn<R, P>(dispatcher: Dispatcher<R, P>, capacity: usize) -> Result<Self>
    where
        R: CommandRunner + 'static,
        P: OutputPort + 'static,
    {
        let (sender, receiver) = bounded(capacity.max(1));

        let thread = thread::Builder::new()
            .name("midicue-dispatch".to_string())
            .spawn(move || Self::dispatch_thread(dispatcher, receiver))?;

        Ok(Self {
            sender: WorkerSender { sender },
            thread,
        })
    }

    fn dispatch_thread<R, P>(
        mut dispatcher: Dispatcher<R, P>,
        receiver: Receiver<InboundMessage>,
    ) -> DispatchStats
    where
        R: CommandRunner,
        P: OutputPort,
    {
        let mut stats = DispatchStats::default();
        for message in receiver.iter() {
            let outcome = dispatcher.handle(&message.bytes, message.delta);
            stats.record(&outcome);
        }
        debug!("Dispatch queue closed");
        stats
    }

    pub fn sender(&self) -> WorkerSender {
        self.sender.clone()
    }

    /// Stop accepting messages, drain what is queued and join the thread.
    ///
    /// Every [`WorkerSender`] handed out must be dropped first (close the
    /// input port), otherwise this blocks.
    pub fn shutdown(self) -> Result<DispatchStats> {
        drop(self.sender);
        self.thread
            .join()
            .map_err(|_| Error::Worker("dispatch thread panicked".to_string()))
    }
}
