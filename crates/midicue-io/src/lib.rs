//! MIDI transport for midicue.
//!
//! Input and output ports over midir, backend selection, and device listing.
//! The output side implements [`midicue_core::OutputPort`] so the dispatcher
//! can drive real hardware.

pub mod error;
pub use error::{Error, Result};

mod backend;
pub use backend::Backend;

mod ports;
pub use ports::{list_input_ports, list_output_ports, DeviceInfo, PortSelector};

mod input;
pub use input::{open_input, InputConfig, InputHandle};

mod output;
pub use output::{MidirOutputPort, ScopedOutput};
