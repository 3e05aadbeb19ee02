//! # midicue
//!
//! Watches a MIDI input and reacts to it according to two YAML rule files:
//! events on channel 16 launch external commands, events on channels 1-15
//! are translated into outbound MIDI.
//!
//! ## Architecture
//!
//! - **midicue-core** - Event decoding, rule tables, matching, command and translation actions
//! - **midicue-io** - midir input/output ports, backend selection, device listing
//!
//! This crate ties them together: [`Settings`], the [`DispatchWorker`] thread
//! and the [`run`] loop used by the `midicue` binary.
//!
//! ```ignore
//! use midicue::{run, Settings};
//!
//! let settings = Settings::new("rules/commands.yaml", "rules/translations.yaml");
//! let stats = run(&settings)?;
//! println!("{}", stats);
//! ```

pub use midicue_core as core;
pub use midicue_io as io;

pub mod config;
pub use config::{Settings, DEFAULT_QUEUE_CAPACITY};

mod engine;
pub use engine::{run, run_until};

pub mod error;
pub use error::{Error, Result};

pub mod worker;
pub use worker::{DispatchWorker, InboundMessage, WorkerSender};
