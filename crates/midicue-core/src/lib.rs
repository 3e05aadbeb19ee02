//! Rule matching and dispatch for MIDI cue handling.
//!
//! Decodes raw channel messages, matches them against declarative YAML rules,
//! and either launches an external command or sends translated MIDI.
//!
//! Hardware access lives in `midicue-io`; everything here is testable without
//! a MIDI device.

pub mod error;
pub use error::{EmitError, Error, ExecError, PortError, Result, RuleError, TemplateError};

pub mod event;
pub use event::{Event, EventClock, EventKey};

pub mod status;
pub use status::{is_event_status, status_by_name, status_name, StatusSpec};

pub mod rules;
pub use rules::{
    load_command_rules, load_rules, load_translation_rules, parse_rules, CommandRule,
    DataSelector, Rule, RuleTable, Selector, TranslationRule,
};

pub mod template;
pub use template::{CommandTemplate, OutboundMessage, OutputTemplate};

pub mod matcher;
pub use matcher::{Matcher, DEFAULT_CACHE_CAPACITY};

pub mod action;
pub use action::{
    CommandRunner, OutputEmitter, OutputPort, PortConnection, ProcessLauncher,
    DEFAULT_MESSAGE_GAP,
};

pub mod dispatch;
pub use dispatch::{Dispatch, DispatchStats, Dispatcher, Route, COMMAND_CHANNEL};
