//! Templates resolved against the triggering event.
//!
//! Both templates are parsed once when the rule file is loaded; rendering only
//! substitutes event fields.

mod command;
mod output;

pub use command::CommandTemplate;
pub use output::{ByteItem, ByteSpec, OutboundMessage, OutputTemplate};

use crate::event::Event;

/// Event fields a template may reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Channel,
    Status,
    Data1,
    Data2,
}

impl Field {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "channel" => Some(Field::Channel),
            "status" => Some(Field::Status),
            "data1" => Some(Field::Data1),
            "data2" => Some(Field::Data2),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Field::Channel => "channel",
            Field::Status => "status",
            Field::Data1 => "data1",
            Field::Data2 => "data2",
        }
    }

    #[inline]
    pub fn value(self, event: &Event) -> Option<u8> {
        match self {
            Field::Channel => event.channel,
            Field::Status => Some(event.status),
            Field::Data1 => event.data1,
            Field::Data2 => event.data2,
        }
    }
}
