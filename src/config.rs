//! Run settings.

use midicue_core::{DEFAULT_CACHE_CAPACITY, DEFAULT_MESSAGE_GAP};
use midicue_io::{Backend, InputConfig, PortSelector};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Everything [`crate::run`] needs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub command_rules: PathBuf,
    pub translation_rules: PathBuf,
    /// Requested MIDI API. `None` accepts whatever this build uses.
    pub backend: Option<Backend>,
    /// Input port. `None` opens a virtual port.
    pub input: Option<PortSelector>,
    pub output: PortSelector,
    pub client_name: String,
    pub virtual_port_name: String,
    pub queue_capacity: usize,
    pub cache_capacity: usize,
    pub message_gap: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            command_rules: PathBuf::from("commands.yaml"),
            translation_rules: PathBuf::from("translations.yaml"),
            backend: None,
            input: None,
            output: PortSelector::Index(0),
            client_name: "midicue".to_string(),
            virtual_port_name: "MIDI input".to_string(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            message_gap: DEFAULT_MESSAGE_GAP,
        }
    }
}

impl Settings {
    pub fn new(command_rules: impl Into<PathBuf>, translation_rules: impl Into<PathBuf>) -> Self {
        Self {
            command_rules: command_rules.into(),
            translation_rules: translation_rules.into(),
            ..Self::default()
        }
    }

    pub fn input_config(&self) -> InputConfig {
        InputConfig {
            client_name: self.client_name.clone(),
            port: self.input.clone(),
            port_name: self.virtual_port_name.clone(),
        }
    }
}
