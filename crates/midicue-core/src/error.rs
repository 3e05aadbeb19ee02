//! Error types for rule loading, template rendering, and actions.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{kind} rules file not found: {}", path.display())]
    RulesNotFound { kind: &'static str, path: PathBuf },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("{kind} rules must be a YAML sequence of records")]
    NotASequence { kind: &'static str },

    #[error("invalid {kind} rule #{index} ({name}): {source}")]
    InvalidRule {
        kind: &'static str,
        index: usize,
        name: String,
        #[source]
        source: RuleError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Problems with a single rule record.
#[derive(Error, Debug)]
pub enum RuleError {
    #[error("unknown status '{0}'")]
    UnknownStatus(String),

    #[error("channel {0} out of range (1-16)")]
    ChannelOutOfRange(i64),

    #[error("could not parse 'data' field: {0}")]
    InvalidData(String),

    #[error("missing '{0}' field")]
    MissingAction(&'static str),

    #[error("unexpected '{0}' field")]
    UnexpectedField(&'static str),

    #[error("record shape: {0}")]
    Shape(String),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

impl RuleError {
    /// A recoverable error drops the record; anything else aborts the load.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, RuleError::UnknownStatus(_))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder '{0}'")]
    UnknownField(String),

    #[error("bad format spec at offset {offset}: {reason}")]
    BadSpec { offset: usize, reason: String },

    #[error("byte item '{0}' is not a literal 0-255 or a field reference")]
    BadByte(String),

    #[error("template has no messages")]
    Empty,

    #[error("field '{0}' is absent on this event")]
    MissingField(&'static str),
}

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("cannot tokenize command line: {0}")]
    Tokenize(String),

    #[error("empty command line")]
    Empty,

    #[error("failed to launch '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum PortError {
    #[error("output port unavailable: {0}")]
    Unavailable(String),

    #[error("send failed: {0}")]
    Send(String),
}

#[derive(Error, Debug)]
pub enum EmitError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Port(#[from] PortError),
}
