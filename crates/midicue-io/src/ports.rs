//! Port enumeration and lookup.

use crate::error::{Error, Result};
use midir::{MidiIO, MidiInput, MidiOutput};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub index: usize,
    pub name: String,
}

/// How a port is requested on the command line: a bare number is an index,
/// anything else a case-insensitive name substring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortSelector {
    Index(usize),
    Name(String),
}

impl FromStr for PortSelector {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        Ok(match s.parse::<usize>() {
            Ok(index) => PortSelector::Index(index),
            Err(_) => PortSelector::Name(s.to_string()),
        })
    }
}

impl fmt::Display for PortSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSelector::Index(index) => write!(f, "#{}", index),
            PortSelector::Name(name) => f.write_str(name),
        }
    }
}

fn describe<IO: MidiIO>(io: &IO) -> Vec<(IO::Port, DeviceInfo)> {
    io.ports()
        .into_iter()
        .enumerate()
        .map(|(index, port)| {
            let name = io
                .port_name(&port)
                .unwrap_or_else(|_| format!("Unknown Device {}", index));
            (port, DeviceInfo { index, name })
        })
        .collect()
}

/// Resolve `selector` against the ports `io` currently sees.
pub(crate) fn select_port<IO: MidiIO>(
    io: &IO,
    selector: &PortSelector,
    direction: &'static str,
) -> Result<(IO::Port, String)> {
    let not_found = || Error::PortNotFound {
        direction,
        selector: selector.to_string(),
    };

    let ports = describe(io);
    let found = match selector {
        PortSelector::Index(index) => ports.into_iter().nth(*index),
        PortSelector::Name(name) => {
            let wanted = name.to_lowercase();
            ports
                .into_iter()
                .find(|(_, info)| info.name.to_lowercase().contains(&wanted))
        }
    };

    found.map(|(port, info)| (port, info.name)).ok_or_else(not_found)
}

pub fn list_input_ports(client_name: &str) -> Result<Vec<DeviceInfo>> {
    let input = MidiInput::new(client_name)?;
    Ok(describe(&input).into_iter().map(|(_, info)| info).collect())
}

pub fn list_output_ports(client_name: &str) -> Result<Vec<DeviceInfo>> {
    let output = MidiOutput::new(client_name)?;
    Ok(describe(&output).into_iter().map(|(_, info)| info).collect())
}
