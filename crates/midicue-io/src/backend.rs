//! MIDI API selection.
//!
//! midir binds its API at compile time, so only one backend is ever usable in
//! a given build. Asking for another one is reported instead of silently
//! ignored.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Alsa,
    Jack,
    CoreMidi,
    WindowsMm,
}

impl Backend {
    pub const ALL: [Backend; 4] = [
        Backend::Alsa,
        Backend::Jack,
        Backend::CoreMidi,
        Backend::WindowsMm,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Backend::Alsa => "alsa",
            Backend::Jack => "jack",
            Backend::CoreMidi => "coremidi",
            Backend::WindowsMm => "windowsmm",
        }
    }

    /// The backend midir was built against.
    pub fn compiled() -> Self {
        if cfg!(feature = "jack") {
            Backend::Jack
        } else if cfg!(any(target_os = "macos", target_os = "ios")) {
            Backend::CoreMidi
        } else if cfg!(windows) {
            Backend::WindowsMm
        } else {
            Backend::Alsa
        }
    }

    pub fn ensure_available(self) -> Result<()> {
        let compiled = Self::compiled();
        if self == compiled {
            Ok(())
        } else {
            Err(Error::BackendUnavailable {
                requested: self,
                compiled,
            })
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Backend {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|b| b.name() == wanted)
            .ok_or_else(|| Error::UnknownBackend(s.to_string()))
    }
}
