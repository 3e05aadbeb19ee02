//! Detached process launching.

use super::CommandRunner;
use crate::error::ExecError;
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, info};

/// Spawns each command line as its own process and never waits on it from
/// the calling thread.
///
/// A short-lived reaper thread collects the exit status so finished children
/// do not linger as zombies.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessLauncher;

impl ProcessLauncher {
    pub fn new() -> Self {
        Self
    }

    /// Tokenize with shell-word rules (quotes and escapes honored). `#` has
    /// no comment meaning and stays part of its word.
    pub fn tokenize(command_line: &str) -> Result<Vec<String>, ExecError> {
        let args = shlex::split(&escape_hashes(command_line))
            .ok_or_else(|| ExecError::Tokenize(command_line.to_string()))?;
        if args.is_empty() {
            return Err(ExecError::Empty);
        }
        Ok(args)
    }
}

/// Backslash-escape every unquoted `#` so the splitter never reads a comment.
fn escape_hashes(command_line: &str) -> String {
    #[derive(Clone, Copy, PartialEq)]
    enum Quote {
        None,
        Single,
        Double,
    }

    let mut out = String::with_capacity(command_line.len() + 4);
    let mut quote = Quote::None;
    let mut chars = command_line.chars();
    while let Some(c) = chars.next() {
        match (quote, c) {
            (Quote::None | Quote::Double, '\\') => {
                out.push(c);
                if let Some(next) = chars.next() {
                    out.push(next);
                }
                continue;
            }
            (Quote::None, '#') => out.push('\\'),
            (Quote::None, '\'') => quote = Quote::Single,
            (Quote::None, '"') => quote = Quote::Double,
            (Quote::Single, '\'') | (Quote::Double, '"') => quote = Quote::None,
            _ => {}
        }
        out.push(c);
    }
    out
}

impl CommandRunner for ProcessLauncher {
    fn execute(&mut self, command_line: &str) -> Result<(), ExecError> {
        let args = Self::tokenize(command_line)?;
        let (program, rest) = args.split_first().ok_or(ExecError::Empty)?;

        info!("Calling external command: {}", command_line);
        let mut child = Command::new(program)
            .args(rest)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| ExecError::Spawn {
                program: program.clone(),
                source,
            })?;

        let program = program.clone();
        let reaper = thread::Builder::new()
            .name("midicue-reaper".to_string())
            .spawn(move || match child.wait() {
                Ok(status) => debug!("'{}' exited with {}", program, status),
                Err(e) => debug!("Could not wait for '{}': {}", program, e),
            });
        if let Err(e) = reaper {
            debug!("No reaper thread for '{}': {}", command_line, e);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_honors_quotes() {
        assert_eq!(
            ProcessLauncher::tokenize(r#"evince "my sheet.pdf" --page\ 2"#).unwrap(),
            vec!["evince", "my sheet.pdf", "--page 2"]
        );
    }

    #[test]
    fn test_tokenize_keeps_hash_words() {
        assert_eq!(
            ProcessLauncher::tokenize("echo #7 done").unwrap(),
            vec!["echo", "#7", "done"]
        );
        assert_eq!(
            ProcessLauncher::tokenize(r##"notify '#a b' "#c" d\#e #"##).unwrap(),
            vec!["notify", "#a b", "#c", "d#e", "#"]
        );
    }

    #[test]
    fn test_tokenize_errors() {
        assert!(matches!(
            ProcessLauncher::tokenize("echo 'unterminated").unwrap_err(),
            ExecError::Tokenize(_)
        ));
        assert!(matches!(
            ProcessLauncher::tokenize("   ").unwrap_err(),
            ExecError::Empty
        ));
    }

    #[test]
    fn test_missing_binary_is_an_error() {
        let mut launcher = ProcessLauncher::new();
        let err = launcher
            .execute("midicue-no-such-binary-4f2a --flag")
            .unwrap_err();
        match err {
            ExecError::Spawn { program, .. } => assert_eq!(program, "midicue-no-such-binary-4f2a"),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_does_not_wait() {
        let mut launcher = ProcessLauncher::new();
        let start = std::time::Instant::now();
        launcher.execute("sleep 2").unwrap();
        assert!(start.elapsed() < std::time::Duration::from_secs(1));
    }
}
