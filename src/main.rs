//! midicue - MIDI cue daemon
//!
//! # Usage
//!
//! ```bash
//! # Listen on a virtual input port
//! midicue rules/commands.yaml rules/translations.yaml
//!
//! # Listen on a physical port, send translations to the second output
//! midicue -p "Korg" -o 1 rules/commands.yaml rules/translations.yaml
//!
//! # Show available ports
//! midicue --list-ports
//! ```

use clap::{Parser, ValueEnum};
use midicue::core::DEFAULT_CACHE_CAPACITY;
use midicue::io::{list_input_ports, list_output_ports, Backend, DeviceInfo, PortSelector};
use midicue::{Settings, DEFAULT_QUEUE_CAPACITY};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Launch commands and translate MIDI messages according to YAML rules
#[derive(Parser, Debug)]
#[command(name = "midicue")]
#[command(version, about, long_about = None)]
struct Cli {
    /// MIDI backend API
    #[arg(short, long, value_enum)]
    backend: Option<BackendArg>,

    /// Input port, by index or name substring (default: a virtual port)
    #[arg(short, long)]
    port: Option<PortSelector>,

    /// Output port for translated messages, by index or name substring
    #[arg(short, long, default_value = "0")]
    output_port: PortSelector,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// List MIDI ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Messages buffered between the MIDI driver and the dispatcher
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Lookups memoized per rule table
    #[arg(long, default_value_t = DEFAULT_CACHE_CAPACITY)]
    cache_capacity: usize,

    /// Command rules (YAML)
    #[arg(required_unless_present = "list_ports")]
    cmdconfig: Option<PathBuf>,

    /// Translation rules (YAML)
    #[arg(required_unless_present = "list_ports")]
    miditrans: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    Alsa,
    Jack,
    Coremidi,
    Windowsmm,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Alsa => Backend::Alsa,
            BackendArg::Jack => Backend::Jack,
            BackendArg::Coremidi => Backend::CoreMidi,
            BackendArg::Windowsmm => Backend::WindowsMm,
        }
    }
}

impl Cli {
    fn settings(&self) -> Settings {
        let mut settings = Settings {
            backend: self.backend.map(Backend::from),
            input: self.port.clone(),
            output: self.output_port.clone(),
            queue_capacity: self.queue_capacity,
            cache_capacity: self.cache_capacity,
            ..Settings::default()
        };
        if let Some(path) = &self.cmdconfig {
            settings.command_rules = path.clone();
        }
        if let Some(path) = &self.miditrans {
            settings.translation_rules = path.clone();
        }
        settings
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose) {
        eprintln!("Cannot initialize logging: {}", e);
        return ExitCode::FAILURE;
    }

    let settings = cli.settings();
    let result = if cli.list_ports {
        print_ports(&settings.client_name)
    } else {
        midicue::run(&settings).map(|_| ())
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// `RUST_LOG` wins; otherwise debug with `-v`, info without.
fn init_logging(verbose: bool) -> Result<(), tracing_subscriber::filter::ParseError> {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(fallback)?,
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    Ok(())
}

fn print_ports(client_name: &str) -> midicue::Result<()> {
    println!("Backend: {}", Backend::compiled());
    print_section("Input ports", &list_input_ports(client_name)?);
    print_section("Output ports", &list_output_ports(client_name)?);
    Ok(())
}

fn print_section(title: &str, ports: &[DeviceInfo]) {
    println!("{}:", title);
    if ports.is_empty() {
        println!("  (none)");
    }
    for port in ports {
        println!("  {}: {}", port.index, port.name);
    }
}
