//! Interpol CLI
//!
//! Usage:
//!   interpol [OPTIONS] <COMMAND>
//!
//! Commands:
//!   render [FILE]         Interpolate FILE (or stdin) with the configured bindings
//!   scan [FILE]           Show the chunks a template scans into
//!   dispatch <CANDIDATE>  List the configured handlers for a candidate, in order
//!
//! Options:
//!   -c, --config <FILE>     Configuration file (TOML format)
//!   --log-level <LEVEL>     Log level for this crate (error|warn|info|debug|trace)
//!   -h, --help              Print help

use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use interpol::expr::{Namespace, Value};
use interpol::{scan_with, BindingEnvironment, Chunk, Config};

#[derive(Parser)]
#[command(name = "interpol")]
#[command(about = "String interpolation templates and priority pattern dispatch")]
struct Cli {
    /// Configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level for this crate (error|warn|info|debug|trace); overrides RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interpolate a template and print the result
    Render {
        /// Template file (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Bind a global, e.g. `--set count=3`; values that do not parse as
        /// expressions are bound as plain strings
        #[arg(long = "set", value_name = "NAME=VALUE")]
        bindings: Vec<String>,
    },
    /// Print the chunks a template scans into
    Scan {
        /// Template file (reads from stdin if not provided)
        input: Option<PathBuf>,
    },
    /// Print the configured handlers for a candidate, in dispatch order
    Dispatch {
        candidate: String,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };

    match cli.command {
        Command::Render { input, bindings } => run_render(&config, input.as_deref(), &bindings),
        Command::Scan { input } => run_scan(&config, input.as_deref()),
        Command::Dispatch { candidate } => run_dispatch(&config, &candidate),
    }
}

/// Install a stderr subscriber; `--log-level` wins over `RUST_LOG`
fn init_logging(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(format!("interpol={}", level.to_ascii_lowercase())),
        None => match env::var("RUST_LOG") {
            Ok(spec) => EnvFilter::new(spec),
            Err(_) => EnvFilter::new("interpol=warn"),
        },
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_render(config: &Config, input: Option<&Path>, bindings: &[String]) {
    let mut ns = config.namespace();
    for binding in bindings {
        let Some((name, raw)) = binding.split_once('=') else {
            eprintln!("Error: binding '{}' is not of the form NAME=VALUE", binding);
            std::process::exit(1);
        };
        ns.set_global(name.trim(), parse_binding(&ns, raw));
    }

    let (source, filename) = read_input(input);
    let template = scan_or_exit(config, &source, &filename);
    match template.render(&ns) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Evaluate a `--set` value, or keep it as text when it is not an expression
fn parse_binding(ns: &Namespace, raw: &str) -> Value {
    match ns.evaluate(raw) {
        Ok(value) => value,
        Err(e) => {
            debug!(value = raw, error = %e, "binding kept as string");
            Value::from(raw)
        }
    }
}

fn run_scan(config: &Config, input: Option<&Path>) {
    let (source, filename) = read_input(input);
    let template = scan_or_exit(config, &source, &filename);
    for chunk in template.chunks() {
        match chunk {
            Chunk::Literal(text) => println!("literal    {:?}", text),
            Chunk::Expression(text) => println!("expression {:?}", text),
        }
    }
}

fn run_dispatch(config: &Config, candidate: &str) {
    let registry = match config.registry() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    for chain in registry.lookup(candidate) {
        for entry in chain.entries() {
            println!("{}\t{}", entry.priority(), entry.handler());
        }
    }
}

fn scan_or_exit(config: &Config, source: &str, filename: &str) -> interpol::Template {
    let options = match config.scan_options() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    match scan_with(source, &options) {
        Ok(t) => t,
        Err(e) => {
            eprint!("{}", e.report(source, filename));
            std::process::exit(1);
        }
    }
}

fn read_input(input: Option<&Path>) -> (String, String) {
    match input {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => (content, path.display().to_string()),
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => (buffer, "<stdin>".to_string()),
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}
