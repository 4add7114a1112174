//! Stub matcher CLI
//!
//! Compares JSON documents the way the stub server does, and resolves a
//! request against a file of stubs.
//!
//! Usage:
//!   stub-match compare --pattern '{"id": 5}' --target request.json [--strict]
//!   stub-match lookup --stubs stubs.json --method /shop.Orders/GetOrder --request '{"id": 5}'
//!
//! Exit status: 0 on match, 1 on no match, 2 on error.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use stub_matcher::{
    ArrayMatching, InMemoryStubsStore, JsonValue, MatchMode, MatcherConfig, Metadata,
    StoreError, Stub, StubsStore,
};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

// ANSI color codes
const GREEN: &str = "\x1b[32m";
const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Stub matcher - compare request documents with stub patterns
#[derive(Parser, Debug)]
#[command(name = "stub-match")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(short, long, env = "STUB_MATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Array candidate policy: reusable or exclusive (overrides the config file)
    #[arg(long, env = "STUB_MATCH_ARRAY_MATCHING")]
    array_matching: Option<ArrayMatching>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare a pattern document with a target document
    Compare {
        /// Pattern document: a file path or inline JSON
        #[arg(short, long)]
        pattern: String,

        /// Target document: a file path or inline JSON
        #[arg(short, long)]
        target: String,

        /// Require identical field sets instead of a subset match
        #[arg(short, long)]
        strict: bool,
    },

    /// Find the stub that answers a request
    Lookup {
        /// JSON file holding an array of stubs
        #[arg(long)]
        stubs: PathBuf,

        /// Full RPC method name, e.g. /package.Service/Method
        #[arg(short, long)]
        method: String,

        /// Request document: a file path or inline JSON
        #[arg(short, long, default_value = "")]
        request: String,

        /// Request metadata as key=value (repeatable)
        #[arg(long = "metadata", value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(err) => {
            eprintln!("{RED}{BOLD}error:{RESET} {err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> anyhow::Result<bool> {
    let mut config = match &args.config {
        Some(path) => MatcherConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => MatcherConfig::default(),
    };
    if let Some(array_matching) = args.array_matching {
        config.array_matching = array_matching;
    }

    init_tracing(&config);
    debug!(array_matching = %config.array_matching, "Configuration loaded");

    match args.command {
        Command::Compare {
            pattern,
            target,
            strict,
        } => compare(&config, &pattern, &target, strict),
        Command::Lookup {
            stubs,
            method,
            request,
            metadata,
        } => lookup(&config, &stubs, &method, &request, metadata),
    }
}

fn init_tracing(config: &MatcherConfig) {
    let default_filter = config.log_filter.as_deref().unwrap_or("warn");
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();
}

fn compare(
    config: &MatcherConfig,
    pattern: &str,
    target: &str,
    strict: bool,
) -> anyhow::Result<bool> {
    let pattern = JsonValue::parse_object(&read_document(pattern)?)
        .context("could not interpret pattern document")?;
    let target = JsonValue::parse_object(&read_document(target)?)
        .context("could not interpret target document")?;
    let mode = if strict {
        MatchMode::Strict
    } else {
        MatchMode::Subset
    };

    match config.comparator().explain(&pattern, &target, mode) {
        Ok(()) => {
            println!("{GREEN}match{RESET}");
            Ok(true)
        }
        Err(mismatch) => {
            println!("{RED}no match{RESET} {mismatch}");
            Ok(false)
        }
    }
}

fn lookup(
    config: &MatcherConfig,
    stubs_path: &Path,
    method: &str,
    request: &str,
    metadata: Vec<(String, String)>,
) -> anyhow::Result<bool> {
    let contents = std::fs::read_to_string(stubs_path)
        .with_context(|| format!("failed to read {}", stubs_path.display()))?;
    let stubs: Vec<Stub> = serde_json::from_str(&contents)
        .with_context(|| format!("could not interpret stubs in {}", stubs_path.display()))?;

    let store = InMemoryStubsStore::from_config(config);
    for (index, stub) in stubs.into_iter().enumerate() {
        match store.add(stub) {
            Ok(()) => {}
            Err(StoreError::AlreadyExists(duplicate)) => {
                warn!(index, method = %duplicate, "Skipping duplicate stub");
            }
            Err(err) => return Err(err).with_context(|| format!("invalid stub at index {index}")),
        }
    }

    let mut request_metadata = Metadata::new();
    for (key, value) in metadata {
        request_metadata.entry(key).or_default().push(value);
    }

    let request = read_document(request)?;
    match store
        .find_match(method, &request, &request_metadata)
        .context("could not interpret request document")?
    {
        Some(stub) => {
            println!("{}", serde_json::to_string_pretty(&stub.response)?);
            Ok(true)
        }
        None => {
            println!("{YELLOW}no stub configured{RESET} for {method}");
            Ok(false)
        }
    }
}

/// Read `arg` as a file when it names one, otherwise treat it as inline JSON.
fn read_document(arg: &str) -> anyhow::Result<String> {
    let path = Path::new(arg);
    if !arg.is_empty() && path.is_file() {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
    } else {
        Ok(arg.to_string())
    }
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("invalid metadata '{s}': expected key=value"))
}
