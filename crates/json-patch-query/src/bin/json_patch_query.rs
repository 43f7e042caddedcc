//! `json-patch-query`: apply a query-addressed JSON Patch to a document.
//!
//! Usage:
//!   json-patch-query [--legacy] [--atomic] [--pretty] '<patch-array-json>'
//!
//! The document is read from stdin. Set `RUST_LOG=debug` to trace how each
//! operation path resolves.

use std::io::{self, Read, Write};

use anyhow::Context;
use clap::Parser;
use json_patch_query::cli::apply_json_patch;
use json_patch_query::{ApplyOptions, Syntax};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "json-patch-query", about = "Apply a query-addressed JSON Patch", version)]
struct Cli {
    /// Patch operations as a JSON array
    patch: String,

    /// Paths use TMF dot syntax with query-string filters
    #[arg(long)]
    legacy: bool,

    /// Leave the document untouched unless every operation succeeds
    #[arg(long)]
    atomic: bool,

    /// Pretty-print the result
    #[arg(short, long)]
    pretty: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("{e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut doc = String::new();
    io::stdin().read_to_string(&mut doc).context("reading document from stdin")?;

    let options = ApplyOptions {
        syntax: if cli.legacy { Syntax::Legacy } else { Syntax::Query },
        atomic: cli.atomic,
    };
    let out = apply_json_patch(doc.trim(), &cli.patch, &options, cli.pretty)?;

    let mut stdout = io::stdout().lock();
    stdout.write_all(out.as_bytes())?;
    stdout.write_all(b"\n")?;
    Ok(())
}
