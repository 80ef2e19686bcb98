use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Write};
use strace_tree::cli::{Cli, OutputFormat};
use strace_tree::config::TreeConfig;
use strace_tree::json_output::JsonForest;
use strace_tree::{extract, mirror, render, Forest};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug || std::env::var_os("RUST_LOG").is_some() {
        let filter = if debug {
            EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
        } else {
            EnvFilter::from_default_env()
        };
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

/// Print the listing in the requested format
fn print_forest(forest: &Forest, config: &TreeConfig, format: OutputFormat) -> Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => render::write_text(forest, config, &mut out)?,
        OutputFormat::Json => {
            let json = JsonForest::from_forest(forest)
                .to_json()
                .context("Failed to serialize JSON")?;
            writeln!(out, "{}", json)?;
        }
    }
    out.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let base = match &args.config {
        Some(path) => TreeConfig::from_file(path)?,
        None => TreeConfig::default(),
    };
    let config = args.apply(base)?;

    let pids = config.pid_extractor()?;
    let records = extract::load_records(&args.files, &*pids)?;
    let forest = Forest::build(records);

    if !args.no_print {
        print_forest(&forest, &config, args.format)?;
    }

    if !args.no_mirror {
        mirror::mirror(&forest, &config, &mut mirror::HostFs).with_context(|| {
            format!("Failed to mirror process tree into {}", config.output_root.display())
        })?;
    }

    Ok(())
}
