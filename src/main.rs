//! Pulseline statusline binary
//!
//! Reads the session payload from stdin, analyzes the transcript, and
//! prints exactly one line to stdout. Diagnostics go to stderr so they
//! never corrupt the statusline.

use clap::Parser;
use pulseline::input::StatusInput;
use pulseline::render::{render_line, SessionContext};
use pulseline::{config, Config, Engine};
use std::path::Path;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pulseline")]
#[command(about = "Transcript-aware statusline for AI coding sessions")]
#[command(version)]
struct Args {
    /// Path to config file
    #[arg(short, long, env = "PULSELINE_CONFIG", default_value = "~/.pulseline/config.toml")]
    config: String,

    /// Write a default config file and exit
    #[arg(long)]
    init: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Enable debug logging on stderr
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose {
        "pulseline=debug"
    } else {
        "pulseline=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();

    let config_path = config::expand_path(Path::new(&args.config));

    if args.init {
        if config_path.exists() {
            warn!("Config file already exists: {}", config_path.display());
        } else {
            Config::create_default(&config_path)?;
            println!("Created config file: {}", config_path.display());
        }
        return Ok(());
    }

    let config = Config::load_or_default(&config_path);

    // stdout is a pipe, so colored would disable itself without an
    // explicit override.
    if args.no_color || std::env::var_os("NO_COLOR").is_some() || !config.display.color {
        colored::control::set_override(false);
    } else {
        colored::control::set_override(true);
    }

    let input = StatusInput::from_stdin();

    let mut engine = Engine::new(config);
    let snapshot = match input.transcript_path.as_deref() {
        Some(path) => engine.snapshot(path),
        None => engine.snapshot(""),
    };

    let session = SessionContext {
        project: input.project_name().map(str::to_string),
        model: input
            .model
            .as_ref()
            .and_then(|m| m.display_name.clone().or_else(|| m.id.clone())),
        branch: input
            .working_dir()
            .and_then(|dir| pulseline::git::current_branch(Path::new(dir))),
    };

    let max_width = std::env::var("COLUMNS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(200);

    println!(
        "{}",
        render_line(&snapshot, &session, &engine.config.display, max_width)
    );

    Ok(())
}
