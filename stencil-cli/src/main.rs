//! Stencil — compile a Tera template into an output file.
//!
//! # Usage
//!
//! ```text
//! stencil <template> --out-file <path> [--include <dir>] [--watch]
//! ```
//!
//! Renders once, then (with `--watch`) keeps running and re-renders when the
//! template or any `.tera` fragment under the include directory changes.

mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::broadcast;

use stencil_renderer::{Helpers, FRAGMENT_EXTENSION};
use stencil_watch::WatchTarget;

use render::render_once;

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "stencil",
    version,
    about = "Compile a Tera template into an output file, optionally re-rendering on change",
    long_about = None,
)]
struct Cli {
    /// Template file to compile.
    template: PathBuf,

    /// Output file path (overwritten on every render).
    #[arg(long, visible_alias = "outFile")]
    out_file: PathBuf,

    /// Directory of reusable template fragments; watched too with --watch.
    #[arg(long)]
    include: Option<PathBuf>,

    /// Keep running and re-render when the template or a fragment changes.
    #[arg(long)]
    watch: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let helpers = Helpers::standard();

    // First pass always happens, before any watcher exists. Failures are
    // reported but never fatal; watch mode starts regardless.
    render_once(
        &cli.template,
        &cli.out_file,
        cli.include.as_deref(),
        &helpers,
    );

    if !cli.watch {
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(watch_until_interrupted(cli, helpers))
}

// ---------------------------------------------------------------------------
// Watch mode
// ---------------------------------------------------------------------------

async fn watch_until_interrupted(cli: Cli, helpers: Helpers) -> Result<()> {
    let mut targets = vec![WatchTarget::File(cli.template.clone())];
    if let Some(dir) = &cli.include {
        targets.push(WatchTarget::Fragments {
            dir: dir.clone(),
            extension: FRAGMENT_EXTENSION.to_string(),
        });
    }

    let template = cli.template.clone();
    let out_file = cli.out_file.clone();
    let include = cli.include.clone();
    let helpers = Arc::new(helpers);
    let on_change: stencil_watch::ChangeCallback = Arc::new(move || {
        render_once(&template, &out_file, include.as_deref(), &helpers);
    });

    let (shutdown_tx, _) = broadcast::channel::<()>(4);

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                signal = tokio::signal::ctrl_c() => {
                    if signal.is_ok() {
                        tracing::info!("received ctrl-c, stopping watch");
                    }
                    let _ = shutdown.send(());
                }
            }
        })
    };

    tracing::info!(template = %cli.template.display(), "watching for changes");
    let watch_result = stencil_watch::run(targets, on_change, shutdown_tx.subscribe()).await;
    let _ = shutdown_tx.send(());
    let _ = signal_handle.await;
    watch_result.context("watch loop failed")
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
