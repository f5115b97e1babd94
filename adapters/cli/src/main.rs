#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs the dungeon crawler in a terminal.

mod config;
mod input;
mod viewer;

use std::{io, thread};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crawl_session::{Session, Viewer};
use crawl_world::{query, World, WorldConfig};
use tracing::info;

use crate::{
    config::{Cli, Settings},
    viewer::TerminalViewer,
};

/// Entry point for the dungeon crawler command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(&cli)?;

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(settings.log_level)
        .with_target(false)
        .init();

    let world = World::load(
        &settings.maps_dir,
        WorldConfig {
            difficulty: settings.difficulty,
            seed: settings.seed,
        },
    )
    .with_context(|| format!("failed to load maps from {}", settings.maps_dir.display()))?;
    println!("{}", query::welcome_banner(&world));
    println!("{}", input::HELP);

    let (mut session, inputs) = Session::new(world, settings.command_queue_capacity);
    let (viewer, snapshots) = session.register_viewer();
    let simulation = thread::Builder::new()
        .name("simulation".to_owned())
        .spawn(move || session.run())
        .context("failed to start the simulation thread")?;

    // Detached: blocks on stdin until the process exits.
    let _reader = thread::Builder::new()
        .name("input".to_owned())
        .spawn(move || input::forward_lines(io::stdin().lock(), &inputs, viewer))
        .context("failed to start the input thread")?;

    TerminalViewer::new(io::stdout()).run(snapshots)?;

    let exit = simulation
        .join()
        .map_err(|_| anyhow!("simulation thread panicked"))?;
    info!(?exit, "goodbye");
    Ok(())
}
