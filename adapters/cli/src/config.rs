//! Startup settings merged from an optional TOML file and command-line flags.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crawl_core::Difficulty;
use crawl_session::DEFAULT_COMMAND_QUEUE_CAPACITY;
use serde::Deserialize;
use tracing::Level;

const DEFAULT_MAPS_DIR: &str = "maps";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Turn-based dungeon crawler played through the terminal.
#[derive(Debug, Default, Parser)]
#[command(name = "crawl", version, about)]
pub(crate) struct Cli {
    /// TOML file providing defaults for every other option.
    #[arg(long, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,
    /// Directory holding the `*.map` files and `world.txt`.
    #[arg(long, value_name = "DIR")]
    pub(crate) maps: Option<PathBuf>,
    /// Population density applied when levels are built.
    #[arg(long)]
    pub(crate) difficulty: Option<u32>,
    /// Seed for every random draw.
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Maximum number of inputs waiting to be processed.
    #[arg(long, value_name = "N")]
    pub(crate) queue_capacity: Option<usize>,
    /// Log verbosity written to stderr (error, warn, info, debug, trace).
    #[arg(long, value_name = "LEVEL")]
    pub(crate) log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileConfig {
    maps_dir: Option<PathBuf>,
    difficulty: Option<u32>,
    seed: Option<u64>,
    command_queue_capacity: Option<usize>,
    log_level: Option<String>,
}

/// Fully resolved startup settings.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Settings {
    pub(crate) maps_dir: PathBuf,
    pub(crate) difficulty: Difficulty,
    pub(crate) seed: Option<u64>,
    pub(crate) command_queue_capacity: usize,
    pub(crate) log_level: Level,
}

impl Settings {
    /// Applies flags on top of the config file on top of the defaults.
    pub(crate) fn resolve(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(path) => load_file(path)?,
            None => FileConfig::default(),
        };

        let capacity = cli
            .queue_capacity
            .or(file.command_queue_capacity)
            .unwrap_or(DEFAULT_COMMAND_QUEUE_CAPACITY);
        if capacity == 0 {
            bail!("command queue capacity must be positive");
        }

        let log_level = cli
            .log_level
            .as_deref()
            .or(file.log_level.as_deref())
            .unwrap_or(DEFAULT_LOG_LEVEL);
        let log_level = log_level
            .parse::<Level>()
            .with_context(|| format!("unknown log level `{log_level}`"))?;

        Ok(Self {
            maps_dir: cli
                .maps
                .clone()
                .or(file.maps_dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MAPS_DIR)),
            difficulty: cli
                .difficulty
                .or(file.difficulty)
                .map_or(Difficulty::NORMAL, Difficulty::new),
            seed: cli.seed.or(file.seed),
            command_queue_capacity: capacity,
            log_level,
        })
    }
}

fn load_file(path: &Path) -> Result<FileConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    toml::from_str(&contents)
        .with_context(|| format!("failed to parse config toml at {}", path.display()))
}
