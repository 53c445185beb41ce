use std::path::PathBuf;

use clap::{Parser, Subcommand};
use reqwest::Url;

use crate::{api::heartbeat, store::file::JsonFileStore};

#[derive(Parser)]
#[command(author, version, about, propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the aggregation loop: one cycle every interval, until terminated.
    Run(RunArgs),

    /// Execute a single aggregation cycle and exit.
    Cycle(CycleArgs),

    /// Render the persisted daily and weekly totals as a table.
    Show(ShowArgs),
}

#[derive(Parser)]
pub struct RunArgs {
    /// Cycle period. Also sets the fraction of an hour each cycle accumulates.
    #[clap(long, env = "CYCLE_INTERVAL", default_value = "5s")]
    pub interval: humantime::Duration,

    /// Seed for the reading generator, for reproducible runs.
    #[clap(long, env = "READING_SEED")]
    pub seed: Option<u64>,

    #[clap(flatten)]
    pub store: StoreArgs,

    #[clap(flatten)]
    pub heartbeat: HeartbeatArgs,
}

#[derive(Parser)]
pub struct CycleArgs {
    /// Interval the single cycle accounts for, matching the loop it stands in for.
    #[clap(long, env = "CYCLE_INTERVAL", default_value = "5s")]
    pub interval: humantime::Duration,

    /// Seed for the reading generator, for reproducible runs.
    #[clap(long, env = "READING_SEED")]
    pub seed: Option<u64>,

    #[clap(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser)]
pub struct ShowArgs {
    #[clap(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser)]
pub struct StoreArgs {
    /// Path of the JSON tag store file.
    #[clap(long = "store-path", env = "STORE_PATH", default_value = "gridmouse-tags.json")]
    pub path: PathBuf,
}

impl StoreArgs {
    pub fn open(&self) -> JsonFileStore {
        JsonFileStore::open(self.path.clone())
    }
}

#[derive(Parser)]
pub struct HeartbeatArgs {
    /// Monitoring URL to POST to after each successful cycle.
    #[clap(long = "heartbeat-url", env = "HEARTBEAT_URL")]
    pub url: Option<Url>,
}

impl HeartbeatArgs {
    pub fn client(&self) -> heartbeat::Client {
        heartbeat::Client::new(self.url.clone())
    }
}
