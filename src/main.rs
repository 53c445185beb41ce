#![doc = include_str!("../README.md")]

mod api;
mod cli;
mod core;
mod prelude;
mod quantity;
mod store;
mod tables;

use std::sync::{Arc, atomic::AtomicBool};

use clap::{Parser, crate_version};

use crate::{
    cli::{Args, Command, CycleArgs, RunArgs, ShowArgs},
    core::{
        clock::CycleInstant,
        engine::{Engine, load_state},
        reading::ReadingGenerator,
    },
    prelude::*,
    tables::build_weekly_table,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt().without_time().compact().init();
    info!(version = crate_version!(), "starting up…");

    match Args::parse().command {
        Command::Run(args) => run(args).await?,
        Command::Cycle(args) => cycle(args).await?,
        Command::Show(args) => show(args).await?,
    }

    info!("done!");
    Ok(())
}

/// Run the aggregation loop until SIGTERM or SIGINT.
async fn run(args: RunArgs) -> Result {
    let should_terminate = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(signal_hook::consts::SIGTERM, Arc::clone(&should_terminate))?;
    signal_hook::flag::register(signal_hook::consts::SIGINT, Arc::clone(&should_terminate))?;

    let mut engine = Engine::builder()
        .store(args.store.open())
        .generator(ReadingGenerator::new(args.seed))
        .interval(args.interval)
        .heartbeat(args.heartbeat.client())
        .build();
    engine.initialize().await?;
    engine.run(&should_terminate).await;
    Ok(())
}

/// Execute a single cycle against the store, for cron-style scheduling.
async fn cycle(args: CycleArgs) -> Result {
    let mut engine = Engine::builder()
        .store(args.store.open())
        .generator(ReadingGenerator::new(args.seed))
        .interval(args.interval)
        .build();
    engine.initialize().await?;
    engine.run_cycle(CycleInstant::now()).await;
    Ok(())
}

async fn show(args: ShowArgs) -> Result {
    let state = load_state(&args.store.open()).await?;
    info!(last_reset_date = %state.last_reset_date, "loaded the persisted state");
    println!("{}", build_weekly_table(&state));
    Ok(())
}
