pub mod change;
pub mod check;
pub mod cli;
pub mod compile;
pub mod error;
pub mod fetch;
pub mod io_utils;
pub mod preview;
pub mod rotate;
pub mod settings;
pub mod snapshot;
pub mod sql;
pub mod sync;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, debug};

use crate::{
    cli::{Cli, Commands},
    settings::Settings,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("ecs_schema_sync", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let settings = Settings::load_optional(cli.config.as_deref())
        .with_context(|| format!("Loading settings from {:?}", cli.config))?;
    debug!("Effective settings file values: {settings:?}");
    match &cli.command {
        Commands::Compile(args) => compile::execute(args, &settings),
        Commands::Sync(args) => sync::execute(args, &settings),
        Commands::Check(args) => check::execute(args, &settings),
        Commands::Preview(args) => preview::execute(args, &settings),
    }
}
