#![warn(clippy::all, clippy::pedantic)]

use clap::Parser;

mod cli;
mod commands;
mod config;
mod database;
mod error;
mod pool;
mod report;

use cli::{Cli, Command};
use config::Config;
use error::AppError;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    logger::init();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_deref())?.with_env_overrides();
    tracing::debug!("{config}");

    let store = database::connect(&config.database).await?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => {
            commands::run(&config, &store, cli.json).await?;
        }
        Command::List => commands::list(&store, cli.json).await?,
        Command::Add(args) => {
            commands::add(&config, &store, args).await?;
        }
        Command::Remove { uuid } => commands::remove(&store, uuid).await?,
    }

    Ok(())
}
