mod app;
mod cli;
mod config;
mod db;
mod logging;
mod paths;

use anyhow::Result;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    logging::init();
    let config = config::AppConfig::load()?;
    app::run(cli, config)
}
