use anyhow::Result;
use clap::Parser;

use dalia_etl::combine;
use dalia_etl::config::{Cli, Command};
use dalia_etl::metadata;
use dalia_etl::transform;

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Transform(config) => transform::run(&config),
        Command::Metadata(config) => metadata::run(&config),
        Command::Combine(config) => combine::run(&config),
    }
}
