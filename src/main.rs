use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use mapmarks::app::StoreLocation;

/// Drop markers on a map, measure how far they are from you, keep them
/// across restarts.
#[derive(Debug, Parser)]
#[command(name = "mapmarks", version, about)]
struct Cli {
    /// SQLite file to keep markers in (overrides config.json)
    #[arg(long, value_name = "PATH", conflicts_with = "in_memory")]
    database: Option<PathBuf>,

    /// Keep markers in memory only
    #[arg(long)]
    in_memory: bool,
}

impl Cli {
    fn store_location(&self) -> StoreLocation {
        match (&self.database, self.in_memory) {
            (_, true) => StoreLocation::InMemory,
            (Some(path), false) => StoreLocation::File(path.clone()),
            (None, false) => StoreLocation::Configured,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    mapmarks::run(cli.store_location()).context("mapmarks session failed")
}
