use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod script;

use cli::{Cli, Command};
use raid_rs::hostfs::StdHostFs;
use raid_rs::Engine;

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let fs: Arc<dyn raid_rs::hostfs::HostFs> = Arc::new(StdHostFs);
    let mut engine = Engine::new(cli.disks, cli.chunk_size, &cli.root, fs)?;

    match cli.command {
        Command::Script { path } => script::run(&mut engine, &path),
        Command::Demo { path } => run_demo(&mut engine, &path),
    }
}

fn init_tracing() {
    if tracing::dispatcher::has_been_set() {
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();
}

fn run_demo(engine: &mut Engine, path: &std::path::Path) -> Result<()> {
    let fs = StdHostFs;
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("demo-file")
        .to_string();

    engine.write_from_file(path, &name, &fs)?;
    let original = std::fs::read(path)?;
    let round_tripped = engine.read(&name)?;

    if original == round_tripped {
        println!("ok: {name} round-tripped through {}-disk array", engine.disk_count());
    } else {
        println!("mismatch: {name} did not round-trip byte-for-byte");
    }
    Ok(())
}
