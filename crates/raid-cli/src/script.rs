//! A tiny line-oriented script format for driving an [`raid_rs::Engine`]
//! through a sequence of operations in one process.
//!
//! Each non-blank, non-comment line is one operation:
//!
//! ```text
//! write  <name> <path>       # write <path>'s bytes under <name>
//! read   <name> <path>       # read <name> back, saving it to <path>
//! update <name> <path>       # rewrite <name>'s contents from <path>
//! delete <name>              # release <name>'s extents
//! fail   <disk>               # hot-remove disk <disk>
//! recover <disk>[,<disk2>]    # reconstruct one or two lost disks
//! scrub  <stripe>             # verify/repair one stripe's parity
//! list                        # print every known file name
//! status                      # print every disk's health
//! ```
//!
//! Lines starting with `#` and blank lines are ignored.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use raid_rs::hostfs::StdHostFs;
use raid_rs::Engine;
use tracing::info;

pub fn run(engine: &mut Engine, script_path: &Path) -> Result<()> {
    let text = fs::read_to_string(script_path)
        .with_context(|| format!("reading script {}", script_path.display()))?;

    for (lineno, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        run_line(engine, line).with_context(|| format!("{}:{}: {line}", script_path.display(), lineno + 1))?;
    }
    Ok(())
}

fn run_line(engine: &mut Engine, line: &str) -> Result<()> {
    let mut parts = line.split_whitespace();
    let op = parts.next().unwrap_or("");
    let fs = StdHostFs;

    match op {
        "write" => {
            let (name, path) = two_args(&mut parts)?;
            engine.write_from_file(Path::new(path), name, &fs)?;
            info!(name, path, "wrote");
        }
        "read" => {
            let (name, path) = two_args(&mut parts)?;
            engine.read_to_file(name, Path::new(path), &fs)?;
            info!(name, path, "read");
        }
        "update" => {
            let (name, path) = two_args(&mut parts)?;
            engine.update_from_file(name, Path::new(path), &fs)?;
            info!(name, path, "updated");
        }
        "delete" => {
            let name = one_arg(&mut parts)?;
            engine.delete(name)?;
            info!(name, "deleted");
        }
        "fail" => {
            let disk = one_arg(&mut parts)?.parse::<usize>().context("disk index")?;
            engine.fail_disk(disk)?;
            info!(disk, "failed");
        }
        "recover" => {
            let arg = one_arg(&mut parts)?;
            let disks: Vec<usize> = arg
                .split(',')
                .map(|d| d.parse::<usize>().context("disk index"))
                .collect::<Result<_>>()?;
            engine.recover(&disks)?;
            info!(?disks, "recovered");
        }
        "scrub" => {
            let stripe = one_arg(&mut parts)?.parse::<u64>().context("stripe index")?;
            let repaired = engine.scrub_stripe(stripe)?;
            info!(stripe, repaired, "scrubbed");
        }
        "list" => {
            for name in engine.list_files() {
                println!("{name}");
            }
        }
        "status" => {
            for (disk, status) in engine.disk_statuses().iter().enumerate() {
                println!("disk {disk}: {status:?}");
            }
        }
        other => bail!("unknown operation: {other}"),
    }
    Ok(())
}

fn one_arg<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<&'a str> {
    parts.next().context("missing argument")
}

fn two_args<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<(&'a str, &'a str)> {
    let a = parts.next().context("missing first argument")?;
    let b = parts.next().context("missing second argument")?;
    Ok((a, b))
}
