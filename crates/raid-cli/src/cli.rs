//! Command-line argument definitions for the `raid-cli` driver binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Cli defines the root command for the RAID-6 driver binary.
#[derive(Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Disk count for the simulated array (N in [4,40] u {64,97,100}).
    #[arg(long, default_value_t = 8)]
    pub disks: usize,

    /// Bytes per chunk in each stripe.
    #[arg(long, default_value_t = 4096)]
    pub chunk_size: usize,

    /// Root directory the simulated disk subdirectories live under. The
    /// engine recreates it empty on every run: it keeps no metadata
    /// across process restarts, so a fresh array is the only honest
    /// starting point for a one-shot invocation.
    #[arg(long, default_value = "./raid-array")]
    pub root: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// Command enumerates the supported CLI subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Runs a newline-delimited script of operations against one freshly
    /// constructed array, in order. See [`crate::script`] for the format.
    Script {
        /// Path to the script file.
        path: PathBuf,
    },

    /// Writes a single file, reads it back, and reports whether the
    /// round trip matched byte-for-byte.
    Demo {
        /// Path to the file to write and read back.
        path: PathBuf,
    },
}
