//! # CLI Module - Command Line Interface for the SPH Engine
//!
//! This module provides the command-line surface over `Domain` (§6): a
//! `run` command that loads a `DomainConfig` and calls `solve` from a fresh
//! initial condition, and a `restart` command that resumes from a previous
//! restart snapshot (§6 `load`).
//!
//! **Usage**:
//! ```bash
//! sphrs run --config scenario.toml --t-final 1.0 --dt 1e-6 --dt-out 1e-3 --file-key out/run
//! sphrs restart --config scenario.toml --key out/run --t-final 2.0 --dt 1e-6 --dt-out 1e-3 --file-key out/run
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the initial condition from a `DomainConfig` and run `solve` to `t_final`.
    Run {
        /// Path to a TOML `DomainConfig` file.
        #[arg(short, long)]
        config: PathBuf,

        /// Simulated time to run to.
        #[arg(long)]
        t_final: f64,

        /// Fixed integration time step.
        #[arg(long)]
        dt: f64,

        /// Simulated time between output snapshots.
        #[arg(long)]
        dt_out: f64,

        /// Output file key; snapshots are written as `<file-key>_NNNN.hdf5`/`.xmf`.
        #[arg(long, default_value = "out/sphrs")]
        file_key: String,
    },

    /// Resume a run from a restart snapshot written by a previous `auto_save_interval`.
    Restart {
        /// Path to a TOML `DomainConfig` file (numerical-policy fields only;
        /// particle state comes from `--key`).
        #[arg(short, long)]
        config: PathBuf,

        /// Restart snapshot key (`<key>.hdf5`, written by `save`).
        #[arg(long)]
        key: String,

        /// Simulated time to run to.
        #[arg(long)]
        t_final: f64,

        /// Fixed integration time step.
        #[arg(long)]
        dt: f64,

        /// Simulated time between output snapshots.
        #[arg(long)]
        dt_out: f64,

        /// Output file key for subsequent snapshots.
        #[arg(long, default_value = "out/sphrs")]
        file_key: String,
    },
}
