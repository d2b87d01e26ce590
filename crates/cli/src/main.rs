// Copyright (c) 2025 Varshith Gudur. Licensed under AGPLv3.
use clap::{Parser, Subcommand};
use mipsvm_state::StateVersion;
use mipsvm_state_cli::commands::{detect, inspect, versions, wrap};
use mipsvm_state_cli::telemetry;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "vmstate")]
#[command(about = "Inspect and package MIPS VM state snapshots", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the state version of one or more files.
    /// Files ending in .json or .json.gz are reported as textual without being read.
    Detect {
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show version, compression and payload digest of a state file
    Inspect {
        path: PathBuf,
    },
    /// List the known state versions
    Versions {
        #[arg(long)]
        json: bool,
    },
    /// Wrap an opaque payload in a versioned state container
    Wrap {
        /// Version name or number
        #[arg(long)]
        state_version: StateVersion,

        #[arg(long, short)]
        input: PathBuf,

        /// Output path; a .gz suffix enables gzip framing
        #[arg(long, short)]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    telemetry::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Detect { paths, json } => detect::run(&paths, json),
        Commands::Inspect { path } => inspect::run(&path),
        Commands::Versions { json } => versions::run(json),
        Commands::Wrap {
            state_version,
            input,
            output,
        } => wrap::run(state_version, &input, &output),
    }
}
