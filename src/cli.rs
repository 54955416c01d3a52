use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "lakeboot",
    version,
    about = "Bootstrap a local lakehouse catalog from public hospital datasets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download and unpack the source archives into the lakehouse tree.
    Acquire(AcquireArgs),
    /// Materialize staged raw files into typed catalog tables.
    Bootstrap(BootstrapArgs),
    /// Register the exploration notebook into the shared catalog store.
    Register(RegisterArgs),
    /// Report catalog table counts and staged file presence.
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AcquireArgs {
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct BootstrapArgs {
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,

    #[arg(long, default_value = ".duckdb/ntb_exploration.json")]
    pub artifact: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = ".")]
    pub base_dir: PathBuf,
}
