//! CLI arguments for the `wallet-session` binary.

use {
    clap::{Parser, Subcommand},
    std::path::PathBuf,
};

/// Run a wallet connected contract app from the command line.
#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// The log filter.
    #[arg(long, env, default_value = "warn,wallet_session=debug")]
    pub log: String,

    /// Print the collected metrics before exiting.
    #[arg(long, env)]
    pub metrics: bool,

    /// The app to run.
    #[command(subcommand)]
    pub command: Command,
}

/// The bundled apps.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read and update a greeting stored on Polygon.
    HelloWorld {
        #[arg(long, env)]
        config: PathBuf,
        #[command(subcommand)]
        action: Action,
    },
    /// Read and update a single number.
    SimpleStorage {
        #[arg(long, env)]
        config: PathBuf,
        #[command(subcommand)]
        action: Action,
    },
    /// Read and update a number and a string kept per account.
    MultiStorage {
        #[arg(long, env)]
        config: PathBuf,
        #[command(subcommand)]
        action: Action,
    },
}

impl Command {
    pub fn config(&self) -> &PathBuf {
        match self {
            Command::HelloWorld { config, .. }
            | Command::SimpleStorage { config, .. }
            | Command::MultiStorage { config, .. } => config,
        }
    }

    pub fn action(&self) -> &Action {
        match self {
            Command::HelloWorld { action, .. }
            | Command::SimpleStorage { action, .. }
            | Command::MultiStorage { action, .. } => action,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Show the session and every field's current value.
    Status,
    /// Read a single field, optionally for another account.
    Read {
        field: String,
        #[arg(long, value_name = "ADDRESS")]
        owner: Option<alloy::primitives::Address>,
    },
    /// Store a new value and wait for the transaction to be included.
    Write { field: String, value: String },
    /// Move the wallet onto the app's network.
    Network,
    /// Forget the session. The wallet is not contacted.
    Disconnect,
}
