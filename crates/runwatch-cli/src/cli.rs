//! Command line definition.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::{CONFIG_ENV, Overrides};

#[derive(Debug, Parser)]
#[command(name = "runwatch", version, about = "Stream pipeline run and admin logs")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Config file path
    #[arg(short = 'c', long, global = true, env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Server URL, e.g. https://ci.example.com
    #[arg(short = 's', long, global = true)]
    pub server_url: Option<String>,

    /// Access token
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Language sent to the server (EN or ZH)
    #[arg(long, global = true)]
    pub language: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Show debug output and raw records
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    #[must_use]
    pub fn overrides(&self) -> Overrides {
        Overrides {
            server_url: self.server_url.clone(),
            token: self.token.clone(),
            timeout: self.timeout,
            language: self.language.clone(),
            insecure: self.insecure,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pipeline run commands
    Run {
        #[command(subcommand)]
        command: RunCommand,
    },
    /// Admin commands
    Admin {
        #[command(subcommand)]
        command: AdminCommand,
    },
}

#[derive(Debug, Subcommand)]
pub enum RunCommand {
    /// Follow the logs of a run, answering its input gates
    Log {
        run_name: String,

        /// Answers for input gates, in order, e.g. approve,reject
        #[arg(short = 'b', long, value_delimiter = ',')]
        batch: Vec<String>,
    },
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Follow the logs of an admin audit
    Log { audit_id: String },
}
