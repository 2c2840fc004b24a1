//! `runwatch` command line client.

mod cli;
mod config;

use std::{
    env,
    io::{self, IsTerminal},
    process::ExitCode,
    sync::Arc,
};

use anyhow::Result;
use clap::Parser;
use runwatch_core::{LogSink, Severity, SessionTarget};
use runwatch_input::{BatchQueue, InputCoordinator, StdinPrompt};
use runwatch_session::{HttpRunApi, SessionDriver, SessionReport};
use runwatch_transport::{ConnectOptions, ConsoleSink};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    cli::{AdminCommand, Cli, Command, RunCommand},
    config::{FileConfig, Settings},
};

const VERBOSE_FILTER: &str = "warn,runwatch=debug";

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.global.verbose);

    match run(cli).await {
        Ok(report) => {
            tracing::debug!(?report, "Finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            console(false).notice(Severity::Error, &format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn console(verbose: bool) -> ConsoleSink<io::Stdout> {
    let color = use_color(io::stdout().is_terminal(), env::var_os("NO_COLOR").is_some());
    ConsoleSink::stdout()
        .with_color(color)
        .with_verbose(verbose)
}

const fn use_color(is_tty: bool, no_color: bool) -> bool {
    is_tty && !no_color
}

fn init_tracing(verbose: bool) {
    let default = if verbose { VERBOSE_FILTER } else { "warn" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .init();
}

async fn run(cli: Cli) -> Result<SessionReport> {
    let file = match config::config_path(cli.global.config.clone()) {
        Some(path) => FileConfig::load(&path)?,
        None => FileConfig::default(),
    };
    let locale = env::var("LANG").ok();
    let settings = Settings::resolve(file, cli.global.overrides(), locale.as_deref())?;

    let sink = console(cli.global.verbose);
    let options = ConnectOptions {
        insecure: settings.insecure,
    };

    let report = match cli.command {
        Command::Run {
            command: RunCommand::Log { run_name, batch },
        } => {
            let api = Arc::new(HttpRunApi::new(settings.api_config())?);
            let target = SessionTarget::run(run_name.as_str());
            let coordinator = InputCoordinator::new(
                api,
                run_name,
                BatchQueue::new(batch),
                Box::new(StdinPrompt::stdin()),
            );
            SessionDriver::connect(
                &target,
                &settings.server_url,
                &settings.access_token,
                options,
                sink,
            )
            .await?
            .with_input_gate(Box::new(coordinator))
            .run()
            .await?
        }
        Command::Admin {
            command: AdminCommand::Log { audit_id },
        } => {
            let target = SessionTarget::admin_audit(&audit_id);
            SessionDriver::connect(
                &target,
                &settings.server_url,
                &settings.access_token,
                options,
                sink,
            )
            .await?
            .run()
            .await?
        }
    };

    Ok(report)
}
