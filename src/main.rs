// ABOUTME: Entry point for the gssh CLI application.
// ABOUTME: Resolves a password, connects, runs one session, and exits with its code.

mod cli;

use clap::Parser;
use cli::Cli;
use gssh::credentials::{CredentialResolver, PasswordSource, TerminalPrompt};
use gssh::error::Result;
use gssh::session::{
    Console, ExitOutcome, LocalIo, LocalTerminal, Mode, Orchestrator, SessionPlan,
};
use gssh::ssh::{Connection, ConnectionConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "GSSH_LOG";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // GSSH_LOG wins over --debug
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if cli.debug {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let code = match run(cli).await {
        Ok(outcome) => {
            if let Some(message) = outcome.diagnostic() {
                eprintln!("gssh: {message}");
            }
            outcome.exit_code()
        }
        Err(e) => {
            eprintln!("gssh: {e}");
            1
        }
    };

    // The stdin reader can still be parked in a blocking read; don't wait for it.
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<ExitOutcome> {
    let target = cli.target();
    let options = cli.options();
    let terminal: Arc<dyn LocalTerminal> = Arc::new(Console);
    let mode = Mode::select(terminal.as_ref());
    tracing::debug!("target {} in {:?} mode", target, mode);

    let credential = CredentialResolver::new(
        PasswordSource::locate(options.password_file.as_deref()),
        TerminalPrompt,
    )
    .explicit(cli.password)
    .interactive(mode == Mode::Interactive)
    .resolve(&target)?;

    let connection =
        Connection::connect(ConnectionConfig::for_target(&target), &credential).await?;
    drop(credential);
    let channel = connection.open_session().await?;

    let plan = SessionPlan::new(mode, &target, &options);
    let forward_signals = plan.forward_signals;
    let orchestrator = with_signals(Orchestrator::new(plan, terminal), forward_signals);
    let outcome = orchestrator.run(channel, LocalIo::process()).await;

    if let Err(e) = connection.disconnect().await {
        tracing::warn!("disconnect failed: {}", e);
    }
    Ok(outcome)
}

#[cfg(unix)]
fn with_signals(orchestrator: Orchestrator, forward: bool) -> Orchestrator {
    use gssh::session::UnixSignals;

    if !forward {
        return orchestrator;
    }
    match UnixSignals::register() {
        Ok(signals) => orchestrator.signals(Box::new(signals)),
        Err(e) => {
            tracing::warn!("cannot watch for terminal resizes: {}", e);
            orchestrator
        }
    }
}

#[cfg(not(unix))]
fn with_signals(orchestrator: Orchestrator, _forward: bool) -> Orchestrator {
    orchestrator
}
