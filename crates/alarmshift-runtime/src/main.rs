//! alarmshift: bulk, reversible alarm threshold migrations.
//! Runs the engine against a JSON fleet file; responses go to stdout as
//! JSON, logs to stderr.

use alarmshift_engine::Action;
use clap::Parser;

mod cli;
mod cmd_invoke;
mod cmd_snapshot;
mod config;

fn init_tracing() {
    let filter = std::env::var("ALARMSHIFT_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    init_tracing();

    let invocation = match &args.command {
        cli::Command::Invoke(opts) => cmd_invoke::read_event(opts)?,
        cli::Command::Update(run) => cmd_invoke::shorthand(Action::Update, run),
        cli::Command::Rollback(opts) => alarmshift_engine::Invocation {
            strategy: opts.strategy,
            ..cmd_invoke::shorthand(Action::Rollback, &opts.run)
        },
        cli::Command::SetDescription(run) => cmd_invoke::shorthand(Action::SetDescription, run),
        cli::Command::Snapshot(cli::SnapshotCommand::Show { alarm }) => {
            return cmd_snapshot::cmd_show(&args.global, alarm);
        }
    };

    let rejected = cmd_invoke::cmd_invoke(&args.global, &invocation).await?;
    if rejected {
        std::process::exit(1);
    }
    Ok(())
}
