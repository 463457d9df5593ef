//! `invoke`, `update`, `rollback`, `set-description`: run one invocation
//! and print the JSON response on stdout.

use alarmshift_engine::{Action, ConfigError, Invocation, InvocationResponse, invoke};
use anyhow::Context;

use crate::cli::{GlobalOpts, InvokeOpts, RunOpts};
use crate::config;

/// Decode the invocation event from inline JSON or a file.
pub fn read_event(opts: &InvokeOpts) -> anyhow::Result<Invocation> {
    let raw = match (&opts.event, &opts.event_file) {
        (Some(inline), _) => inline.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading event file {}", path.display()))?,
        (None, None) => anyhow::bail!("no invocation event given"),
    };
    serde_json::from_str(&raw).context("decoding invocation event")
}

pub fn shorthand(action: Action, run: &RunOpts) -> Invocation {
    Invocation {
        name_prefix: run.name_prefix.clone(),
        dry_run: run.dry_run,
        ..Invocation::new(action)
    }
}

/// Validate in order (action, snapshot destination, remaining settings)
/// and run the invocation against the fleet file.
pub async fn respond(
    global: &GlobalOpts,
    invocation: &Invocation,
) -> anyhow::Result<InvocationResponse> {
    if let Err(e) = invocation.action() {
        return Ok(InvocationResponse::rejected(e));
    }
    let Some(store) = config::snapshot_store(global) else {
        return Ok(ConfigError::MissingSnapshotDestination.into());
    };
    let settings = match config::engine_settings(global) {
        Ok(settings) => settings,
        Err(e) => return Ok(e.into()),
    };
    let fleet = config::open_fleet(global)?;
    Ok(invoke(&fleet, Some(store), settings, invocation).await)
}

/// Returns `true` when the response is an `{error}`.
pub async fn cmd_invoke(global: &GlobalOpts, invocation: &Invocation) -> anyhow::Result<bool> {
    let response = respond(global, invocation).await?;

    if let InvocationResponse::Rejected { error } = &response {
        tracing::error!(%error, "invocation rejected");
    }
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(response.is_error())
}
