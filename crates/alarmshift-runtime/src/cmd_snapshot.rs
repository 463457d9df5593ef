//! `snapshot show <alarm>`: print the stored snapshot document.

use crate::cli::GlobalOpts;
use crate::config;

pub fn cmd_show(global: &GlobalOpts, alarm: &str) -> anyhow::Result<()> {
    let Some(store) = config::snapshot_store(global) else {
        anyhow::bail!("no snapshot destination configured (set --snapshot-root or SNAPSHOT_ROOT)");
    };
    match store.read(alarm)? {
        Some(doc) => println!("{}", serde_json::to_string_pretty(&doc)?),
        None => anyhow::bail!("no snapshot stored for {alarm:?}"),
    }
    Ok(())
}
