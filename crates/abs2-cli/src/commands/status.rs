//! Status command implementation.

use anyhow::{Context, Result};
use console::style;

use super::common::ConnectionArgs;

/// Execute the status command.
pub async fn execute(conn: &ConnectionArgs) -> Result<()> {
    let api = conn.api()?;
    let status = api
        .get_status()
        .await
        .context("Failed to query solver status")?;

    let state = if status.active {
        style("active").green().bold()
    } else {
        style("inactive").red().bold()
    };

    println!("{} {}", style("→").cyan().bold(), status.message);
    println!("  {:<18} {}", style("Solver:").bold(), state);
    println!("  {:<18} {}", style("Jobs in queue:").bold(), status.jobs_in_queue);
    println!(
        "  {:<18} {}s",
        style("Queued time:").bold(),
        status.total_time_limit
    );
    println!("  {:<18} {}", style("Problems:").bold(), status.uri_problems);
    println!("  {:<18} {}", style("Jobs:").bold(), status.uri_jobs);
    println!("  {:<18} {}", style("Solutions:").bold(), status.uri_solutions);

    Ok(())
}
