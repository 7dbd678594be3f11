//! Job command implementations.

use anyhow::{Context, Result};
use console::style;

use super::common::{ConnectionArgs, print_response};

/// Queue a job for a verified matrix.
pub async fn execute_submit(conn: &ConnectionArgs, problem: &str, time_limit: u64) -> Result<()> {
    let (api, token) = conn.authorized().await?;
    let job = api
        .post_job(&token, problem, time_limit)
        .await
        .with_context(|| format!("Failed to submit job for '{problem}'"))?;

    println!("{} {}", style("✓").green().bold(), job.message);
    println!("  {:<10} {}", style("Job:").bold(), style(&job.job).cyan());
    println!("  {:<10} {}", style("Problem:").bold(), job.uri_problem);
    println!("  {:<10} {}", style("Solution:").bold(), job.uri_solution);
    println!(
        "\nFetch the result with: {}",
        style(format!("abs2 solution get {}", job.job)).dim()
    );
    Ok(())
}

/// Show an unexecuted job.
pub async fn execute_info(conn: &ConnectionArgs, name: &str) -> Result<()> {
    let (api, token) = conn.authorized().await?;
    let job = api
        .get_job_information(&token, name)
        .await
        .with_context(|| format!("Failed to get job '{name}'"))?;

    println!("{} {}", style("→").cyan().bold(), style(&job.job).bold());
    println!("  {:<12} {}", style("Problem:").bold(), job.problem);
    println!("  {:<12} {}", style("Bits:").bold(), job.nbit);
    println!("  {:<12} [{}, {}]", style("Weights:").bold(), job.minval, job.maxval);
    println!("  {:<12} {}s", style("Time limit:").bold(), job.parameters.time_limit);
    Ok(())
}

/// List unexecuted jobs.
pub async fn execute_list(conn: &ConnectionArgs) -> Result<()> {
    let (api, token) = conn.authorized().await?;
    let response = api
        .get_all_jobs(&token)
        .await
        .context("Failed to list jobs")?;
    print_response(&response)
}

/// Delete one unexecuted job, or all of them when `name` is `None`.
pub async fn execute_delete(conn: &ConnectionArgs, name: Option<&str>) -> Result<()> {
    let (api, token) = conn.authorized().await?;
    let response = match name {
        Some(name) => api
            .delete_job(&token, name)
            .await
            .with_context(|| format!("Failed to delete job '{name}'"))?,
        None => api
            .delete_all_unexecuted_jobs(&token)
            .await
            .context("Failed to delete jobs")?,
    };
    print_response(&response)
}
