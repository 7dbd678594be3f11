//! Solution command implementations.

use anyhow::{Context, Result};
use console::style;

use super::common::{ConnectionArgs, MappingFile, print_response};

/// Show the current best solution of a job.
///
/// With a mapping file the bit vector is printed per variable name.
pub async fn execute_get(conn: &ConnectionArgs, name: &str, mapping: Option<&str>) -> Result<()> {
    let mapping = mapping.map(MappingFile::load).transpose()?;

    let (api, token) = conn.authorized().await?;
    let solution = api
        .get_solution(&token, name)
        .await
        .with_context(|| format!("Failed to get solution '{name}'"))?;

    let state = match (solution.terminated, solution.success) {
        (false, _) => style("running").yellow().bold(),
        (true, Some(false)) => style("aborted").red().bold(),
        (true, _) => style("terminated").green().bold(),
    };

    println!("{} {}", style("→").cyan().bold(), style(&solution.job).bold());
    println!("  {:<10} {}", style("State:").bold(), state);
    println!("  {:<10} {}", style("Problem:").bold(), solution.problem);
    println!("  {:<10} {}", style("Energy:").bold(), solution.energy);
    println!("  {:<10} {:.3}s", style("TTS:").bold(), solution.tts);

    match mapping {
        Some(mapping) => {
            if mapping.file != solution.problem {
                tracing::warn!(
                    "mapping was saved for '{}' but the solution is for '{}'",
                    mapping.file,
                    solution.problem
                );
            }
            println!("\n{}", style("Assignment:").bold());
            for (var, bit) in mapping.key_mapping().decode_solution(&solution.solution) {
                println!("  {var:<20} {bit}");
            }
        }
        None => {
            let bits: String = solution
                .solution
                .iter()
                .map(|b| b.to_string())
                .collect();
            println!("  {:<10} {}", style("Solution:").bold(), bits);
        }
    }
    Ok(())
}

/// List solution files.
pub async fn execute_list(conn: &ConnectionArgs) -> Result<()> {
    let (api, token) = conn.authorized().await?;
    let response = api
        .get_all_solutions(&token)
        .await
        .context("Failed to list solutions")?;
    print_response(&response)
}

/// Delete one solution file, or all of them when `name` is `None`.
pub async fn execute_delete(conn: &ConnectionArgs, name: Option<&str>) -> Result<()> {
    let (api, token) = conn.authorized().await?;
    let response = match name {
        Some(name) => api
            .delete_solution(&token, name)
            .await
            .with_context(|| format!("Failed to delete solution '{name}'"))?,
        None => api
            .delete_all_solutions(&token)
            .await
            .context("Failed to delete solutions")?,
    };
    print_response(&response)
}
