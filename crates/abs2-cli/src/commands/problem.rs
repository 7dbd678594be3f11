//! Problem (QUBO matrix) command implementations.

use anyhow::{Context, Result};
use console::style;
use tracing::info;

use super::common::{ConnectionArgs, MappingFile, default_mapping_path, load_terms, print_response};

/// Upload a matrix file as-is.
pub async fn execute_upload(conn: &ConnectionArgs, file: &str) -> Result<()> {
    let (api, token) = conn.authorized().await?;
    let upload = api
        .post_qubo_matrix_file(&token, file)
        .await
        .with_context(|| format!("Failed to upload {file}"))?;

    println!("{} {}", style("✓").green().bold(), upload.message);
    println!("  {:<10} {}", style("File:").bold(), upload.file);
    println!("  {:<10} {}", style("URI:").bold(), upload.uri_problem);
    Ok(())
}

/// Encode a symbolic QUBO, upload it and save the index mapping.
pub async fn execute_upload_symbolic(
    conn: &ConnectionArgs,
    file: &str,
    name: Option<&str>,
    mapping: Option<&str>,
) -> Result<()> {
    let qubo = load_terms(file)?;
    info!("Loaded {} terms from {}", qubo.len(), file);

    let (api, token) = conn.authorized().await?;
    let upload = api
        .post_symbolic_qubo(&token, &qubo, name)
        .await
        .context("Failed to upload symbolic QUBO")?;

    let mapping_path = mapping
        .map(str::to_string)
        .unwrap_or_else(|| default_mapping_path(&upload.file));
    MappingFile::new(&upload.file, &upload.key_mapping).save(&mapping_path)?;

    println!("{} {}", style("✓").green().bold(), upload.message);
    println!("  {:<10} {}", style("File:").bold(), upload.file);
    println!("  {:<10} {}", style("URI:").bold(), upload.uri_problem);
    println!(
        "  {:<10} {} ({} variables)",
        style("Mapping:").bold(),
        mapping_path,
        upload.key_mapping.len()
    );
    Ok(())
}

/// Show upload and verification details.
pub async fn execute_info(conn: &ConnectionArgs, name: &str) -> Result<()> {
    let (api, token) = conn.authorized().await?;
    let info = api
        .get_qubo_matrix_information(&token, name)
        .await
        .with_context(|| format!("Failed to get problem '{name}'"))?;

    let verified = match info.verify {
        Some(true) => style("passed").green().bold(),
        Some(false) => style("failed").red().bold(),
        None => style("in progress").yellow().bold(),
    };

    println!("{} {}", style("→").cyan().bold(), style(&info.file).bold());
    println!("  {:<14} {} bytes", style("Size:").bold(), info.bytes);
    println!("  {:<14} {}", style("Uploaded:").bold(), info.time);
    println!("  {:<14} {}", style("Verification:").bold(), verified);
    if let Some(message) = &info.message {
        println!("  {:<14} {}", style("Message:").bold(), message);
    }
    if let (Some(nbit), Some(nelement)) = (info.nbit, info.nelement) {
        println!("  {:<14} {} bits, {} elements", style("Matrix:").bold(), nbit, nelement);
    }
    if let (Some(minval), Some(maxval)) = (info.minval, info.maxval) {
        println!("  {:<14} [{}, {}]", style("Weights:").bold(), minval, maxval);
    }
    Ok(())
}

/// List uploaded matrices.
pub async fn execute_list(conn: &ConnectionArgs) -> Result<()> {
    let (api, token) = conn.authorized().await?;
    let response = api
        .get_all_problems(&token)
        .await
        .context("Failed to list problems")?;
    print_response(&response)
}

/// Delete one matrix, or all of them when `name` is `None`.
pub async fn execute_delete(conn: &ConnectionArgs, name: Option<&str>) -> Result<()> {
    let (api, token) = conn.authorized().await?;
    let response = match name {
        Some(name) => api
            .delete_qubo_matrix(&token, name)
            .await
            .with_context(|| format!("Failed to delete problem '{name}'"))?,
        None => api
            .delete_all_qubo_matrices(&token)
            .await
            .context("Failed to delete problems")?,
    };
    print_response(&response)
}
