//! Account command implementations.

use anyhow::{Context, Result};
use console::style;

use abs2_client::User;

use super::common::{ConnectionArgs, print_response};

/// Register a new account.
pub async fn execute_signup(
    conn: &ConnectionArgs,
    username: String,
    email: String,
    firstname: String,
    lastname: String,
    affiliation: String,
) -> Result<()> {
    let api = conn.api()?;
    let user = User::new(username, email, firstname, lastname, affiliation);
    let response = api
        .register_user(&user)
        .await
        .with_context(|| format!("Failed to register '{}'", user.username))?;

    print_response(&response)?;
    println!(
        "\n{} The password has been sent to {}",
        style("✓").green().bold(),
        user.email
    );
    Ok(())
}

/// Show account details.
pub async fn execute_info(conn: &ConnectionArgs) -> Result<()> {
    let api = conn.api()?;
    let creds = conn.credentials()?;
    let info = api
        .retrieve_user_information(&creds.username, &creds.password)
        .await
        .context("Failed to retrieve account information")?;

    println!("{} {}", style("→").cyan().bold(), style(&info.username).bold());
    println!("  {:<13} {}", style("Email:").bold(), info.email);
    println!(
        "  {:<13} {} {}",
        style("Name:").bold(),
        info.firstname,
        info.lastname
    );
    println!("  {:<13} {}", style("Affiliation:").bold(), info.affiliation);
    println!("  {:<13} {}", style("Jobs:").bold(), info.jobs);
    Ok(())
}

/// Print a fresh bearer token.
pub async fn execute_token(conn: &ConnectionArgs) -> Result<()> {
    let (_, token) = conn.authorized().await?;
    println!("{token}");
    Ok(())
}

/// Request a new password by email.
pub async fn execute_reset_password(conn: &ConnectionArgs, email: &str) -> Result<()> {
    let api = conn.api()?;
    let username = conn
        .username
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("Missing username: pass --username or set ABS2_USERNAME"))?;
    let response = api
        .retrieve_new_password(username, email)
        .await
        .context("Failed to request a new password")?;
    print_response(&response)
}

/// Request the username registered for an address.
pub async fn execute_recover_username(conn: &ConnectionArgs, email: &str) -> Result<()> {
    let api = conn.api()?;
    let response = api
        .retrieve_new_username(email)
        .await
        .context("Failed to request username")?;
    print_response(&response)
}

/// Change the account password.
pub async fn execute_change_password(conn: &ConnectionArgs, new_password: &str) -> Result<()> {
    let api = conn.api()?;
    let creds = conn.credentials()?;
    let response = api
        .change_password(&creds.username, &creds.password, new_password)
        .await
        .context("Failed to change password")?;
    print_response(&response)
}

/// Delete the account.
pub async fn execute_delete(conn: &ConnectionArgs) -> Result<()> {
    let (api, token) = conn.authorized().await?;
    let response = api
        .delete_user_account(&token)
        .await
        .context("Failed to delete account")?;
    print_response(&response)
}
