//! Shared helpers for CLI commands.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::{Deserialize, Serialize};
use tracing::warn;

use abs2_client::config::{DEFAULT_API_VERSION, DEFAULT_HOST};
use abs2_client::{Abs2Api, Abs2Config, ApiResponse, Credentials, KeyMapping, SymbolicQubo};

/// Connection and credential flags shared by every command.
#[derive(Debug, Args)]
pub struct ConnectionArgs {
    /// Solver hostname (without scheme)
    #[arg(long, env = "ABS2_HOST", default_value = DEFAULT_HOST, global = true)]
    pub host: String,

    /// API version path segment
    #[arg(long, env = "ABS2_API_VERSION", default_value = DEFAULT_API_VERSION, global = true)]
    pub api_version: String,

    /// API key sent as x-api-key
    #[arg(long, env = "ABS2_API_KEY", default_value = "", hide_env_values = true, global = true)]
    pub api_key: String,

    /// Skip TLS certificate verification
    #[arg(long, global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "ABS2_TIMEOUT_SECS", global = true)]
    pub timeout: Option<u64>,

    /// Account username
    #[arg(short, long, env = "ABS2_USERNAME", global = true)]
    pub username: Option<String>,

    /// Account password
    #[arg(short, long, env = "ABS2_PASSWORD", hide_env_values = true, global = true)]
    pub password: Option<String>,
}

impl ConnectionArgs {
    /// Client configuration for these flags.
    pub fn config(&self) -> Abs2Config {
        let mut config = Abs2Config::new()
            .with_host(&self.host)
            .with_api_version(&self.api_version)
            .with_api_key(&self.api_key)
            .with_ssl_verify(!self.insecure);
        if let Some(secs) = self.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        config
    }

    /// Build an API client.
    pub fn api(&self) -> Result<Abs2Api> {
        Abs2Api::new(&self.config()).context("Failed to create ABS2 client")
    }

    /// Configured username and password.
    pub fn credentials(&self) -> Result<Credentials> {
        let username = self
            .username
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Missing username: pass --username or set ABS2_USERNAME"))?;
        let password = self
            .password
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("Missing password: pass --password or set ABS2_PASSWORD"))?;
        Ok(Credentials::new(username, password))
    }

    /// Client plus a bearer token for the configured account.
    pub async fn authorized(&self) -> Result<(Abs2Api, String)> {
        let api = self.api()?;
        let creds = self.credentials()?;
        let token = api
            .retrieve_access_token(&creds.username, &creds.password)
            .await
            .context("Failed to retrieve access token")?;
        Ok((api, token.access_token))
    }
}

/// Print a generic response: status line plus pretty JSON body.
pub fn print_response(response: &ApiResponse) -> Result<()> {
    println!(
        "{} {} {}",
        style("→").cyan().bold(),
        response.status_code,
        response.message
    );
    print_json(&response.data)
}

/// Pretty-print a JSON value.
pub fn print_json(value: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Load a symbolic QUBO from a JSON array of `[nameA, nameB, weight]`.
///
/// A pair listed twice keeps its last weight.
pub fn load_terms(path: &str) -> Result<SymbolicQubo> {
    let source =
        fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?;
    let terms: Vec<(String, String, f64)> = serde_json::from_str(&source)
        .with_context(|| format!("Expected [[nameA, nameB, weight], ...] in {path}"))?;

    let mut qubo = SymbolicQubo::new();
    for (a, b, weight) in terms {
        if let Some(previous) = qubo.insert((a.clone(), b.clone()), weight) {
            warn!("duplicate term ({a}, {b}): {previous} replaced by {weight}");
        }
    }
    Ok(qubo)
}

/// Index mapping persisted next to an uploaded symbolic problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingFile {
    /// Matrix file name on the server.
    pub file: String,
    /// Variable names in index order.
    pub names: Vec<String>,
}

impl MappingFile {
    pub fn new(file: impl Into<String>, mapping: &KeyMapping) -> Self {
        Self {
            file: file.into(),
            names: mapping.names().to_vec(),
        }
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).with_context(|| format!("Failed to write mapping: {path}"))
    }

    pub fn load(path: &str) -> Result<Self> {
        let source =
            fs::read_to_string(path).with_context(|| format!("Failed to read mapping: {path}"))?;
        serde_json::from_str(&source).with_context(|| format!("Invalid mapping file: {path}"))
    }

    pub fn key_mapping(&self) -> KeyMapping {
        KeyMapping::from_ordered_names(self.names.clone())
    }
}

/// Default mapping path for a server file name: `abc.json` → `abc.mapping.json`.
pub fn default_mapping_path(file: &str) -> String {
    let stem = Path::new(file)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(file);
    format!("{stem}.mapping.json")
}
