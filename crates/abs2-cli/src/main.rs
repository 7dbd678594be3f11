//! ABS2 Command-Line Interface
//!
//! Drives the ABS2 QUBO solver web API from the shell: account management,
//! matrix upload, job submission and solution retrieval.
//!
//! Credentials and connection settings are read from flags, from `ABS2_*`
//! environment variables, or from a `.env` file in the working directory.

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use clap::{Parser, Subcommand};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::common::ConnectionArgs;
use commands::{account, job, problem, solution, status};

/// abs2 - client for the ABS2 GPU QUBO solver web API
#[derive(Parser)]
#[command(name = "abs2")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check whether the QUBO solver is working
    Status,

    /// Manage the user account
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Upload and manage QUBO matrices
    Problem {
        #[command(subcommand)]
        action: ProblemAction,
    },

    /// Submit and manage solver jobs
    Job {
        #[command(subcommand)]
        action: JobAction,
    },

    /// Retrieve and manage solutions
    Solution {
        #[command(subcommand)]
        action: SolutionAction,
    },
}

#[derive(Subcommand)]
enum AccountAction {
    /// Register a new account; the password is sent by email
    Signup {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        firstname: String,
        #[arg(long)]
        lastname: String,
        #[arg(long)]
        affiliation: String,
    },

    /// Show account details
    Info,

    /// Print a fresh bearer token
    Token,

    /// Email a new password
    ResetPassword {
        /// Email address the account was registered with
        #[arg(long)]
        email: String,
    },

    /// Email the username registered for an address
    RecoverUsername {
        #[arg(long)]
        email: String,
    },

    /// Change the account password
    ChangePassword {
        #[arg(long, env = "ABS2_NEW_PASSWORD", hide_env_values = true)]
        new_password: String,
    },

    /// Delete the account
    Delete,
}

#[derive(Subcommand)]
enum ProblemAction {
    /// Upload a matrix file in the service's JSON format
    Upload {
        /// Matrix file ({file, nbit, base, qubo})
        #[arg(short, long)]
        file: String,
    },

    /// Encode and upload a symbolic QUBO
    UploadSymbolic {
        /// Terms file: JSON array of [nameA, nameB, weight]
        #[arg(short, long)]
        file: String,

        /// Name to store the matrix under (random if omitted)
        #[arg(short, long)]
        name: Option<String>,

        /// Where to write the index mapping (default: <name>.mapping.json)
        #[arg(short, long)]
        mapping: Option<String>,
    },

    /// Show upload and verification details
    Info {
        /// Matrix file name on the server
        name: String,
    },

    /// List uploaded matrices
    List,

    /// Delete a matrix
    Delete { name: String },

    /// Delete all matrices
    DeleteAll,
}

#[derive(Subcommand)]
enum JobAction {
    /// Queue a job for a verified matrix
    Submit {
        /// Matrix file name on the server
        problem: String,

        /// Solver time limit
        #[arg(short, long, default_value = "30")]
        time_limit: u64,
    },

    /// Show an unexecuted job
    Info { name: String },

    /// List unexecuted jobs
    List,

    /// Delete an unexecuted job
    Delete { name: String },

    /// Delete all unexecuted jobs
    DeleteAll,
}

#[derive(Subcommand)]
enum SolutionAction {
    /// Show the current best solution of a job
    Get {
        /// Solution (job) name
        name: String,

        /// Mapping file written by `problem upload-symbolic`
        #[arg(short, long)]
        mapping: Option<String>,
    },

    /// List solution files
    List,

    /// Delete a solution file
    Delete { name: String },

    /// Delete all solution files
    DeleteAll,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // Setup logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    let conn = &cli.connection;
    let result = match cli.command {
        Commands::Status => status::execute(conn).await,

        Commands::Account { action } => match action {
            AccountAction::Signup {
                username,
                email,
                firstname,
                lastname,
                affiliation,
            } => {
                account::execute_signup(conn, username, email, firstname, lastname, affiliation)
                    .await
            }
            AccountAction::Info => account::execute_info(conn).await,
            AccountAction::Token => account::execute_token(conn).await,
            AccountAction::ResetPassword { email } => {
                account::execute_reset_password(conn, &email).await
            }
            AccountAction::RecoverUsername { email } => {
                account::execute_recover_username(conn, &email).await
            }
            AccountAction::ChangePassword { new_password } => {
                account::execute_change_password(conn, &new_password).await
            }
            AccountAction::Delete => account::execute_delete(conn).await,
        },

        Commands::Problem { action } => match action {
            ProblemAction::Upload { file } => problem::execute_upload(conn, &file).await,
            ProblemAction::UploadSymbolic {
                file,
                name,
                mapping,
            } => {
                problem::execute_upload_symbolic(conn, &file, name.as_deref(), mapping.as_deref())
                    .await
            }
            ProblemAction::Info { name } => problem::execute_info(conn, &name).await,
            ProblemAction::List => problem::execute_list(conn).await,
            ProblemAction::Delete { name } => problem::execute_delete(conn, Some(&name)).await,
            ProblemAction::DeleteAll => problem::execute_delete(conn, None).await,
        },

        Commands::Job { action } => match action {
            JobAction::Submit {
                problem,
                time_limit,
            } => job::execute_submit(conn, &problem, time_limit).await,
            JobAction::Info { name } => job::execute_info(conn, &name).await,
            JobAction::List => job::execute_list(conn).await,
            JobAction::Delete { name } => job::execute_delete(conn, Some(&name)).await,
            JobAction::DeleteAll => job::execute_delete(conn, None).await,
        },

        Commands::Solution { action } => match action {
            SolutionAction::Get { name, mapping } => {
                solution::execute_get(conn, &name, mapping.as_deref()).await
            }
            SolutionAction::List => solution::execute_list(conn).await,
            SolutionAction::Delete { name } => solution::execute_delete(conn, Some(&name)).await,
            SolutionAction::DeleteAll => solution::execute_delete(conn, None).await,
        },
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
