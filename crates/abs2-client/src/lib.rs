//! Client for the ABS2 QUBO Solver Web API
//!
//! This crate wraps the REST API of the ABS2 GPU QUBO solver
//! (`https://qubosolver.cs.hiroshima-u.ac.jp/v1/`): account management,
//! bearer-token authentication, matrix upload and verification polling, job
//! submission and solution retrieval. All solving happens server-side.
//!
//! # Layers
//!
//! | Module      | Role                                                      |
//! |-------------|-----------------------------------------------------------|
//! | [`adapter`] | Generic HTTP request/response handling and classification |
//! | [`api`]     | One method per endpoint, typed results                    |
//! | [`encode`]  | Symbolic QUBO → dense matrix, solution decoding           |
//! | [`models`]  | Request bodies and response models                        |
//!
//! # Authentication
//!
//! Every request carries the configured `x-api-key` header. Endpoints under
//! `problems`, `jobs` and `solutions` additionally need the bearer token from
//! [`Abs2Api::retrieve_access_token`]. The token is held by the caller and
//! passed to each call; expiry shows up as an [`Abs2Error::Api`] with status
//! 401.
//!
//! # Example
//!
//! ```ignore
//! use abs2_client::{Abs2Api, Abs2Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = Abs2Api::new(&Abs2Config::from_env())?;
//!     let status = api.get_status().await?;
//!     println!("active: {}, queued jobs: {}", status.active, status.jobs_in_queue);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod api;
pub mod config;
pub mod encode;
mod error;
pub mod models;

pub use adapter::RestAdapter;
pub use api::Abs2Api;
pub use config::Abs2Config;
pub use encode::{EncodedQubo, KeyMapping, SymbolicQubo, encode};
pub use error::{Abs2Error, Abs2Result};
pub use models::{
    ApiResponse, Credentials, JobInformation, JobParameters, MatrixParameters, PostJobSuccessMsg,
    QuboEntry, QuboMatrix, QuboMatrixInformation, QuboMatrixUploadMsg,
    RegisteredUserInformation, SolutionInformation, SolutionParameters, StatusInformation,
    SymbolicUploadMsg, TokenMessage, User,
};
