//! Request bodies and typed response models for the ABS2 web API.
//!
//! Each response model mirrors one documented server JSON shape. Models are
//! decoded from an [`ApiResponse`] with [`ApiResponse::into_model`], which
//! fails with [`Abs2Error::Decode`] naming the model and the offending field.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::encode::{KeyMapping, SymbolicQubo};
use crate::error::{Abs2Error, Abs2Result};

// ---------------------------------------------------------------------------
// Generic response
// ---------------------------------------------------------------------------

/// Successful (2xx) response returned by the REST adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Canonical reason phrase for the status code (e.g. `OK`, `Accepted`).
    ///
    /// This is the standard phrase for the code, not the text the server
    /// put on its status line; empty for codes without one.
    pub message: String,
    /// Decoded JSON body; a `null` body becomes an empty object.
    pub data: serde_json::Value,
}

impl ApiResponse {
    pub fn new(status_code: u16, message: impl Into<String>, data: serde_json::Value) -> Self {
        let data = if data.is_null() {
            serde_json::Value::Object(serde_json::Map::new())
        } else {
            data
        };
        Self {
            status_code,
            message: message.into(),
            data,
        }
    }

    /// Decode the body into a typed model.
    pub fn into_model<T: DeserializeOwned>(self) -> Abs2Result<T> {
        serde_json::from_value(self.data).map_err(|e| Abs2Error::decode(model_name::<T>(), e))
    }
}

fn model_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    full.rsplit("::").next().unwrap_or(full)
}

/// Accepts a JSON string or number and keeps it as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Users and authentication
// ---------------------------------------------------------------------------

/// Registration data for a new account (`POST /signup`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub affiliation: String,
}

impl User {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        affiliation: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            firstname: firstname.into(),
            lastname: lastname.into(),
            affiliation: affiliation.into(),
        }
    }
}

/// Username and password pair.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Account details returned by `POST /account`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredUserInformation {
    pub username: String,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub affiliation: String,
    /// Number of jobs the account has run.
    pub jobs: i64,
}

/// Bearer token returned by `POST /token`.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenMessage {
    pub message: String,
    pub access_token: String,
}

impl std::fmt::Debug for TokenMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenMessage")
            .field("message", &self.message)
            .field("access_token", &"[REDACTED]")
            .finish()
    }
}

/// Service status returned by `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StatusInformation {
    pub message: String,
    /// Whether the solver is currently accepting work.
    pub active: bool,
    pub jobs_in_queue: i64,
    pub total_time_limit: i64,
    pub uri_root: String,
    pub uri_signup: String,
    pub uri_account: String,
    pub uri_token: String,
    pub uri_problems: String,
    pub uri_jobs: String,
    pub uri_solutions: String,
}

// ---------------------------------------------------------------------------
// QUBO matrices
// ---------------------------------------------------------------------------

/// One `[indexA, indexB, weight]` element of a dense QUBO matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuboEntry(pub usize, pub usize, pub i64);

/// Dense, index-addressed QUBO matrix in the service's upload format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuboMatrix {
    /// File name the matrix is stored under on the server.
    pub file: String,
    /// Number of variables; the service requires at least 32.
    pub nbit: usize,
    pub base: i64,
    pub qubo: Vec<QuboEntry>,
}

impl QuboMatrix {
    /// Serialize to the JSON upload format.
    pub fn to_json(&self) -> Abs2Result<String> {
        serde_json::to_string(self).map_err(|e| Abs2Error::encode("QuboMatrix", e))
    }
}

/// Verification parameters reported for an uploaded matrix.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MatrixParameters {
    pub problem: String,
    pub nbit: i64,
    pub base: i64,
}

/// Response to a matrix upload (`POST /problems`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuboMatrixUploadMsg {
    pub message: String,
    pub file: String,
    pub uri_problem: String,
}

/// Upload result for a matrix produced from a [`SymbolicQubo`].
///
/// Keeps the original problem and the index mapping so solutions can be
/// translated back to variable names.
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolicUploadMsg {
    pub status_code: u16,
    pub message: String,
    pub file: String,
    pub uri_problem: String,
    pub qubo: SymbolicQubo,
    pub key_mapping: KeyMapping,
}

impl SymbolicUploadMsg {
    /// Map a solver bit vector back to variable names.
    pub fn decode_solution(&self, solution: &[i64]) -> BTreeMap<String, i64> {
        self.key_mapping.decode_solution(solution)
    }
}

impl std::fmt::Display for SymbolicUploadMsg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SymbolicUploadMsg(message={}, file={}, uri_problem={})",
            self.message, self.file, self.uri_problem
        )
    }
}

/// Information about an uploaded matrix (`GET /problems/{file}`).
///
/// The optional fields appear once verification has finished; `verify`
/// tells whether it succeeded.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuboMatrixInformation {
    pub file: String,
    pub bytes: i64,
    #[serde(deserialize_with = "string_or_number")]
    pub time: String,
    pub uri_problem: String,
    #[serde(default)]
    pub verify: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub nbit: Option<i64>,
    #[serde(default)]
    pub nelement: Option<i64>,
    #[serde(default)]
    pub minval: Option<i64>,
    #[serde(default)]
    pub maxval: Option<i64>,
    #[serde(default)]
    pub parameters: Option<MatrixParameters>,
}

impl QuboMatrixInformation {
    /// Whether verification has finished, successfully or not.
    pub fn is_verified(&self) -> bool {
        self.verify.is_some()
    }
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// Parameters a job was submitted with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobParameters {
    pub problem: String,
    #[serde(deserialize_with = "string_or_number")]
    pub time_limit: String,
}

/// Response to a job submission (`POST /jobs`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PostJobSuccessMsg {
    pub message: String,
    /// Job name; also the name of its solution file.
    pub job: String,
    pub uri_problem: String,
    pub uri_job: String,
    pub uri_solution: String,
}

/// Information about an unexecuted job (`GET /jobs/{name}`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobInformation {
    pub job: String,
    pub problem: String,
    pub nbit: i64,
    pub minval: i64,
    pub maxval: i64,
    pub parameters: JobParameters,
}

// ---------------------------------------------------------------------------
// Solutions
// ---------------------------------------------------------------------------

/// Solver parameters reported alongside a solution.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SolutionParameters {
    pub time_limit: i64,
    pub target_energy: i64,
    pub bfactor: f64,
    pub factor: f64,
    pub nsolpool: i64,
    pub ngpu: i64,
    pub nisland_per_gpu: i64,
    pub nisland: i64,
    pub value_bits: i64,
    pub arithmetic_bits: i64,
}

/// Current best solution for a job (`GET /solutions/{name}`).
///
/// The solver overwrites the solution file whenever it finds a better one;
/// `terminated` turns true when it stops, and `success` is false after an
/// abnormal termination.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SolutionInformation {
    pub terminated: bool,
    pub problem: String,
    pub job: String,
    pub energy: i64,
    /// Time to solution, in seconds.
    pub tts: f64,
    /// Bit assignment indexed by matrix variable.
    pub solution: Vec<i64>,
    pub parameters: SolutionParameters,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub kernel_time: Option<f64>,
}
