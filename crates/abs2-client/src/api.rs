//! ABS2 API facade.
//!
//! One method per web API endpoint. Methods forward their arguments to the
//! [`RestAdapter`] with a fixed verb and path and decode the response into
//! the endpoint's model. Resource names are escaped into a single path
//! segment; nothing else is validated beyond type coercion and nothing is
//! retried.

use std::path::Path;

use serde_json::json;
use tracing::{Span, debug, instrument};

use crate::adapter::{RestAdapter, bearer, resource_path};
use crate::config::Abs2Config;
use crate::encode::{SymbolicQubo, encode};
use crate::error::{Abs2Error, Abs2Result};
use crate::models::{
    ApiResponse, JobInformation, PostJobSuccessMsg, QuboMatrix, QuboMatrixInformation,
    QuboMatrixUploadMsg, RegisteredUserInformation, SolutionInformation, StatusInformation,
    SymbolicUploadMsg, TokenMessage, User,
};

/// Typed client for the ABS2 QUBO solver.
///
/// Authorized methods take the bearer token returned by
/// [`Abs2Api::retrieve_access_token`]; the client never stores it.
///
/// # Example
///
/// ```ignore
/// use abs2_client::{Abs2Api, Abs2Config, SymbolicQubo};
///
/// let api = Abs2Api::new(&Abs2Config::from_env())?;
/// let token = api.retrieve_access_token("alice", "secret").await?.access_token;
///
/// let mut qubo = SymbolicQubo::new();
/// qubo.insert(("s1".into(), "s1".into()), -160.0);
/// qubo.insert(("s1".into(), "s2".into()), 64.0);
/// qubo.insert(("s2".into(), "s2".into()), -96.0);
///
/// let upload = api.post_symbolic_qubo(&token, &qubo, None).await?;
/// let job = api.post_job(&token, &upload.file, 30).await?;
/// let solution = api.get_solution(&token, &job.job).await?;
/// println!("{:?}", upload.decode_solution(&solution.solution));
/// ```
#[derive(Debug, Clone)]
pub struct Abs2Api {
    adapter: RestAdapter,
}

impl Abs2Api {
    /// Create a client from configuration.
    pub fn new(config: &Abs2Config) -> Abs2Result<Self> {
        Ok(Self::with_adapter(RestAdapter::new(config)?))
    }

    /// Create a client whose adapter logs under `span`.
    pub fn with_span(config: &Abs2Config, span: Span) -> Abs2Result<Self> {
        Ok(Self::with_adapter(RestAdapter::with_span(config, span)?))
    }

    /// Wrap an existing adapter.
    pub fn with_adapter(adapter: RestAdapter) -> Self {
        Self { adapter }
    }

    /// The underlying adapter, for endpoints without a dedicated method.
    pub fn adapter(&self) -> &RestAdapter {
        &self.adapter
    }

    // ─── Service ────────────────────────────────────────────────────

    /// Check whether the solver is working (200, or 503 when it is not).
    #[instrument(skip(self))]
    pub async fn get_status(&self) -> Abs2Result<StatusInformation> {
        self.adapter.get("", None, None).await?.into_model()
    }

    // ─── Accounts ───────────────────────────────────────────────────

    /// Register a new account. The generated password is emailed to the
    /// user. Answers 201, or 400/409 for malformed or duplicate data.
    #[instrument(skip(self, user), fields(username = %user.username))]
    pub async fn register_user(&self, user: &User) -> Abs2Result<ApiResponse> {
        let body = serde_json::to_value(user).map_err(|e| Abs2Error::encode("User", e))?;
        self.adapter.post("signup", None, Some(&body), None).await
    }

    /// Retrieve details of an existing account.
    #[instrument(skip(self, password))]
    pub async fn retrieve_user_information(
        &self,
        username: &str,
        password: &str,
    ) -> Abs2Result<RegisteredUserInformation> {
        let body = json!({ "username": username, "password": password });
        self.adapter
            .post("account", None, Some(&body), None)
            .await?
            .into_model()
    }

    /// Have a new password emailed to the account owner.
    #[instrument(skip(self))]
    pub async fn retrieve_new_password(
        &self,
        username: &str,
        email: &str,
    ) -> Abs2Result<ApiResponse> {
        let body = json!({ "username": username, "email": email });
        self.adapter.post("account", None, Some(&body), None).await
    }

    /// Have the username registered for `email` sent to it.
    #[instrument(skip(self))]
    pub async fn retrieve_new_username(&self, email: &str) -> Abs2Result<ApiResponse> {
        let body = json!({ "email": email });
        self.adapter.post("account", None, Some(&body), None).await
    }

    /// Change the account password.
    #[instrument(skip(self, password, new_password))]
    pub async fn change_password(
        &self,
        username: &str,
        password: &str,
        new_password: &str,
    ) -> Abs2Result<ApiResponse> {
        let body = json!({
            "username": username,
            "password": password,
            "newpassword": new_password,
        });
        self.adapter.put("account", None, Some(&body), None).await
    }

    /// Delete the account the token belongs to.
    #[instrument(skip_all)]
    pub async fn delete_user_account(&self, token: &str) -> Abs2Result<ApiResponse> {
        self.adapter
            .delete("account", None, None, Some(&bearer(token)?))
            .await
    }

    /// Exchange credentials for a bearer token.
    #[instrument(skip(self, password))]
    pub async fn retrieve_access_token(
        &self,
        username: &str,
        password: &str,
    ) -> Abs2Result<TokenMessage> {
        let body = json!({ "username": username, "password": password });
        self.adapter
            .post("token", None, Some(&body), None)
            .await?
            .into_model()
    }

    // ─── Problems ───────────────────────────────────────────────────

    /// Upload a dense QUBO matrix. The server answers 202 and starts
    /// verifying it; jobs can be posted once verification completes.
    #[instrument(skip(self, token, matrix), fields(file = %matrix.file, nbit = matrix.nbit))]
    pub async fn post_qubo_matrix(
        &self,
        token: &str,
        matrix: &QuboMatrix,
    ) -> Abs2Result<QuboMatrixUploadMsg> {
        self.upload(token, matrix).await?.into_model()
    }

    /// Upload a matrix stored as JSON in the upload format.
    #[instrument(skip(self, token, path), fields(file_path = %path.as_ref().display()))]
    pub async fn post_qubo_matrix_file(
        &self,
        token: &str,
        path: impl AsRef<Path>,
    ) -> Abs2Result<QuboMatrixUploadMsg> {
        let path = path.as_ref();
        let raw = tokio::fs::read(path).await.map_err(|source| Abs2Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let matrix: serde_json::Value = serde_json::from_slice(&raw)
            .map_err(|e| Abs2Error::encode(path.display().to_string(), e))?;

        self.adapter
            .post("problems", None, Some(&matrix), Some(&bearer(token)?))
            .await?
            .into_model()
    }

    /// Encode a symbolic QUBO and upload it.
    ///
    /// The returned message keeps the index mapping so the solution vector
    /// can be decoded back to variable names.
    #[instrument(skip(self, token, qubo), fields(terms = qubo.len()))]
    pub async fn post_symbolic_qubo(
        &self,
        token: &str,
        qubo: &SymbolicQubo,
        file: Option<&str>,
    ) -> Abs2Result<SymbolicUploadMsg> {
        let encoded = encode(qubo, file)?;
        debug!(
            file = %encoded.matrix.file,
            variables = encoded.mapping.len(),
            nbit = encoded.matrix.nbit,
            "encoded symbolic QUBO"
        );

        let response = self.upload(token, &encoded.matrix).await?;
        let status_code = response.status_code;
        let upload: QuboMatrixUploadMsg = response.into_model()?;

        Ok(SymbolicUploadMsg {
            status_code,
            message: upload.message,
            file: upload.file,
            uri_problem: upload.uri_problem,
            qubo: qubo.clone(),
            key_mapping: encoded.mapping,
        })
    }

    async fn upload(&self, token: &str, matrix: &QuboMatrix) -> Abs2Result<ApiResponse> {
        let body = serde_json::to_value(matrix).map_err(|e| Abs2Error::encode("QuboMatrix", e))?;
        self.adapter
            .post("problems", None, Some(&body), Some(&bearer(token)?))
            .await
    }

    /// Information about an uploaded matrix; verification results appear
    /// once the server has checked the file.
    #[instrument(skip(self, token))]
    pub async fn get_qubo_matrix_information(
        &self,
        token: &str,
        file: &str,
    ) -> Abs2Result<QuboMatrixInformation> {
        self.adapter
            .get(&resource_path("problems", file)?, None, Some(&bearer(token)?))
            .await?
            .into_model()
    }

    /// List all uploaded matrices.
    #[instrument(skip_all)]
    pub async fn get_all_problems(&self, token: &str) -> Abs2Result<ApiResponse> {
        self.adapter
            .get("problems", None, Some(&bearer(token)?))
            .await
    }

    /// Delete one matrix. Deleting during verification may leave it
    /// partially removed.
    #[instrument(skip(self, token))]
    pub async fn delete_qubo_matrix(&self, token: &str, file: &str) -> Abs2Result<ApiResponse> {
        self.adapter
            .delete(&resource_path("problems", file)?, None, None, Some(&bearer(token)?))
            .await
    }

    /// Delete all matrices.
    #[instrument(skip_all)]
    pub async fn delete_all_qubo_matrices(&self, token: &str) -> Abs2Result<ApiResponse> {
        self.adapter
            .delete("problems", None, None, Some(&bearer(token)?))
            .await
    }

    // ─── Jobs ───────────────────────────────────────────────────────

    /// Queue a job for a verified problem.
    ///
    /// The job name is the problem's file name with a four-digit suffix.
    /// Once the solver picks the job up it moves to the solutions list.
    #[instrument(skip(self, token))]
    pub async fn post_job(
        &self,
        token: &str,
        problem: &str,
        time_limit: u64,
    ) -> Abs2Result<PostJobSuccessMsg> {
        let body = json!({ "problem": problem, "time_limit": time_limit });
        self.adapter
            .post("jobs", None, Some(&body), Some(&bearer(token)?))
            .await?
            .into_model()
    }

    /// Information about an unexecuted job.
    #[instrument(skip(self, token))]
    pub async fn get_job_information(
        &self,
        token: &str,
        job_name: &str,
    ) -> Abs2Result<JobInformation> {
        self.adapter
            .get(&resource_path("jobs", job_name)?, None, Some(&bearer(token)?))
            .await?
            .into_model()
    }

    /// List unexecuted jobs.
    #[instrument(skip_all)]
    pub async fn get_all_jobs(&self, token: &str) -> Abs2Result<ApiResponse> {
        self.adapter.get("jobs", None, Some(&bearer(token)?)).await
    }

    /// Delete one unexecuted job.
    #[instrument(skip(self, token))]
    pub async fn delete_job(&self, token: &str, job_name: &str) -> Abs2Result<ApiResponse> {
        self.adapter
            .delete(&resource_path("jobs", job_name)?, None, None, Some(&bearer(token)?))
            .await
    }

    /// Delete all unexecuted jobs.
    #[instrument(skip_all)]
    pub async fn delete_all_unexecuted_jobs(&self, token: &str) -> Abs2Result<ApiResponse> {
        self.adapter
            .delete("jobs", None, None, Some(&bearer(token)?))
            .await
    }

    // ─── Solutions ──────────────────────────────────────────────────

    /// List solution files.
    #[instrument(skip_all)]
    pub async fn get_all_solutions(&self, token: &str) -> Abs2Result<ApiResponse> {
        self.adapter
            .get("solutions", None, Some(&bearer(token)?))
            .await
    }

    /// Current best solution for a job.
    #[instrument(skip(self, token))]
    pub async fn get_solution(
        &self,
        token: &str,
        solution_name: &str,
    ) -> Abs2Result<SolutionInformation> {
        self.adapter
            .get(
                &resource_path("solutions", solution_name)?,
                None,
                Some(&bearer(token)?),
            )
            .await?
            .into_model()
    }

    /// Delete one solution file.
    #[instrument(skip(self, token))]
    pub async fn delete_solution(
        &self,
        token: &str,
        solution_name: &str,
    ) -> Abs2Result<ApiResponse> {
        self.adapter
            .delete(
                &resource_path("solutions", solution_name)?,
                None,
                None,
                Some(&bearer(token)?),
            )
            .await
    }

    /// Delete all solution files.
    #[instrument(skip_all)]
    pub async fn delete_all_solutions(&self, token: &str) -> Abs2Result<ApiResponse> {
        self.adapter
            .delete("solutions", None, None, Some(&bearer(token)?))
            .await
    }
}
