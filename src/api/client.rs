// Cluster API client.
//
// One thin method per backend operation, bearer-token authenticated
// except for the auth endpoints. Fetchers return typed results or an
// ApiError; they never retry — retry policy belongs to the callers
// (the reconciler retries by cadence, commands don't retry at all).

use reqwest::multipart;
use reqwest::{Client, Response};
use std::time::Duration;
use tracing::debug;

use super::error::ApiError;
use super::types::*;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Client for the cluster REST API.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| ApiError::NetworkFailure(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into the error taxonomy.
    async fn check(resp: Response) -> Result<Response, ApiError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(ApiError::from_status(status.as_u16(), &body))
    }

    async fn parse<T: serde::de::DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        let body = resp.text().await.map_err(ApiError::from)?;
        serde_json::from_str(&body).map_err(|e| ApiError::Unparseable(e.to_string()))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        token: &str,
        path: &str,
    ) -> Result<T, ApiError> {
        debug!(path, "GET");
        let resp = self
            .http
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await?;
        Self::parse(Self::check(resp).await?).await
    }

    // ---- auth ----------------------------------------------------------

    /// POST /auth/register — triggers an OTP email.
    pub async fn register(&self, req: &RegisterRequest) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/auth/register"))
            .json(req)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// POST /auth/login — triggers an OTP email.
    pub async fn login(&self, req: &LoginRequest) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/auth/login"))
            .json(req)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    /// POST /auth/verify-otp — exchanges a 6-digit code for a bearer token.
    pub async fn verify_otp(&self, req: &VerifyOtpRequest) -> Result<String, ApiError> {
        let resp = self
            .http
            .post(self.url("/auth/verify-otp"))
            .json(req)
            .send()
            .await?;
        let token: TokenResponse = Self::parse(Self::check(resp).await?).await?;
        Ok(token.token)
    }

    // ---- resource fetchers ---------------------------------------------

    pub async fn fetch_dashboard(&self, token: &str) -> Result<UserDashboard, ApiError> {
        self.get_json(token, "/user/dashboard").await
    }

    /// The per-user file list as the dashboard shows it.
    pub async fn fetch_user_files(&self, token: &str) -> Result<Vec<FileEntry>, ApiError> {
        self.get_json(token, "/user/dashboard/files").await
    }

    /// Flat file listing (`GET /files`); same entries, different endpoint.
    pub async fn list_files(&self, token: &str) -> Result<Vec<FileEntry>, ApiError> {
        self.get_json(token, "/files").await
    }

    pub async fn fetch_network_status(&self, token: &str) -> Result<NetworkStatus, ApiError> {
        self.get_json(token, "/network/status").await
    }

    pub async fn fetch_nodes(&self, token: &str) -> Result<Vec<Node>, ApiError> {
        self.get_json(token, "/network/nodes").await
    }

    pub async fn fetch_running_nodes(&self, token: &str) -> Result<RunningNodes, ApiError> {
        self.get_json(token, "/network/nodes/running").await
    }

    // ---- node lifecycle ------------------------------------------------

    pub async fn start_node(
        &self,
        token: &str,
        req: &StartNodeRequest,
    ) -> Result<CommandAck, ApiError> {
        let resp = self
            .http
            .post(self.url("/network/nodes/start"))
            .bearer_auth(token)
            .json(req)
            .send()
            .await?;
        Self::parse(Self::check(resp).await?).await
    }

    pub async fn stop_node(&self, token: &str, node_id: &str) -> Result<CommandAck, ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("/network/nodes/stop/{node_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::parse(Self::check(resp).await?).await
    }

    pub async fn restart_node(
        &self,
        token: &str,
        node_id: &str,
        resources: &NodeResources,
    ) -> Result<CommandAck, ApiError> {
        let resp = self
            .http
            .post(self.url(&format!("/network/nodes/restart/{node_id}")))
            .bearer_auth(token)
            .json(resources)
            .send()
            .await?;
        Self::parse(Self::check(resp).await?).await
    }

    pub async fn delete_node(&self, token: &str, node_id: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("/network/nodes/{node_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    pub async fn delete_all_nodes(&self, token: &str) -> Result<(), ApiError> {
        let resp = self
            .http
            .post(self.url("/network/nodes/delete-all"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    // ---- files ---------------------------------------------------------

    /// POST /files/upload — multipart form field `file`.
    pub async fn upload_file(
        &self,
        token: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResult, ApiError> {
        let part = multipart::Part::bytes(bytes).file_name(file_name.to_string());
        let form = multipart::Form::new().part("file", part);
        let resp = self
            .http
            .post(self.url("/files/upload"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;
        Self::parse(Self::check(resp).await?).await
    }

    /// GET /files/{id} — returns the raw-bytes response, status-checked.
    /// The caller streams the body to disk.
    pub async fn download_file(&self, token: &str, file_id: i64) -> Result<Response, ApiError> {
        let resp = self
            .http
            .get(self.url(&format!("/files/{file_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(resp).await
    }

    pub async fn delete_file(&self, token: &str, file_id: i64) -> Result<(), ApiError> {
        let resp = self
            .http
            .delete(self.url(&format!("/files/{file_id}")))
            .bearer_auth(token)
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }
}
