// Error taxonomy for backend interactions.
//
// The reconciler treats Unparseable like NetworkFailure (stale cache
// retained, retried next cycle). BackendRejection carries the backend's
// own reason verbatim so the UI can surface it unchanged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Bad credentials or OTP. Recovered by re-prompting, never fatal.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    /// Transport-level failure (connection refused, timeout, ...).
    #[error("network failure: {0}")]
    NetworkFailure(String),

    /// Non-2xx response with a structured reason from the backend.
    #[error("backend rejected request ({status}): {reason}")]
    BackendRejection { status: u16, reason: String },

    /// Client-side guard: the target id is not in the cached roster.
    /// Fails fast, no network round trip.
    #[error("not found: {0}")]
    NotFound(String),

    /// Client-side single-flight guard: an operation of this kind is
    /// already in progress.
    #[error("already in progress: {0}")]
    Busy(String),

    /// Response body did not match the documented contract.
    #[error("unparseable response: {0}")]
    Unparseable(String),
}

impl ApiError {
    /// Map a non-success HTTP response to the taxonomy. The backend
    /// reports failures as `{"error": "..."}`; anything else falls back
    /// to the raw body or the status line.
    pub fn from_status(status: u16, body: &str) -> Self {
        let reason = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
            .unwrap_or_else(|| {
                if body.trim().is_empty() {
                    format!("HTTP {}", status)
                } else {
                    body.trim().to_string()
                }
            });

        match status {
            401 | 403 => ApiError::AuthFailure(reason),
            _ => ApiError::BackendRejection { status, reason },
        }
    }

    /// Failures the reconciler handles by keeping the previous cached
    /// value rather than surfacing a structural error.
    pub fn is_transient(&self) -> bool {
        matches!(self, ApiError::NetworkFailure(_) | ApiError::Unparseable(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Unparseable(e.to_string())
        } else {
            ApiError::NetworkFailure(e.to_string())
        }
    }
}
