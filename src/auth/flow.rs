// Login / register → OTP → authenticated state machine.
//
// Transitions are guarded: a step that fails keeps the machine where
// it is and hands the error back to the caller; it never advances
// silently. The only durable side effect is the session file.

use tracing::info;

use crate::api::{ApiClient, ApiError, LoginRequest, RegisterRequest, VerifyOtpRequest};
use crate::session::{SessionState, SessionStore};

/// Which screen the auth flow is on.
#[derive(Debug, Clone, PartialEq)]
pub enum AuthStage {
    Login,
    Register,
    OtpPending { email: String },
    Authenticated,
}

/// OTP codes are entered by hand; strip everything that isn't a digit
/// and cap at the 6 the backend issues.
pub fn sanitize_otp(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).take(6).collect()
}

/// Submission is enabled only at exactly 6 digits.
pub fn otp_ready(sanitized: &str) -> bool {
    sanitized.len() == 6 && sanitized.chars().all(|c| c.is_ascii_digit())
}

pub struct AuthFlow {
    client: ApiClient,
    store: SessionStore,
    stage: AuthStage,
}

impl AuthFlow {
    /// Resume from the persisted session: an active token lands the
    /// flow directly in `Authenticated`, a pending OTP on that screen.
    pub fn resume(client: ApiClient, store: SessionStore) -> anyhow::Result<Self> {
        let stage = match store.load()? {
            SessionState::Active { .. } => AuthStage::Authenticated,
            SessionState::PendingOtp { email } => AuthStage::OtpPending { email },
            SessionState::Absent => AuthStage::Login,
        };
        Ok(Self {
            client,
            store,
            stage,
        })
    }

    pub fn stage(&self) -> &AuthStage {
        &self.stage
    }

    /// Submit login credentials. Success moves to OTP entry; the
    /// backend has mailed a code to `email`.
    pub async fn submit_login(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        require_filled(&[("email", email), ("password", password)])?;
        self.client
            .login(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.enter_otp_pending(email)?;
        Ok(())
    }

    /// Submit registration. Same OTP hand-off as login.
    pub async fn submit_register(
        &mut self,
        full_name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        require_filled(&[
            ("full name", full_name),
            ("email", email),
            ("password", password),
        ])?;
        self.client
            .register(&RegisterRequest {
                full_name: full_name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;
        self.enter_otp_pending(email)?;
        Ok(())
    }

    /// Exchange the OTP code for a bearer token. The raw input is
    /// sanitized first; anything other than 6 digits is rejected
    /// before touching the network.
    pub async fn submit_otp(&mut self, raw_code: &str) -> Result<(), ApiError> {
        let email = match &self.stage {
            AuthStage::OtpPending { email } => email.clone(),
            _ => {
                return Err(ApiError::AuthFailure(
                    "no OTP verification in progress".to_string(),
                ))
            }
        };

        let code = sanitize_otp(raw_code);
        if !otp_ready(&code) {
            return Err(ApiError::AuthFailure(format!(
                "OTP code must be exactly 6 digits (got {})",
                code.len()
            )));
        }

        let token = self
            .client
            .verify_otp(&VerifyOtpRequest { email, code })
            .await?;

        self.store
            .save(&SessionState::Active { token })
            .map_err(|e| ApiError::NetworkFailure(format!("failed to persist session: {e}")))?;
        self.stage = AuthStage::Authenticated;
        info!("Authenticated; session persisted");
        Ok(())
    }

    /// Logout: destroy the session and return to the login screen.
    /// Cached resources die with the reconciler the caller tears down.
    pub fn logout(&mut self) -> anyhow::Result<()> {
        self.store.clear()?;
        self.stage = AuthStage::Login;
        info!("Logged out; session cleared");
        Ok(())
    }

    fn enter_otp_pending(&mut self, email: &str) -> Result<(), ApiError> {
        self.store
            .save(&SessionState::PendingOtp {
                email: email.to_string(),
            })
            .map_err(|e| ApiError::NetworkFailure(format!("failed to persist session: {e}")))?;
        self.stage = AuthStage::OtpPending {
            email: email.to_string(),
        };
        Ok(())
    }
}

fn require_filled(fields: &[(&str, &str)]) -> Result<(), ApiError> {
    for (name, value) in fields {
        if value.trim().is_empty() {
            return Err(ApiError::AuthFailure(format!("{name} is required")));
        }
    }
    Ok(())
}
