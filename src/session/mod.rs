// Session store — the one piece of durable client state.
//
// Three states:
//   Absent      — no credentials, nothing persisted
//   PendingOtp  — credentials accepted, waiting for the emailed code
//   Active      — holds the bearer token every fetch and command uses
//
// Persisted to ~/.nodedeck/session.json

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where this client stands with the auth backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionState {
    /// Never authenticated, or logged out.
    Absent,
    /// Credentials submitted; an OTP code is on its way to this address.
    PendingOtp { email: String },
    /// Authenticated. The token is an opaque bearer credential.
    Active { token: String },
}

impl SessionState {
    pub fn token(&self) -> Option<&str> {
        match self {
            SessionState::Active { token } => Some(token),
            _ => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Active { .. })
    }
}

/// Loads and persists the session. Only the auth flow writes through
/// this; everything else just reads the token.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().context("Cannot determine home directory")?;
        Ok(Self {
            path: home.join(".nodedeck").join("session.json"),
        })
    }

    /// Store rooted at an explicit path (tests, alternate profiles).
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    /// Load from disk; a missing file means `Absent`.
    pub fn load(&self) -> Result<SessionState> {
        if !self.path.exists() {
            return Ok(SessionState::Absent);
        }
        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read session from {}", self.path.display()))?;
        serde_json::from_str(&raw).context("Failed to parse session JSON")
    }

    pub fn save(&self, state: &SessionState) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create ~/.nodedeck directory")?;
        }
        let json = serde_json::to_string_pretty(state).context("Failed to serialize session")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write session to {}", self.path.display()))?;
        Ok(())
    }

    /// Drop the persisted session entirely (logout).
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).with_context(|| {
                format!("Failed to remove session file {}", self.path.display())
            })?;
        }
        Ok(())
    }

    /// The active token, or an error telling the user to log in.
    pub fn require_token(&self) -> Result<String> {
        match self.load()? {
            SessionState::Active { token } => Ok(token),
            _ => anyhow::bail!("Not logged in. Run `nodedeck login` first."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_is_absent() {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::at(tmp.path().join("session.json"));
        assert_eq!(store.load().unwrap(), SessionState::Absent);
    }

    #[test]
    fn test_save_load_clear_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let store = SessionStore::at(tmp.path().join("session.json"));

        let state = SessionState::Active {
            token: "tok-123".to_string(),
        };
        store.save(&state).unwrap();
        assert_eq!(store.load().unwrap(), state);
        assert_eq!(store.require_token().unwrap(), "tok-123");

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), SessionState::Absent);
        assert!(store.require_token().is_err());
    }

    #[test]
    fn test_pending_otp_has_no_token() {
        let s = SessionState::PendingOtp {
            email: "a@b.c".to_string(),
        };
        assert!(s.token().is_none());
        assert!(!s.is_active());
    }

    #[test]
    fn test_state_serde_roundtrip() {
        let s = SessionState::PendingOtp {
            email: "a@b.c".to_string(),
        };
        let json = serde_json::to_string(&s).unwrap();
        let back: SessionState = serde_json::from_str(&json).unwrap();
        assert_eq!(s, back);
    }
}
