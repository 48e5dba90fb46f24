//! Admin session - local credential check
//!
//! The credential pair lives in the client config, so this only gates the
//! dashboard UI. The backend does not authenticate status updates.

use crate::config::AdminConfig;
use crate::error::ClientError;

/// In-memory admin flag. Never persisted; a new process starts logged out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdminSession {
    username: Option<String>,
}

impl AdminSession {
    pub fn is_active(&self) -> bool {
        self.username.is_some()
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    /// Compare against the configured pair. A failed attempt does not end an
    /// existing session; there is no lockout.
    pub fn login(&mut self, credentials: &AdminConfig, username: &str, password: &str) -> Result<(), ClientError> {
        if username == credentials.username && password == credentials.password {
            self.username = Some(username.to_string());
            Ok(())
        } else {
            Err(ClientError::InvalidCredentials)
        }
    }

    pub fn logout(&mut self) {
        self.username = None;
    }

    pub fn require(&self) -> Result<(), ClientError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(ClientError::NotLoggedIn)
        }
    }
}
