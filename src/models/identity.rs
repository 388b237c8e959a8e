use serde::{Deserialize, Serialize};

use super::FormError;

/// An authenticated user. `user_id` scopes every remote row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn sign_in(email: &str, password: &str) -> Result<Self, FormError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(FormError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(FormError::EmptyPassword);
        }
        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }

    /// Registration additionally requires the confirmation to match.
    pub fn registration(email: &str, password: &str, confirm: &str) -> Result<Self, FormError> {
        let creds = Self::sign_in(email, password)?;
        if password != confirm {
            return Err(FormError::PasswordMismatch);
        }
        Ok(creds)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}
