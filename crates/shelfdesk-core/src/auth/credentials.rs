use serde::{Deserialize, Serialize};

use super::SessionUser;

/// Login form values, sent as the token request body.
#[derive(Clone, Default, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    /// Account type the user claims to log in as; the backend rejects a mismatch
    #[serde(rename = "tipo", skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            user_type: None,
        }
    }

    /// Attach a user type; an empty value means "not sent"
    pub fn with_user_type(mut self, user_type: impl Into<String>) -> Self {
        let user_type = user_type.into();
        self.user_type = if user_type.is_empty() { None } else { Some(user_type) };
        self
    }
}

// Keeps the password out of logs
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .field("user_type", &self.user_type)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub access: String,
    #[serde(default)]
    pub user: Option<SessionUser>,
}
