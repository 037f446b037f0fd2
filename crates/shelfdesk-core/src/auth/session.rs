use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Access token lifetime in minutes.
/// Matches the backend's ACCESS_TOKEN_LIFETIME; used for display only.
const TOKEN_EXPIRY_MINUTES: i64 = 60;

/// Account summary returned alongside the access token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: Option<i64>,
    pub email: Option<String>,
    #[serde(rename = "tipo")]
    pub user_type: Option<String>,
    #[serde(rename = "nome")]
    pub name: Option<String>,
}

impl SessionUser {
    pub fn display_name(&self) -> String {
        let who = self
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .or(self.email.as_deref())
            .unwrap_or("unknown user");
        match self.user_type.as_deref() {
            Some(kind) if !kind.is_empty() => format!("{} ({})", who, kind),
            _ => who.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionData {
    pub token: String,
    pub user: Option<SessionUser>,
    pub created_at: DateTime<Utc>,
}

impl SessionData {
    pub fn new(token: String, user: Option<SessionUser>) -> Self {
        Self {
            token,
            user,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.created_at + Duration::minutes(TOKEN_EXPIRY_MINUTES)
    }

    /// Get minutes remaining until expiry (for display)
    pub fn minutes_until_expiry(&self) -> i64 {
        (self.expires_at() - Utc::now()).num_minutes().max(0)
    }
}

/// The single credential shared by every operation.
///
/// Starts unauthenticated. A successful login replaces the data wholesale,
/// `clear` returns to unauthenticated. Nothing is written to disk.
#[derive(Debug, Default)]
pub struct Session {
    pub data: Option<SessionData>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update session with new data
    pub fn update(&mut self, data: SessionData) {
        self.data = Some(data);
    }

    /// Clear session data (logout)
    pub fn clear(&mut self) {
        self.data = None;
    }

    /// Get the bearer token if logged in
    pub fn token(&self) -> Option<&str> {
        self.data.as_ref().map(|d| d.token.as_str())
    }

    pub fn is_authenticated(&self) -> bool {
        self.data.is_some()
    }
}
