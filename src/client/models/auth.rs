//! Authentication models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Token bundle issued by the identity provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Bearer token attached to API requests
    pub access_token: String,

    /// Identity token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_token: Option<String>,

    /// Token used to obtain a new access token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Access token expiration time
    pub expires_at: DateTime<Utc>,

    /// Email of the signed-in user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl SessionTokens {
    /// Check if the access token is expired or expires within `buffer`
    pub fn expires_within(&self, buffer: chrono::Duration) -> bool {
        self.expires_at - buffer < Utc::now()
    }
}

/// Result of a sign-in attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SignInOutcome {
    /// Tokens were issued
    SignedIn(SessionTokens),

    /// The account must set a new password before tokens are issued
    NewPasswordRequired {
        /// Opaque challenge session from the provider
        session: String,
        email: String,
    },
}

impl SignInOutcome {
    pub fn is_signed_in(&self) -> bool {
        matches!(self, SignInOutcome::SignedIn(_))
    }

    pub fn requires_new_password(&self) -> bool {
        matches!(self, SignInOutcome::NewPasswordRequired { .. })
    }

    pub fn tokens(&self) -> Option<&SessionTokens> {
        match self {
            SignInOutcome::SignedIn(tokens) => Some(tokens),
            SignInOutcome::NewPasswordRequired { .. } => None,
        }
    }
}
