//! Error types for adminctl

use std::time::Duration;
use thiserror::Error;

/// Result type alias for adminctl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Operation failed: {0}")]
    Other(String),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

impl Error {
    /// True when the error means the caller must sign in again.
    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self,
            Error::Api(ApiError::Unauthorized)
                | Error::Auth(AuthError::NotAuthenticated { .. })
                | Error::Auth(AuthError::SessionExpired)
        )
    }

    /// True when a failed write may or may not have been applied: server
    /// errors, lost connections and unreadable success bodies. Client
    /// rejections (4xx) are known not to have landed.
    pub fn outcome_unknown(&self) -> bool {
        match self {
            Error::Api(ApiError::Status(code)) => *code >= 500,
            Error::Api(ApiError::Network(_)) | Error::Api(ApiError::InvalidResponse(_)) => true,
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api(ApiError::NotFound(_)))
    }
}

/// REST API errors
///
/// Non-2xx responses carry only their status code; the rendered message is
/// `HTTP <code>` so the transient-error predicate can match on it.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP 401: session rejected by the API. Run `adminctl login`.")]
    Unauthorized,

    #[error("HTTP 404: {0} not found")]
    NotFound(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Another request for {0} is still in flight")]
    InFlight(String),

    #[error("Write to {0} could not be confirmed")]
    Unconfirmed(String),

    #[error("{done} was saved but {failed} failed: {reason}")]
    PartialWrite {
        done: String,
        failed: String,
        reason: String,
    },
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to API".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Identity provider and session errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Account is not confirmed. Check your email for a verification code.")]
    UserNotConfirmed,

    #[error("Incorrect email or password.")]
    NotAuthorized,

    #[error("No account exists for this email.")]
    UserNotFound,

    #[error("Sign-in failed. Please try again.")]
    Generic(String),

    #[error("Not signed in. Run `adminctl login` to continue to {from}.")]
    NotAuthenticated { from: String },

    #[error("Session expired. Run `adminctl login` to sign in again.")]
    SessionExpired,

    #[error("No password challenge is pending. Run `adminctl login` first.")]
    NoPendingChallenge,

    #[error("Session token is malformed: {0}")]
    InvalidToken(String),
}

impl AuthError {
    /// Map a provider error code to a user-facing error.
    ///
    /// Only three codes get their own message; the rest collapse to `Generic`.
    pub fn from_provider_code(code: &str, message: &str) -> Self {
        match code {
            "UserNotConfirmedException" => AuthError::UserNotConfirmed,
            "NotAuthorizedException" => AuthError::NotAuthorized,
            "UserNotFoundException" => AuthError::UserNotFound,
            _ => AuthError::Generic(format!("{}: {}", code, message)),
        }
    }
}

/// Field-level form validation errors, raised before any network call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name: must not be empty")]
    EmptyName,

    #[error("email: '{0}' is not a valid email address")]
    InvalidEmail(String),

    #[error("email: '{0}' is already used by another user")]
    DuplicateEmail(String),

    #[error("password: {0}")]
    WeakPassword(String),

    /// More than one field failed
    #[error("{}", join_messages(.0))]
    Fields(Vec<ValidationError>),
}

impl ValidationError {
    /// Every individual field error
    pub fn fields(&self) -> Vec<&ValidationError> {
        match self {
            ValidationError::Fields(errors) => errors.iter().collect(),
            single => vec![single],
        }
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `adminctl login` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),

    #[error("API URL not configured. Pass --api-url or set ADMINCTL_API_URL.")]
    MissingApiUrl,

    #[error("Identity provider URL not configured. Pass --auth-url or set ADMINCTL_AUTH_URL.")]
    MissingAuthUrl,
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
