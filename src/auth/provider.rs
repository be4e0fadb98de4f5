//! HTTP identity provider client

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use log::debug;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::IdentityProvider;
use super::token::expiry_from_jwt;
use crate::client::models::{SessionTokens, SignInOutcome};
use crate::error::{ApiError, AuthError, Result};

/// Challenge name for a forced password change
const NEW_PASSWORD_CHALLENGE: &str = "NEW_PASSWORD_REQUIRED";

/// Identity provider reached over JSON/HTTP.
pub struct HttpIdentityProvider {
    http: HttpClient,
    base_url: String,
}

/// Token or challenge response from the provider
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Lifetime in seconds, used when the access token is not a JWT
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    challenge: Option<String>,
    #[serde(default)]
    session: Option<String>,
}

/// Error body returned by the provider
#[derive(Debug, Deserialize)]
struct ProviderError {
    code: String,
    #[serde(default)]
    message: String,
}

impl HttpIdentityProvider {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: serde_json::Value) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!("POST {}", url);

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            debug!("{} -> {}", path, status);
            return Err(match serde_json::from_str::<ProviderError>(&text) {
                Ok(err) => AuthError::from_provider_code(&err.code, &err.message).into(),
                Err(_) => AuthError::Generic(format!("HTTP {}", status.as_u16())).into(),
            });
        }

        // Acknowledgement endpoints may answer with an empty body
        let text = if text.trim().is_empty() { "null" } else { &text };
        serde_json::from_str(text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse provider response: {}", e)).into()
        })
    }

    /// Turn a token response into a bundle, keeping `previous` values the
    /// provider did not resend (refresh responses omit the refresh token).
    fn into_tokens(
        response: TokenResponse,
        email: Option<&str>,
        previous: Option<&SessionTokens>,
    ) -> Result<SessionTokens> {
        let access_token = response.access_token.ok_or_else(|| {
            ApiError::InvalidResponse("Provider response has no access_token".to_string())
        })?;

        let expires_at = match response.expires_in {
            Some(secs) => Utc::now() + chrono::Duration::seconds(secs),
            None => expiry_from_jwt(&access_token)?,
        };

        Ok(SessionTokens {
            access_token,
            id_token: response
                .id_token
                .or_else(|| previous.and_then(|p| p.id_token.clone())),
            refresh_token: response
                .refresh_token
                .or_else(|| previous.and_then(|p| p.refresh_token.clone())),
            expires_at,
            email: email
                .map(str::to_string)
                .or_else(|| previous.and_then(|p| p.email.clone())),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<SignInOutcome> {
        let response: TokenResponse = self
            .post("/sign-in", json!({ "email": email, "password": password }))
            .await?;

        if response.challenge.as_deref() == Some(NEW_PASSWORD_CHALLENGE) {
            let session = response.session.unwrap_or_default();
            return Ok(SignInOutcome::NewPasswordRequired {
                session,
                email: email.to_string(),
            });
        }

        Ok(SignInOutcome::SignedIn(Self::into_tokens(
            response,
            Some(email),
            None,
        )?))
    }

    async fn refresh(&self, tokens: &SessionTokens) -> Result<SessionTokens> {
        let refresh_token = tokens
            .refresh_token
            .as_deref()
            .ok_or(AuthError::SessionExpired)?;

        let response: TokenResponse = self
            .post("/refresh", json!({ "refresh_token": refresh_token }))
            .await?;

        Self::into_tokens(response, None, Some(tokens))
    }

    async fn complete_new_password(
        &self,
        email: &str,
        session: &str,
        new_password: &str,
    ) -> Result<SessionTokens> {
        let response: TokenResponse = self
            .post(
                "/new-password",
                json!({ "email": email, "session": session, "new_password": new_password }),
            )
            .await?;

        Self::into_tokens(response, Some(email), None)
    }

    async fn confirm_sign_up(&self, email: &str, code: &str) -> Result<()> {
        let _: serde_json::Value = self
            .post("/confirm-sign-up", json!({ "email": email, "code": code }))
            .await?;
        Ok(())
    }

    async fn forgot_password(&self, email: &str) -> Result<()> {
        let _: serde_json::Value = self
            .post("/forgot-password", json!({ "email": email }))
            .await?;
        Ok(())
    }

    async fn confirm_forgot_password(
        &self,
        email: &str,
        code: &str,
        new_password: &str,
    ) -> Result<()> {
        let _: serde_json::Value = self
            .post(
                "/confirm-forgot-password",
                json!({ "email": email, "code": code, "new_password": new_password }),
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::fake_jwt;
    use crate::error::Error;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_sign_in_reads_expiry_from_jwt() {
        let mut server = mockito::Server::new_async().await;
        let exp = chrono::DateTime::from_timestamp(1_900_000_000, 0).unwrap();
        let body = json!({
            "access_token": fake_jwt(exp),
            "id_token": "id",
            "refresh_token": "refresh",
        });
        server
            .mock("POST", "/sign-in")
            .match_body(Matcher::PartialJsonString(
                r#"{"email":"jane@x.com"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(body.to_string())
            .create_async()
            .await;

        let provider = HttpIdentityProvider::new(server.url()).unwrap();
        let outcome = provider.sign_in("jane@x.com", "pw").await.unwrap();

        let tokens = outcome.tokens().unwrap();
        assert_eq!(tokens.expires_at, exp);
        assert_eq!(tokens.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(tokens.email.as_deref(), Some("jane@x.com"));
    }

    #[tokio::test]
    async fn test_sign_in_new_password_challenge() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/sign-in")
            .with_status(200)
            .with_body(r#"{"challenge":"NEW_PASSWORD_REQUIRED","session":"sess-1"}"#)
            .create_async()
            .await;

        let provider = HttpIdentityProvider::new(server.url()).unwrap();
        let outcome = provider.sign_in("jane@x.com", "temp").await.unwrap();

        assert_eq!(
            outcome,
            SignInOutcome::NewPasswordRequired {
                session: "sess-1".to_string(),
                email: "jane@x.com".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_provider_error_codes_are_mapped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/sign-in")
            .with_status(400)
            .with_body(r#"{"code":"NotAuthorizedException","message":"Incorrect username or password."}"#)
            .create_async()
            .await;

        let provider = HttpIdentityProvider::new(server.url()).unwrap();
        let err = provider.sign_in("jane@x.com", "bad").await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::NotAuthorized)));
    }

    #[tokio::test]
    async fn test_unstructured_error_is_generic() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/forgot-password")
            .with_status(500)
            .with_body("oops")
            .create_async()
            .await;

        let provider = HttpIdentityProvider::new(server.url()).unwrap();
        let err = provider.forgot_password("jane@x.com").await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::Generic(_))));
    }

    #[tokio::test]
    async fn test_refresh_keeps_refresh_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/refresh")
            .match_body(Matcher::PartialJsonString(
                r#"{"refresh_token":"refresh"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(r#"{"access_token":"opaque","expires_in":3600}"#)
            .create_async()
            .await;

        let provider = HttpIdentityProvider::new(server.url()).unwrap();
        let previous = SessionTokens {
            access_token: "old".into(),
            id_token: Some("id".into()),
            refresh_token: Some("refresh".into()),
            expires_at: Utc::now(),
            email: Some("jane@x.com".into()),
        };

        let tokens = provider.refresh(&previous).await.unwrap();
        assert_eq!(tokens.access_token, "opaque");
        assert_eq!(tokens.refresh_token.as_deref(), Some("refresh"));
        assert_eq!(tokens.email.as_deref(), Some("jane@x.com"));
        assert!(tokens.expires_at > Utc::now() + chrono::Duration::minutes(59));
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token_expires_session() {
        let provider = HttpIdentityProvider::new("http://127.0.0.1:9").unwrap();
        let tokens = SessionTokens {
            access_token: "old".into(),
            id_token: None,
            refresh_token: None,
            expires_at: Utc::now(),
            email: None,
        };
        let err = provider.refresh(&tokens).await.unwrap_err();
        assert!(matches!(err, Error::Auth(AuthError::SessionExpired)));
    }

    #[tokio::test]
    async fn test_confirm_sign_up_accepts_empty_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/confirm-sign-up")
            .with_status(200)
            .create_async()
            .await;

        let provider = HttpIdentityProvider::new(server.url()).unwrap();
        provider.confirm_sign_up("jane@x.com", "123456").await.unwrap();
    }
}
