//! Admin REST API client implementation

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::{Client as HttpClient, Method, Response, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use super::api::{OrganizationApi, RecordApi, UserApi};
use super::models::{Organization, OrganizationDraft, Record, ResourceKind, User, UserDraft};
use super::pagination::{ListBody, ListParams, Page};
use crate::error::{ApiError, Result};

/// Client-side request ceiling: 10 per second
const RATE_LIMIT_PER_SECOND: u32 = 10;

/// Admin API client.
///
/// Every request carries `Authorization: Bearer <token>` using the token most
/// recently handed over by the session layer.
pub struct AdminClient {
    http: HttpClient,
    base_url: String,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    token: Arc<RwLock<Option<String>>>,
}

impl AdminClient {
    /// Create a new client for the API rooted at `base_url`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("adminctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(
            std::num::NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap_or(std::num::NonZeroU32::MIN),
        );

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Set the bearer token used for subsequent requests
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    /// Forget the bearer token
    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    /// Send a request and map non-2xx statuses to errors.
    async fn send<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        body: Option<&B>,
    ) -> Result<Response> {
        self.rate_limiter.until_ready().await;

        let token = self
            .token
            .read()
            .await
            .clone()
            .ok_or(ApiError::Unauthorized)?;

        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header("Authorization", format!("Bearer {}", token));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::from)?;

        let status = response.status();
        debug!("{} {} -> {}", method, path, status);
        match status {
            s if s.is_success() => Ok(response),
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound(path.to_string()).into()),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                Err(ApiError::RateLimit(Duration::from_secs(retry_after)).into())
            }
            s => Err(ApiError::Status(s.as_u16()).into()),
        }
    }

    async fn json<T: DeserializeOwned>(response: Response) -> Result<T> {
        let data = response
            .json::<T>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        Ok(data)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send::<()>(Method::GET, path, &[], None).await?;
        Self::json(response).await
    }

    async fn list<T: DeserializeOwned>(&self, path: &str, params: &ListParams) -> Result<Page<T>> {
        let response = self
            .send::<()>(Method::GET, path, &params.to_query_params(), None)
            .await?;
        let body: ListBody<T> = Self::json(response).await?;
        Ok(body.into())
    }

    async fn write<T: DeserializeOwned, B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.send(method, path, &[], Some(body)).await?;
        Self::json(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.send::<()>(Method::DELETE, path, &[], None).await?;
        Ok(())
    }
}

#[async_trait]
impl UserApi for AdminClient {
    async fn get_user(&self, id: &str) -> Result<User> {
        self.get(&ResourceKind::User.get_path(id)).await
    }

    async fn list_users(&self, params: &ListParams) -> Result<Page<User>> {
        self.list(&ResourceKind::User.list_path(), params).await
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<User> {
        self.write(Method::POST, &ResourceKind::User.create_path(), draft)
            .await
    }

    async fn update_user(&self, id: &str, draft: &UserDraft) -> Result<User> {
        self.write(Method::PUT, &ResourceKind::User.update_path(id), draft)
            .await
    }

    async fn delete_user(&self, id: &str) -> Result<()> {
        self.delete(&ResourceKind::User.delete_path(id)).await
    }
}

#[async_trait]
impl OrganizationApi for AdminClient {
    async fn get_organization(&self, id: &str) -> Result<Organization> {
        self.get(&ResourceKind::Organization.get_path(id)).await
    }

    async fn list_organizations(&self, params: &ListParams) -> Result<Page<Organization>> {
        self.list(&ResourceKind::Organization.list_path(), params)
            .await
    }

    async fn create_organization(&self, draft: &OrganizationDraft) -> Result<Organization> {
        self.write(Method::POST, &ResourceKind::Organization.create_path(), draft)
            .await
    }

    async fn update_organization(
        &self,
        id: &str,
        draft: &OrganizationDraft,
    ) -> Result<Organization> {
        self.write(
            Method::PUT,
            &ResourceKind::Organization.update_path(id),
            draft,
        )
        .await
    }

    async fn delete_organization(&self, id: &str) -> Result<()> {
        self.delete(&ResourceKind::Organization.delete_path(id))
            .await
    }
}

#[async_trait]
impl RecordApi for AdminClient {
    async fn get_record(&self, kind: ResourceKind, id: &str) -> Result<Record> {
        self.get(&kind.get_path(id)).await
    }

    async fn list_records(&self, kind: ResourceKind, params: &ListParams) -> Result<Page<Record>> {
        self.list(&kind.list_path(), params).await
    }

    async fn create_record(&self, kind: ResourceKind, body: &Map<String, Value>) -> Result<Record> {
        self.write(Method::POST, &kind.create_path(), body).await
    }

    async fn update_record(
        &self,
        kind: ResourceKind,
        id: &str,
        body: &Map<String, Value>,
    ) -> Result<Record> {
        self.write(Method::PUT, &kind.update_path(id), body).await
    }

    async fn delete_record(&self, kind: ResourceKind, id: &str) -> Result<()> {
        self.delete(&kind.delete_path(id)).await
    }
}
