use async_trait::async_trait;
use orbit_core::{
    errors::{OrbitError, OrbitResult},
    models::{
        auth::{AuthResponse, LoginRequest, RegisterRequest, SyncResponse},
        profile::UserProfile,
        push::PushSubscription,
    },
};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

use crate::debounce::ProfilePusher;

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the Orbit backend.
#[derive(Debug, Clone)]
pub struct SyncClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl SyncClient {
    pub fn new(base_url: &str) -> OrbitResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| OrbitError::Internal(Box::new(e)))?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: RequestBuilder) -> OrbitResult<RequestBuilder> {
        let token = self
            .token
            .as_ref()
            .ok_or_else(|| OrbitError::Authentication("Not signed in".into()))?;
        Ok(request.bearer_auth(token))
    }

    /// Creates an account and keeps the returned token.
    pub async fn register(
        &mut self,
        username: &str,
        password: &str,
        email: Option<&str>,
    ) -> OrbitResult<AuthResponse> {
        let body = RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: email.map(str::to_string),
        };
        let response = self.http.post(self.url("/auth/register")).json(&body);
        let auth: AuthResponse = send(response).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    /// Signs in and keeps the returned token.
    pub async fn login(&mut self, username: &str, password: &str) -> OrbitResult<AuthResponse> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self.http.post(self.url("/auth/login")).json(&body);
        let auth: AuthResponse = send(response).await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    pub fn logout(&mut self) {
        self.token = None;
    }

    pub async fn fetch_profile(&self) -> OrbitResult<UserProfile> {
        let request = self.authorized(self.http.get(self.url("/sync")))?;
        send(request).await
    }

    pub async fn push_profile(&self, profile: &UserProfile) -> OrbitResult<SyncResponse> {
        let request = self.authorized(self.http.post(self.url("/sync")).json(profile))?;
        send(request).await
    }

    pub async fn subscribe(&self, subscription: &PushSubscription) -> OrbitResult<()> {
        let request = self.authorized(self.http.post(self.url("/api/subscribe")).json(subscription))?;
        let _: serde_json::Value = send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl ProfilePusher for SyncClient {
    async fn push(&self, profile: &UserProfile) -> OrbitResult<()> {
        self.push_profile(profile).await.map(|_| ())
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> OrbitResult<T> {
    let response = request.send().await.map_err(|e| {
        tracing::warn!("Request to Orbit server failed: {}", e);
        OrbitError::Internal(Box::new(e))
    })?;
    if !response.status().is_success() {
        return Err(error_from_response(response).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|e| OrbitError::Internal(Box::new(e)))
}

async fn error_from_response(response: Response) -> OrbitError {
    let status = response.status();
    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.to_string(),
    };

    match status {
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => OrbitError::Validation(message),
        StatusCode::UNAUTHORIZED => OrbitError::Authentication(message),
        StatusCode::FORBIDDEN => OrbitError::Authorization(message),
        StatusCode::NOT_FOUND => OrbitError::NotFound(message),
        StatusCode::CONFLICT => OrbitError::Conflict(message),
        _ => OrbitError::Internal(format!("Server error {}: {}", status, message).into()),
    }
}
