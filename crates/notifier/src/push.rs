use async_trait::async_trait;
use chrono::Utc;
use eyre::{Result, WrapErr};
use orbit_core::models::push::{PushPayload, PushSubscription};
use reqwest::{StatusCode, header};
use std::time::Duration;

use crate::{
    config::VapidConfig,
    crypto::{VapidSigner, decode_base64url, encrypt_payload},
};

/// Seconds a push service should hold an undelivered message.
pub const PUSH_TTL_SECONDS: u32 = 24 * 60 * 60;

/// What the push service said about one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered,
    /// The subscription expired or was revoked (404 / 410) and should be dropped.
    Gone,
    Rejected(u16),
}

impl SendOutcome {
    pub fn from_status(status: StatusCode) -> Self {
        if status.is_success() {
            SendOutcome::Delivered
        } else if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
            SendOutcome::Gone
        } else {
            SendOutcome::Rejected(status.as_u16())
        }
    }
}

#[async_trait]
pub trait PushSender: Send + Sync {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &PushPayload,
    ) -> Result<SendOutcome>;
}

/// Delivers encrypted Web Push messages over HTTP.
pub struct WebPushSender {
    client: reqwest::Client,
    signer: VapidSigner,
}

impl WebPushSender {
    pub fn new(vapid: &VapidConfig) -> Result<Self> {
        let signer = VapidSigner::new(&vapid.public_key, &vapid.private_key, &vapid.subject)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .wrap_err("Failed to build push HTTP client")?;

        Ok(Self { client, signer })
    }
}

#[async_trait]
impl PushSender for WebPushSender {
    async fn send(
        &self,
        subscription: &PushSubscription,
        payload: &PushPayload,
    ) -> Result<SendOutcome> {
        let ua_public = decode_base64url(&subscription.keys.p256dh)?;
        let auth_secret = decode_base64url(&subscription.keys.auth)?;
        let body = encrypt_payload(&serde_json::to_vec(payload)?, &ua_public, &auth_secret)?;
        let authorization = self.signer.authorization(&subscription.endpoint, Utc::now())?;

        let response = self
            .client
            .post(&subscription.endpoint)
            .header(header::AUTHORIZATION, authorization)
            .header(header::CONTENT_ENCODING, "aes128gcm")
            .header(header::CONTENT_TYPE, "application/octet-stream")
            .header("TTL", PUSH_TTL_SECONDS.to_string())
            .body(body)
            .send()
            .await
            .wrap_err("Push request failed")?;

        let outcome = SendOutcome::from_status(response.status());
        if let SendOutcome::Rejected(status) = outcome {
            let reason = response.text().await.unwrap_or_default();
            tracing::warn!("Push service rejected message ({}): {}", status, reason);
        }
        Ok(outcome)
    }
}
