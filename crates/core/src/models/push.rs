use serde::{Deserialize, Serialize};

use crate::notify::{Alert, EventKind};

/// Browser push subscription as produced by `PushSubscription.toJSON()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    pub keys: SubscriptionKeys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    /// Client public key, base64url uncompressed P-256 point.
    pub p256dh: String,
    /// Client auth secret, base64url.
    pub auth: String,
}

/// JSON body delivered to the service worker `push` handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushPayload {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub tag: String,
    pub url: String,
}

impl PushPayload {
    pub fn from_alert(alert: &Alert) -> Self {
        Self {
            title: alert.title.clone(),
            message: alert.message.clone(),
            kind: alert.kind.channel().to_string(),
            tag: alert.key.clone(),
            url: landing_url(alert.kind).to_string(),
        }
    }
}

fn landing_url(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Task => "/schedule",
        EventKind::Class => "/academic",
        EventKind::Water => "/water",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VapidKeyResponse {
    pub public_key: String,
}
