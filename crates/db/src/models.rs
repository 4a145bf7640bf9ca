use chrono::{DateTime, Utc};
use orbit_core::models::{auth::UserSummary, profile::UserProfile, push::PushSubscription};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct DbProfile {
    pub username: String,
    pub data: Json<UserProfile>,
    pub updated_at: DateTime<Utc>,
}

impl DbProfile {
    pub fn into_profile(self) -> UserProfile {
        self.data.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbUserSummary {
    pub username: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_synced_at: Option<DateTime<Utc>>,
}

impl From<DbUserSummary> for UserSummary {
    fn from(row: DbUserSummary) -> Self {
        Self {
            username: row.username,
            email: row.email,
            created_at: row.created_at,
            last_synced_at: row.last_synced_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbPushSubscription {
    pub id: Uuid,
    pub username: String,
    pub endpoint: String,
    pub p256dh: String,
    pub auth: String,
    pub created_at: DateTime<Utc>,
}

impl DbPushSubscription {
    pub fn to_subscription(&self) -> PushSubscription {
        PushSubscription {
            endpoint: self.endpoint.clone(),
            keys: orbit_core::models::push::SubscriptionKeys {
                p256dh: self.p256dh.clone(),
                auth: self.auth.clone(),
            },
        }
    }
}
