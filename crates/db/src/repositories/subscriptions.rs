use crate::models::DbPushSubscription;
use chrono::Utc;
use eyre::Result;
use orbit_core::models::push::PushSubscription;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

/// Stores a subscription; an endpoint seen before is re-bound to `username`.
pub async fn upsert_subscription(
    pool: &Pool<Postgres>,
    username: &str,
    subscription: &PushSubscription,
) -> Result<DbPushSubscription> {
    let saved = sqlx::query_as::<_, DbPushSubscription>(
        r#"
        INSERT INTO push_subscriptions (id, username, endpoint, p256dh, auth, created_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (endpoint)
        DO UPDATE SET username = EXCLUDED.username, p256dh = EXCLUDED.p256dh, auth = EXCLUDED.auth
        RETURNING id, username, endpoint, p256dh, auth, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(&subscription.endpoint)
    .bind(&subscription.keys.p256dh)
    .bind(&subscription.keys.auth)
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    Ok(saved)
}

pub async fn get_subscriptions_by_username(
    pool: &Pool<Postgres>,
    username: &str,
) -> Result<Vec<DbPushSubscription>> {
    let subscriptions = sqlx::query_as::<_, DbPushSubscription>(
        r#"
        SELECT id, username, endpoint, p256dh, auth, created_at
        FROM push_subscriptions
        WHERE username = $1
        ORDER BY created_at ASC
        "#,
    )
    .bind(username)
    .fetch_all(pool)
    .await?;

    Ok(subscriptions)
}

pub async fn delete_subscription_by_endpoint(pool: &Pool<Postgres>, endpoint: &str) -> Result<()> {
    sqlx::query(
        r#"
        DELETE FROM push_subscriptions
        WHERE endpoint = $1
        "#,
    )
    .bind(endpoint)
    .execute(pool)
    .await?;

    Ok(())
}
