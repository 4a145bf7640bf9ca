use crate::models::DbProfile;
use chrono::Utc;
use eyre::Result;
use orbit_core::models::profile::UserProfile;
use sqlx::{Pool, Postgres, types::Json};

pub async fn get_profile(pool: &Pool<Postgres>, username: &str) -> Result<Option<DbProfile>> {
    let profile = sqlx::query_as::<_, DbProfile>(
        r#"
        SELECT username, data, updated_at
        FROM profiles
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(profile)
}

/// Last write wins; there is no conflict detection between devices.
pub async fn upsert_profile(
    pool: &Pool<Postgres>,
    username: &str,
    profile: &UserProfile,
) -> Result<DbProfile> {
    let saved = sqlx::query_as::<_, DbProfile>(
        r#"
        INSERT INTO profiles (username, data, updated_at)
        VALUES ($1, $2, $3)
        ON CONFLICT (username)
        DO UPDATE SET data = EXCLUDED.data, updated_at = EXCLUDED.updated_at
        RETURNING username, data, updated_at
        "#,
    )
    .bind(username)
    .bind(Json(profile))
    .bind(Utc::now())
    .fetch_one(pool)
    .await?;

    tracing::debug!("Profile saved: username={}", username);
    Ok(saved)
}

pub async fn list_profiles(pool: &Pool<Postgres>) -> Result<Vec<DbProfile>> {
    let profiles = sqlx::query_as::<_, DbProfile>(
        r#"
        SELECT username, data, updated_at
        FROM profiles
        ORDER BY username ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(profiles)
}
