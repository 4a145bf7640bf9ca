use crate::models::{DbUser, DbUserSummary, NewUser};
use chrono::Utc;
use eyre::Result;
use sqlx::{Pool, Postgres};

/// Inserts a user, returning `None` when the username is already taken.
pub async fn create_user(pool: &Pool<Postgres>, user: &NewUser) -> Result<Option<DbUser>> {
    tracing::debug!(
        "Creating user: username={}, has_email={}",
        user.username,
        user.email.is_some()
    );

    let created = sqlx::query_as::<_, DbUser>(
        r#"
        INSERT INTO users (username, email, password_hash, created_at)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (username) DO NOTHING
        RETURNING username, email, password_hash, created_at
        "#,
    )
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(Utc::now())
    .fetch_optional(pool)
    .await?;

    Ok(created)
}

pub async fn get_user_by_username(pool: &Pool<Postgres>, username: &str) -> Result<Option<DbUser>> {
    let user = sqlx::query_as::<_, DbUser>(
        r#"
        SELECT username, email, password_hash, created_at
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn list_users(pool: &Pool<Postgres>) -> Result<Vec<DbUserSummary>> {
    let users = sqlx::query_as::<_, DbUserSummary>(
        r#"
        SELECT u.username, u.email, u.created_at, p.updated_at AS last_synced_at
        FROM users u
        LEFT JOIN profiles p ON p.username = u.username
        ORDER BY u.created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(users)
}

/// Deletes a user with their profile and subscriptions. Returns whether a row existed.
pub async fn delete_user(pool: &Pool<Postgres>, username: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
