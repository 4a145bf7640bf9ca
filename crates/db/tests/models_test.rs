use chrono::{NaiveDate, TimeZone, Utc};
use mockall::predicate;
use orbit_core::models::{auth::UserSummary, profile::UserProfile};
use orbit_db::{
    OrbitRepository,
    mock::MockRepository,
    models::{DbProfile, DbPushSubscription, DbUserSummary, NewUser},
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use sqlx::types::Json;
use uuid::Uuid;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_profile_row_unwraps_document() {
    let profile = UserProfile::new("alice", date(2024, 3, 4));
    let row = DbProfile {
        username: "alice".to_string(),
        data: Json(profile.clone()),
        updated_at: Utc::now(),
    };

    assert_eq!(row.into_profile(), profile);
}

#[rstest]
#[case::synced(Some(Utc.with_ymd_and_hms(2024, 3, 4, 9, 30, 0).unwrap()))]
#[case::never_synced(None)]
fn test_user_summary_conversion(#[case] synced: Option<chrono::DateTime<Utc>>) {
    let created = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let row = DbUserSummary {
        username: "alice".to_string(),
        email: Some("alice@example.com".to_string()),
        created_at: created,
        last_synced_at: synced,
    };

    let summary: UserSummary = row.into();
    assert_eq!(summary.username, "alice");
    assert_eq!(summary.email.as_deref(), Some("alice@example.com"));
    assert_eq!(summary.created_at, created);
    assert_eq!(summary.last_synced_at, synced);
}

#[test]
fn test_subscription_row_to_browser_shape() {
    let row = DbPushSubscription {
        id: Uuid::new_v4(),
        username: "alice".to_string(),
        endpoint: "https://push.example.com/abc".to_string(),
        p256dh: "BPublicKey".to_string(),
        auth: "secret".to_string(),
        created_at: Utc::now(),
    };

    let subscription = row.to_subscription();
    let json = serde_json::to_value(&subscription).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "endpoint": "https://push.example.com/abc",
            "keys": { "p256dh": "BPublicKey", "auth": "secret" }
        })
    );
}

#[tokio::test]
async fn test_mock_repository_reports_taken_username() {
    let mut repo = MockRepository::new();
    repo.expect_create_user()
        .withf(|user: &NewUser| user.username == "alice")
        .times(1)
        .returning(|_| Ok(None));
    repo.expect_delete_user()
        .with(predicate::eq("ghost"))
        .returning(|_| Ok(false));

    let user = NewUser {
        username: "alice".to_string(),
        email: None,
        password_hash: "hash".to_string(),
    };

    let repo: &dyn OrbitRepository = &repo;
    assert!(repo.create_user(&user).await.unwrap().is_none());
    assert!(!repo.delete_user("ghost").await.unwrap());
}
