use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};

use async_trait::async_trait;
use chrono::NaiveDate;
use orbit_core::{
    errors::OrbitError,
    models::profile::{Category, DayOfWeek, ScheduleSlot},
    store::{PersistedState, ProfilePersistence, ProfileStore},
};
use pretty_assertions::assert_eq;

#[derive(Clone, Default)]
struct MemoryPersistence {
    saved: Arc<Mutex<Vec<PersistedState>>>,
    initial: PersistedState,
}

#[async_trait]
impl ProfilePersistence for MemoryPersistence {
    async fn load(&self) -> eyre::Result<PersistedState> {
        Ok(self.initial.clone())
    }

    async fn save(&self, state: &PersistedState) -> eyre::Result<()> {
        self.saved.lock().unwrap().push(state.clone());
        Ok(())
    }
}

struct FailingPersistence;

#[async_trait]
impl ProfilePersistence for FailingPersistence {
    async fn load(&self) -> eyre::Result<PersistedState> {
        Ok(PersistedState::default())
    }

    async fn save(&self, _state: &PersistedState) -> eyre::Result<()> {
        Err(eyre::eyre!("disk full"))
    }
}

/// Saves succeed until `fail` is switched on.
#[derive(Clone, Default)]
struct SwitchablePersistence {
    fail: Arc<AtomicBool>,
}

#[async_trait]
impl ProfilePersistence for SwitchablePersistence {
    async fn load(&self) -> eyre::Result<PersistedState> {
        Ok(PersistedState::default())
    }

    async fn save(&self, _state: &PersistedState) -> eyre::Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(eyre::eyre!("disk full"));
        }
        Ok(())
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

fn slot(id: &str) -> ScheduleSlot {
    ScheduleSlot {
        id: id.to_string(),
        time: "09:00 AM - 10:00 AM".to_string(),
        title: "Read".to_string(),
        category: Category::Personal,
        completed: false,
        description: None,
        notes: None,
    }
}

#[tokio::test]
async fn test_login_creates_and_persists_profile() {
    let persistence = MemoryPersistence::default();
    let saved = persistence.saved.clone();
    let mut store = ProfileStore::open(persistence).await.unwrap();

    let profile = store.login("alice", today()).await.unwrap();
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.join_date, today());

    let saved = saved.lock().unwrap();
    assert_eq!(saved.len(), 1);
    assert_eq!(saved[0].active_user.as_deref(), Some("alice"));
    assert!(saved[0].profiles.contains_key("alice"));
}

#[tokio::test]
async fn test_login_rejects_blank_username() {
    let mut store = ProfileStore::open(MemoryPersistence::default()).await.unwrap();
    let err = store.login("   ", today()).await.unwrap_err();
    assert!(matches!(err, OrbitError::Validation(_)));
}

#[tokio::test]
async fn test_update_requires_active_user() {
    let mut store = ProfileStore::open(MemoryPersistence::default()).await.unwrap();
    let err = store
        .update(|profile| profile.add_slot(DayOfWeek::Monday, slot("1")))
        .await
        .unwrap_err();
    assert!(matches!(err, OrbitError::Authentication(_)));
}

#[tokio::test]
async fn test_failed_change_leaves_profile_untouched() {
    let persistence = MemoryPersistence::default();
    let saved = persistence.saved.clone();
    let mut store = ProfileStore::open(persistence).await.unwrap();
    store.login("alice", today()).await.unwrap();

    let result = store
        .update(|profile| {
            profile.add_slot(DayOfWeek::Monday, slot("1"))?;
            profile.add_slot(DayOfWeek::Monday, slot("1"))
        })
        .await;

    assert!(result.is_err());
    assert!(store.active().unwrap().tasks_for(DayOfWeek::Monday).is_empty());
    assert_eq!(saved.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_toggle_task_refreshes_daily_stat() {
    let mut store = ProfileStore::open(MemoryPersistence::default()).await.unwrap();
    store.login("alice", today()).await.unwrap();
    store
        .update(|profile| profile.add_slot(DayOfWeek::Monday, slot("1")))
        .await
        .unwrap();

    assert!(store.toggle_task(today(), "1").await.unwrap());

    let stat = store.active().unwrap().daily_stats[&today()];
    assert_eq!(stat.completed, 1);
    assert_eq!(stat.total, 1);
}

#[tokio::test]
async fn test_toggle_water() {
    let mut store = ProfileStore::open(MemoryPersistence::default()).await.unwrap();
    store.login("alice", today()).await.unwrap();

    assert!(store.toggle_water(today(), "water-wake").await.unwrap());
    assert!(store.active().unwrap().water_config.is_done("water-wake"));
}

#[tokio::test]
async fn test_logout_and_remove() {
    let mut store = ProfileStore::open(MemoryPersistence::default()).await.unwrap();
    store.login("alice", today()).await.unwrap();
    store.login("bob", today()).await.unwrap();

    store.logout().await.unwrap();
    assert!(store.active().is_none());
    assert_eq!(store.state().profiles.len(), 2);

    store.login("bob", today()).await.unwrap();
    store.remove("bob").await.unwrap();
    assert!(store.state().active_user.is_none());
    assert!(store.remove("bob").await.is_err());
}

#[tokio::test]
async fn test_open_normalizes_loaded_profiles() {
    let mut initial = PersistedState::default();
    let mut profile = orbit_core::models::profile::UserProfile::new("alice", today());
    profile
        .schedule
        .insert(DayOfWeek::Monday, vec![{
            let mut late = slot("late");
            late.time = "05:00 PM".to_string();
            late
        }, slot("early")]);
    initial.profiles.insert("alice".to_string(), profile);
    initial.active_user = Some("alice".to_string());

    let store = ProfileStore::open(MemoryPersistence {
        initial,
        ..Default::default()
    })
    .await
    .unwrap();

    let ids: Vec<&str> = store
        .active()
        .unwrap()
        .tasks_for(DayOfWeek::Monday)
        .iter()
        .map(|s| s.id.as_str())
        .collect();
    assert_eq!(ids, vec!["early", "late"]);
}

#[tokio::test]
async fn test_persistence_failure_surfaces() {
    let mut store = ProfileStore::open(FailingPersistence).await.unwrap();
    let err = store.login("alice", today()).await.unwrap_err();
    assert!(matches!(err, OrbitError::Database(_)));
}

#[tokio::test]
async fn test_failed_save_rolls_back_change() {
    let persistence = SwitchablePersistence::default();
    let fail = persistence.fail.clone();
    let mut store = ProfileStore::open(persistence).await.unwrap();
    store.login("alice", today()).await.unwrap();
    store
        .update(|profile| profile.add_slot(DayOfWeek::Monday, slot("1")))
        .await
        .unwrap();

    fail.store(true, Ordering::SeqCst);
    let err = store
        .update(|profile| profile.add_slot(DayOfWeek::Monday, slot("2")))
        .await
        .unwrap_err();
    assert!(matches!(err, OrbitError::Database(_)));

    let ids: Vec<_> = store
        .active()
        .unwrap()
        .tasks_for(DayOfWeek::Monday)
        .iter()
        .map(|task| task.id.as_str())
        .collect();
    assert_eq!(ids, vec!["1"]);
}
