use chrono::NaiveDate;
use orbit_client::JsonFilePersistence;
use orbit_core::{
    models::profile::{Category, DayOfWeek, ScheduleSlot},
    store::{PersistedState, ProfilePersistence, ProfileStore},
};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
}

#[tokio::test]
async fn test_missing_file_loads_empty_state() {
    let dir = tempdir().unwrap();
    let persistence = JsonFilePersistence::new(dir.path().join("orbit.json"));

    assert_eq!(persistence.load().await.unwrap(), PersistedState::default());
}

#[tokio::test]
async fn test_store_survives_restart() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("orbit.json");

    {
        let mut store = ProfileStore::open(JsonFilePersistence::new(&path)).await.unwrap();
        store.login("alice", today()).await.unwrap();
        store
            .update(|profile| {
                profile.add_slot(
                    DayOfWeek::Monday,
                    ScheduleSlot {
                        id: "gym".to_string(),
                        time: "06:00 AM - 07:00 AM".to_string(),
                        title: "Gym".to_string(),
                        category: Category::Fitness,
                        completed: false,
                        description: None,
                        notes: None,
                    },
                )
            })
            .await
            .unwrap();
        store.toggle_task(today(), "gym").await.unwrap();
    }

    let store = ProfileStore::open(JsonFilePersistence::new(&path)).await.unwrap();
    let profile = store.active().unwrap();
    assert_eq!(profile.username, "alice");
    assert!(profile.tasks_for(DayOfWeek::Monday)[0].completed);
    assert_eq!(profile.daily_stats[&today()].completed, 1);
    assert!(!dir.path().join("nested").join("orbit.json.tmp").exists());
}

#[tokio::test]
async fn test_file_uses_local_storage_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("orbit.json");
    let mut store = ProfileStore::open(JsonFilePersistence::new(&path)).await.unwrap();
    store.login("alice", today()).await.unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(raw["activeUser"], "alice");
    assert_eq!(raw["profiles"]["alice"]["joinDate"], "2024-03-04");
}

#[tokio::test]
async fn test_corrupt_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("orbit.json");
    std::fs::write(&path, "{not json").unwrap();

    assert!(JsonFilePersistence::new(&path).load().await.is_err());
}
