use std::{sync::Arc, time::Duration};

use chrono::{NaiveDate, NaiveDateTime};
use orbit_client::{NotificationTicker, mock::MockNotifier, ticker::spawn_ticker};
use orbit_core::{
    models::profile::{ClassSession, ClassType, DayOfWeek, UserProfile},
    notify::{Alert, OrbitNotification, Urgency},
};
use pretty_assertions::assert_eq;
use tokio::sync::{Mutex, mpsc, watch};

fn monday(h: u32, m: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(h, m, 0)
        .unwrap()
}

fn student() -> UserProfile {
    let mut profile = UserProfile::new("alice", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    profile.academic_schedule.insert(
        DayOfWeek::Monday,
        vec![ClassSession {
            id: "chem".to_string(),
            subject: "Chemistry".to_string(),
            class_type: ClassType::Lab,
            professor: String::new(),
            venue: "Lab 2".to_string(),
            batch: "B1".to_string(),
            start_time: "02:00 PM".to_string(),
            end_time: "04:00 PM".to_string(),
        }],
    );
    profile
}

#[test]
fn test_alerts_go_to_system_notifier() {
    let mut notifier = MockNotifier::new();
    notifier.expect_is_available().return_const(true);
    notifier
        .expect_notify()
        .withf(|alert: &Alert| alert.urgency == Urgency::Critical && alert.event_id == "chem")
        .times(1)
        .returning(|_| Ok(()));

    let mut ticker = NotificationTicker::new(Arc::new(notifier));
    let banners = ticker.tick(monday(13, 56), &student());

    assert_eq!(banners.len(), 1);
    assert_eq!(banners[0].id, "class-chem");
}

#[test]
fn test_unavailable_notifier_drops_alerts() {
    let mut notifier = MockNotifier::new();
    notifier.expect_is_available().return_const(false);
    notifier.expect_notify().never();

    let mut ticker = NotificationTicker::new(Arc::new(notifier));
    let banners = ticker.tick(monday(13, 45), &student());

    // Banners still show in-app
    assert_eq!(banners.len(), 1);
}

#[test]
fn test_notifier_error_is_swallowed() {
    let mut notifier = MockNotifier::new();
    notifier.expect_is_available().return_const(true);
    notifier
        .expect_notify()
        .returning(|_| Err(eyre::eyre!("permission revoked")));

    let mut ticker = NotificationTicker::new(Arc::new(notifier));
    assert_eq!(ticker.tick(monday(13, 45), &student()).len(), 1);
}

#[test]
fn test_dismissed_banner_stays_hidden() {
    let mut notifier = MockNotifier::new();
    notifier.expect_is_available().return_const(false);

    let mut ticker = NotificationTicker::new(Arc::new(notifier));
    assert_eq!(ticker.tick(monday(13, 45), &student()).len(), 1);

    ticker.dismiss("class-chem");
    assert!(ticker.tick(monday(13, 46), &student()).is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_loop_reports_banners_for_signed_in_user() {
    let mut notifier = MockNotifier::new();
    notifier.expect_is_available().return_const(false);
    let ticker = Arc::new(Mutex::new(NotificationTicker::new(Arc::new(notifier))));

    let (profile_tx, profile_rx) = watch::channel(None);
    let (banner_tx, mut banner_rx) = mpsc::unbounded_channel::<Vec<OrbitNotification>>();

    let handle = spawn_ticker(
        ticker,
        profile_rx,
        Duration::from_secs(10),
        || monday(13, 50),
        move |banners| {
            let _ = banner_tx.send(banners);
        },
    );

    // Nobody signed in yet: no report
    tokio::time::sleep(Duration::from_secs(15)).await;
    assert!(banner_rx.try_recv().is_err());

    profile_tx.send_replace(Some(student()));
    let banners = banner_rx.recv().await.unwrap();
    assert_eq!(banners[0].title, "Chemistry");
    assert_eq!(banners[0].minutes_until, 10);

    handle.abort();
}
