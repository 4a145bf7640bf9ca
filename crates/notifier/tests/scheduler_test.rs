use std::{
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use chrono_tz::Tz;
use orbit_db::mock::MockRepository;
use orbit_notifier::{
    config::{NotifierConfig, parse_timezone},
    jobs::JobContext,
    scheduler::spawn_jobs,
};
use pretty_assertions::assert_eq;

fn config() -> NotifierConfig {
    NotifierConfig {
        database_url: String::new(),
        vapid: None,
        timezone: Tz::UTC,
        // Keep the other loops quiet after their first tick
        reminder_interval: Duration::from_secs(24 * 60 * 60),
        hydration_interval: Duration::from_secs(24 * 60 * 60),
        rollover_interval: Duration::from_secs(5 * 60),
        enabled: true,
    }
}

#[tokio::test(start_paused = true)]
async fn test_rollover_runs_on_its_interval() {
    let scans = Arc::new(AtomicUsize::new(0));
    let counter = scans.clone();

    let mut repo = MockRepository::new();
    repo.expect_list_profiles().returning(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(vec![])
    });

    let ctx = Arc::new(JobContext::new(Arc::new(repo), None, Tz::UTC));
    let handles = spawn_jobs(ctx, &config());

    // Every loop scans once at start, then the rollover at 5 and 10 minutes
    tokio::time::sleep(Duration::from_secs(10 * 60 + 1)).await;
    assert_eq!(scans.load(Ordering::SeqCst), 5);

    handles.iter().for_each(|handle| handle.abort());
}

#[test]
fn test_parse_timezone() {
    assert_eq!(parse_timezone(" Asia/Kolkata ").unwrap(), Tz::Asia__Kolkata);
    assert!(parse_timezone("Mars/Olympus").is_err());
}
