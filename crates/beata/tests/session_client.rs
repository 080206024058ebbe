//! End-to-end tests for `SessionClient`: login, navigation, monitor-driven
//! logout, and resuming a stored session.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use beata::prelude::*;
use beata::ConfigError;
use beata_liveness::LivenessError;
use beata_session::ManualClock;
use chrono::{DateTime, TimeDelta, Utc};

// =========================================================================
// Helpers
// =========================================================================

const MINUTE: Duration = Duration::from_secs(60);

#[derive(Clone, Default)]
struct CountingProbe(Arc<AtomicUsize>);

impl LivenessProbe for CountingProbe {
    async fn ping(&self) -> Result<(), LivenessError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn t0() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(1_750_000_000, 0).unwrap()
}

struct Fixture {
    client: SessionClient<CountingProbe>,
    store: SessionStore,
    clock: ManualClock,
    ended: Arc<AtomicUsize>,
}

fn fixture_on(storage: impl Storage) -> Fixture {
    let clock = ManualClock::new(t0());
    let store = SessionStore::with_clock(storage, clock.clone(), SessionConfig::default());
    let ended = Arc::new(AtomicUsize::new(0));
    let hits = Arc::clone(&ended);
    let client = SessionClient::builder(BeataConfig::default())
        .on_session_end(move || {
            hits.fetch_add(1, Ordering::SeqCst);
        })
        .build_with_store(store.clone(), CountingProbe::default());
    Fixture {
        client,
        store,
        clock,
        ended,
    }
}

fn fixture() -> Fixture {
    fixture_on(MemoryStorage::new())
}

// =========================================================================
// Login and logout
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_login_stamps_eight_hour_expiry() {
    let mut f = fixture();
    let session = f
        .client
        .login(UserRecord::new(7, "ana", Role::Admin).with_token("t0k3n"))
        .unwrap();

    assert_eq!(session.expires_at, t0() + TimeDelta::hours(8));
    assert_eq!(f.client.current_user(), Some(session));
    assert_eq!(f.client.authorization_header().as_deref(), Some("Bearer t0k3n"));
}

#[tokio::test(start_paused = true)]
async fn test_incomplete_login_leaves_nothing_stored() {
    let mut f = fixture();
    let mut record = UserRecord::new(7, "ana", Role::Admin);
    record.role = None;

    let err = f.client.login(record).unwrap_err();
    assert!(matches!(err, BeataError::IncompleteLogin));
    assert!(f.store.load().unwrap().is_none());
    assert!(!f.client.is_monitoring());
}

#[tokio::test(start_paused = true)]
async fn test_logout_then_navigate_requires_login() {
    let mut f = fixture();
    f.client.login(UserRecord::new(7, "ana", Role::Admin)).unwrap();

    let redirect = f.client.logout().unwrap();
    assert_eq!(redirect.path, "/login");

    let decision = f.client.navigate(&Route::new("/dashboard"), &Route::new("/login"));
    assert_eq!(
        decision,
        Decision::RedirectTo(Redirect::to("/login").with_query("redirect", "/dashboard"))
    );
}

#[tokio::test(start_paused = true)]
async fn test_staff_navigation_after_login() {
    let mut f = fixture();
    f.client.login(UserRecord::new(9, "lena", Role::Staff)).unwrap();

    assert!(f.client.navigate(&Route::new("/homeims"), &Route::new("/login")).is_proceed());
    assert_eq!(
        f.client.navigate(&Route::new("/users"), &Route::new("/homeims")),
        Decision::RedirectTo(Redirect::to("/homeims"))
    );
}

// =========================================================================
// Monitor-driven logout
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_idle_user_is_logged_out_and_hook_runs() {
    let mut f = fixture();
    f.client.login(UserRecord::new(9, "lena", Role::Staff)).unwrap();

    tokio::time::sleep(31 * MINUTE + Duration::from_secs(1)).await;

    assert_eq!(f.ended.load(Ordering::SeqCst), 1);
    assert!(f.client.current_user().is_none(), "store must be cleared");
    assert!(!f.client.is_monitoring());
    assert_eq!(f.client.last_check(), Some(CheckOutcome::Idle));
}

#[tokio::test(start_paused = true)]
async fn test_active_user_stays_logged_in() {
    let mut f = fixture();
    f.client.login(UserRecord::new(9, "lena", Role::Staff)).unwrap();

    for _ in 0..8 {
        tokio::time::sleep(5 * MINUTE).await;
        f.client.interactions().dispatch(InteractionKind::Click);
    }
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(f.ended.load(Ordering::SeqCst), 0);
    assert!(f.client.current_user().is_some());
    assert!(f.client.is_monitoring());
}

#[tokio::test(start_paused = true)]
async fn test_expiry_ceiling_logs_out_active_user() {
    let mut f = fixture();
    f.client.login(UserRecord::new(9, "lena", Role::Staff)).unwrap();

    // Stored expiry only moves on a check; jump the wall clock past it
    // before the first one.
    f.clock.advance(TimeDelta::hours(8) + TimeDelta::seconds(1));
    f.client.record_activity();
    tokio::time::sleep(MINUTE + Duration::from_secs(1)).await;

    assert_eq!(f.client.last_check(), Some(CheckOutcome::Expired));
    assert_eq!(f.ended.load(Ordering::SeqCst), 1);
    assert!(f.client.current_user().is_none());
}

// =========================================================================
// Resume
// =========================================================================

#[tokio::test(start_paused = true)]
async fn test_resume_live_session_starts_monitor() {
    let storage = MemoryStorage::new();
    let mut first = fixture_on(storage.clone());
    first.client.login(UserRecord::new(7, "ana", Role::Admin)).unwrap();
    drop(first);

    let mut second = fixture_on(storage);
    let resumed = second.client.resume().unwrap().expect("session survives restart");
    assert_eq!(resumed.username, "ana");
    assert!(second.client.is_monitoring());
}

#[tokio::test(start_paused = true)]
async fn test_resume_expired_session_clears_it() {
    let mut f = fixture();
    f.store.save(UserRecord::new(7, "ana", Role::Admin)).unwrap();
    f.clock.advance(TimeDelta::hours(9));

    assert_eq!(f.client.resume().unwrap(), None);
    assert!(f.store.load().unwrap().is_none());
    assert!(!f.client.is_monitoring());
}

#[tokio::test(start_paused = true)]
async fn test_resume_with_nothing_stored() {
    let mut f = fixture();
    assert_eq!(f.client.resume().unwrap(), None);
    assert!(!f.client.is_monitoring());
}

// =========================================================================
// Configuration
// =========================================================================

#[test]
fn test_config_file_drives_guard_paths() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beata.toml");
    std::fs::write(&path, "[guard]\nlogin_path = \"/signin\"\n").unwrap();

    let config = BeataConfig::from_file(&path).unwrap();
    let client = SessionClient::builder(config).build(MemoryStorage::new(), CountingProbe::default());

    assert_eq!(
        client.navigate(&Route::new("/users"), &Route::new("/")),
        Decision::RedirectTo(Redirect::to("/signin").with_query("redirect", "/users"))
    );
}

#[test]
fn test_broken_config_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("beata.toml");
    std::fs::write(&path, "[monitor\n").unwrap();

    let err = BeataConfig::from_file(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}

#[test]
fn test_build_http_uses_probe_config() {
    let mut config = BeataConfig::default();
    config.probe.base_url = "http://127.0.0.1:9/".to_string();
    let client = SessionClient::<HttpProbe>::builder(config).build_http(MemoryStorage::new());
    assert!(client.is_ok());
}
