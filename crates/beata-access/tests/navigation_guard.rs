//! Integration tests for the navigation guard against the IMS route table.

use chrono::{DateTime, TimeDelta, Utc};

use beata_access::{Decision, GuardConfig, NavigationGuard, Redirect, Route, RouteTable};
use beata_session::{
    ManualClock, MemoryStorage, Role, SessionConfig, SessionStore, Storage, StorageError,
    UserRecord,
};

// =========================================================================
// Helpers
// =========================================================================

fn clock() -> ManualClock {
    ManualClock::new(DateTime::<Utc>::from_timestamp(1_750_000_000, 0).unwrap())
}

fn setup() -> (NavigationGuard, SessionStore, MemoryStorage) {
    let storage = MemoryStorage::new();
    let store = SessionStore::with_clock(storage.clone(), clock(), SessionConfig::default());
    let guard = NavigationGuard::new(store.clone(), RouteTable::ims(), GuardConfig::default());
    (guard, store, storage)
}

fn nav(guard: &NavigationGuard, to: &str) -> Decision {
    guard.guard(&Route::new(to), &Route::new("/"))
}

struct FailingStorage;

impl Storage for FailingStorage {
    fn get(&self, _: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }
    fn set(&self, _: &str, _: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }
    fn remove(&self, _: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("quota exceeded".into()))
    }
}

// =========================================================================
// Scenarios
// =========================================================================

#[test]
fn test_anonymous_user_is_sent_to_login_for_every_private_route() {
    let (guard, _, _) = setup();
    for path in ["/dashboard", "/homeims", "/profile", "/vieworderdetails/3", "/unknown"] {
        assert_eq!(
            nav(&guard, path),
            Decision::RedirectTo(Redirect::to("/login").with_query("redirect", path)),
            "{path}"
        );
    }
}

#[test]
fn test_staff_session_walkthrough() {
    let (guard, store, _) = setup();
    store.save(UserRecord::new(8, "barista", Role::Staff)).unwrap();

    assert!(nav(&guard, "/homeims").is_proceed());
    assert!(nav(&guard, "/reportsims/dailySales").is_proceed());
    assert_eq!(
        nav(&guard, "/users"),
        Decision::RedirectTo(Redirect::to("/homeims"))
    );
    assert_eq!(
        nav(&guard, "/dashboard"),
        Decision::RedirectTo(Redirect::to("/homeims"))
    );
}

#[test]
fn test_legacy_cafe_staff_role_is_staff() {
    let (guard, _, storage) = setup();
    let expiry = DateTime::<Utc>::from_timestamp(1_750_000_000, 0).unwrap() + TimeDelta::hours(1);
    let raw = serde_json::json!({
        "user_id": 8,
        "username": "barista",
        "role": "cafe_staff",
        "expiry": expiry.timestamp_millis(),
    });
    storage.set("user", &raw.to_string()).unwrap();

    assert!(nav(&guard, "/stocks").is_proceed());
    assert_eq!(nav(&guard, "/users"), Decision::RedirectTo(Redirect::to("/homeims")));
}

#[test]
fn test_unknown_role_record_is_treated_as_logged_out() {
    let (guard, _, storage) = setup();
    let raw = serde_json::json!({
        "user_id": 8,
        "username": "intruder",
        "role": "superuser",
        "expiry": i64::MAX / 1_000_000,
    });
    storage.set("user", &raw.to_string()).unwrap();

    assert_eq!(
        nav(&guard, "/users"),
        Decision::RedirectTo(Redirect::to("/login").with_query("redirect", "/users"))
    );
}

#[test]
fn test_guard_never_mutates_session() {
    let (guard, store, storage) = setup();
    store.save(UserRecord::new(1, "ana", Role::Admin)).unwrap();
    let before = storage.get("user").unwrap();

    for path in ["/", "/users", "/homeims", "/nowhere"] {
        let _ = nav(&guard, path);
    }
    assert_eq!(storage.get("user").unwrap(), before);
}

#[test]
fn test_storage_failure_fails_closed() {
    let store = SessionStore::new(FailingStorage, SessionConfig::default());
    let guard = NavigationGuard::new(store, RouteTable::ims(), GuardConfig::default());

    assert!(nav(&guard, "/login").is_proceed());
    assert_eq!(
        nav(&guard, "/homeims"),
        Decision::RedirectTo(Redirect::to("/login").with_query("redirect", "/homeims"))
    );
}

#[test]
fn test_custom_table_and_homes() {
    let storage = MemoryStorage::new();
    let store = SessionStore::new(storage, SessionConfig::default());
    let table = RouteTable::builder()
        .public("/cafe-beata")
        .public("/login")
        .public("/create-account")
        .admin_only("/admin")
        .admin_only("/notifications")
        .restricted("/order-history")
        .build();
    let config = GuardConfig {
        login_path: "/login".into(),
        admin_home: "/admin".into(),
        staff_home: "/cafe-beata".into(),
    };
    let guard = NavigationGuard::new(store.clone(), table, config);

    assert!(nav(&guard, "/cafe-beata").is_proceed());

    store.save(UserRecord::new(3, "cashier", Role::Staff)).unwrap();
    assert_eq!(
        nav(&guard, "/notifications"),
        Decision::RedirectTo(Redirect::to("/cafe-beata"))
    );
    assert!(nav(&guard, "/order-history").is_proceed());
}
