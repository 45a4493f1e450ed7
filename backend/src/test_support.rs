//! Test utilities for the hostwatch crate.
//!
//! Shared by unit tests in `src/` and integration tests in `tests/`. Compiled
//! for `cfg(test)` and behind the `test-support` feature.

pub mod clock {
    //! Clock that only moves when a test says so.

    use std::sync::{Mutex, MutexGuard, PoisonError};

    use chrono::{DateTime, Local, TimeDelta, Utc};
    use mockable::Clock;

    /// Manually advanced [`Clock`].
    pub struct MutableClock {
        now: Mutex<DateTime<Utc>>,
    }

    impl MutableClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                now: Mutex::new(start),
            }
        }

        pub fn advance_seconds(&self, seconds: i64) {
            *self.now() += TimeDelta::seconds(seconds);
        }

        fn now(&self) -> MutexGuard<'_, DateTime<Utc>> {
            self.now.lock().unwrap_or_else(PoisonError::into_inner)
        }
    }

    impl Clock for MutableClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.now()
        }
    }
}

pub mod inventory {
    //! Snapshot builders shared by reconciliation tests.

    use chrono::{DateTime, TimeZone, Utc};

    use crate::domain::inventory::{HostIdentity, InstalledApp, InventorySnapshot};

    /// Fixed instant used as the starting point of test clocks.
    pub fn epoch() -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single() {
            Some(instant) => instant,
            None => panic!("fixture timestamp is unambiguous"),
        }
    }

    /// macOS identity with the given OS version and agent 5.1.
    pub fn identity(os_version: &str) -> HostIdentity {
        HostIdentity {
            os_name: "macOS".to_owned(),
            os_version: os_version.to_owned(),
            os_platform: "mac".to_owned(),
            agent_version: "5.1".to_owned(),
        }
    }

    /// Application under `/Applications` with predictable attributes.
    pub fn app(name: &str) -> InstalledApp {
        InstalledApp {
            name: name.to_owned(),
            path: format!("/Applications/{name}.app"),
            bundle_identifier: format!("com.example.{}", name.to_lowercase()),
            bundle_name: name.to_owned(),
            bundle_short_version: "1.0".to_owned(),
            display_name: name.to_owned(),
            minimum_system_version: "12.0".to_owned(),
            last_opened_time: 1_700_000_000.0,
        }
    }

    /// Snapshot with the given OS version and applications.
    pub fn snapshot(os_version: &str, names: &[&str]) -> InventorySnapshot {
        InventorySnapshot {
            identity: identity(os_version),
            apps: names.iter().map(|name| app(name)).collect(),
        }
    }
}
