//! Change detection between an active set and a fresh observation.

use std::collections::{HashMap, HashSet};

use super::InstalledApp;

/// Identity key of an installed application.
///
/// Two applications with equal keys are the same application even when their
/// other attributes differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AppKey<'a> {
    pub name: &'a str,
    pub path: &'a str,
    pub bundle_identifier: &'a str,
}

/// Decide whether `observed` differs from the stored `active` set.
///
/// The sets differ when their sizes differ, when an active key is missing
/// from the observation, or when a shared key disagrees on bundle name,
/// bundle short version, display name or minimum system version. The
/// last-opened timestamp is never compared.
///
/// # Examples
/// ```
/// use hostwatch::domain::inventory::{InstalledApp, inventory_changed};
///
/// let active = vec![InstalledApp { name: "Notes".into(), last_opened_time: 1.0, ..Default::default() }];
/// let observed = vec![InstalledApp { name: "Notes".into(), last_opened_time: 9.0, ..Default::default() }];
/// assert!(!inventory_changed(&active, &observed));
/// ```
#[must_use]
pub fn inventory_changed(active: &[InstalledApp], observed: &[InstalledApp]) -> bool {
    if active.len() != observed.len() {
        return true;
    }

    let observed_by_key: HashMap<AppKey<'_>, &InstalledApp> =
        observed.iter().map(|app| (app.key(), app)).collect();

    active.iter().any(|stored| {
        observed_by_key
            .get(&stored.key())
            .is_none_or(|seen| attributes_differ(stored, seen))
    })
}

fn attributes_differ(stored: &InstalledApp, seen: &InstalledApp) -> bool {
    stored.bundle_name != seen.bundle_name
        || stored.bundle_short_version != seen.bundle_short_version
        || stored.display_name != seen.display_name
        || stored.minimum_system_version != seen.minimum_system_version
}

/// Drop repeated identity keys, keeping the first occurrence.
///
/// The relative order of retained applications is preserved.
#[must_use]
pub fn distinct_by_key(apps: &[InstalledApp]) -> Vec<InstalledApp> {
    let mut seen = HashSet::with_capacity(apps.len());
    apps.iter()
        .filter(|app| seen.insert(app.key()))
        .cloned()
        .collect()
}
