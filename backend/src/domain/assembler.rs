//! Snapshot assembly from raw fact rows.
//!
//! Converts the string-keyed rows of a [`RawFacts`] value into an
//! [`InventorySnapshot`]. Identity facts are mandatory; application rows are
//! optional and kept in source order.

use crate::domain::inventory::{HostIdentity, InstalledApp, InventorySnapshot};
use crate::domain::ports::{FactRow, RawFacts};

/// Which identity query returned no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityQuery {
    OsVersion,
    AgentInfo,
}

impl IdentityQuery {
    const fn table(self) -> &'static str {
        match self {
            Self::OsVersion => "os_version",
            Self::AgentInfo => "osquery_info",
        }
    }
}

impl std::fmt::Display for IdentityQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.table())
    }
}

/// Errors raised while assembling a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssembleError {
    /// An identity query returned no rows; the cycle must not reconcile.
    #[error("missing identity facts: `{query}` returned no rows")]
    MissingIdentityFacts { query: IdentityQuery },
}

/// Build a snapshot from raw rows.
///
/// The first row of each identity query is used. Missing columns read as
/// empty strings. An unparsable or non-finite `last_opened_time` becomes
/// `0.0` without rejecting the row.
///
/// # Errors
///
/// Returns [`AssembleError::MissingIdentityFacts`] when either identity query
/// produced no rows.
///
/// # Examples
/// ```
/// use hostwatch::domain::assembler::assemble;
/// use hostwatch::domain::ports::{FactRow, RawFacts};
///
/// let row = |pairs: &[(&str, &str)]| -> FactRow {
///     pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
/// };
/// let facts = RawFacts {
///     os_version: vec![row(&[("name", "macOS"), ("version", "14.5"), ("platform", "darwin")])],
///     agent_info: vec![row(&[("version", "5.12.1")])],
///     apps: vec![row(&[("name", "Notes"), ("last_opened_time", "not-a-number")])],
/// };
/// let snapshot = assemble(&facts).expect("identity present");
/// assert_eq!(snapshot.identity.agent_version, "5.12.1");
/// assert_eq!(snapshot.apps[0].last_opened_time, 0.0);
/// ```
pub fn assemble(raw: &RawFacts) -> Result<InventorySnapshot, AssembleError> {
    let os = first_row(&raw.os_version, IdentityQuery::OsVersion)?;
    let agent = first_row(&raw.agent_info, IdentityQuery::AgentInfo)?;

    let identity = HostIdentity {
        os_name: column(os, "name"),
        os_version: column(os, "version"),
        os_platform: column(os, "platform"),
        agent_version: column(agent, "version"),
    };
    let apps = raw.apps.iter().map(app_from_row).collect();

    Ok(InventorySnapshot { identity, apps })
}

fn first_row(rows: &[FactRow], query: IdentityQuery) -> Result<&FactRow, AssembleError> {
    rows.first()
        .ok_or(AssembleError::MissingIdentityFacts { query })
}

fn column(row: &FactRow, key: &str) -> String {
    row.get(key).cloned().unwrap_or_default()
}

fn app_from_row(row: &FactRow) -> InstalledApp {
    InstalledApp {
        name: column(row, "name"),
        path: column(row, "path"),
        bundle_identifier: column(row, "bundle_identifier"),
        bundle_name: column(row, "bundle_name"),
        bundle_short_version: column(row, "bundle_short_version"),
        display_name: column(row, "display_name"),
        minimum_system_version: column(row, "minimum_system_version"),
        last_opened_time: parse_seconds(row.get("last_opened_time").map(String::as_str)),
    }
}

fn parse_seconds(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|seconds| seconds.is_finite())
        .unwrap_or(0.0)
}
