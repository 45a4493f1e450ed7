//! SQL sent to `osqueryi` for each inventory collection.

/// One named inventory query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InventoryQuery {
    /// Short label used in logs and errors.
    pub name: &'static str,
    pub sql: &'static str,
}

pub const OS_VERSION: InventoryQuery = InventoryQuery {
    name: "os_version",
    sql: "SELECT name, version, platform FROM os_version LIMIT 1;",
};

pub const AGENT_INFO: InventoryQuery = InventoryQuery {
    name: "osquery_info",
    sql: "SELECT version FROM osquery_info LIMIT 1;",
};

/// Bundled applications under `/Applications`, most recently opened first.
pub const INSTALLED_APPS: InventoryQuery = InventoryQuery {
    name: "apps",
    sql: "SELECT name, path, bundle_identifier, bundle_name, bundle_short_version, \
          display_name, minimum_system_version, last_opened_time \
          FROM apps \
          WHERE bundle_identifier IS NOT NULL AND path LIKE '/Applications/%' \
          ORDER BY last_opened_time DESC;",
};
