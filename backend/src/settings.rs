//! Service configuration loaded via OrthoConfig.
//!
//! Values come from `HOSTWATCH_*` environment variables, an optional
//! configuration file and command-line flags. Unset values fall back to the
//! defaults exposed by the accessors below.

use std::net::SocketAddr;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::PollerConfig;

const DEFAULT_BIND_HOST: &str = "0.0.0.0";
const DEFAULT_BIND_PORT: u16 = 7070;
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_POLL_INTERVAL_SECS: u64 = 300;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
const DEFAULT_OSQUERY_BINARY: &str = "osqueryi";

/// Settings controlling the listener, the store and the poller.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HOSTWATCH")]
pub struct HostwatchSettings {
    /// Address the HTTP listener binds to.
    pub bind_host: Option<String>,
    /// Port the HTTP listener binds to.
    pub bind_port: Option<u16>,
    /// PostgreSQL URL. When absent the in-memory store is used.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub database_max_connections: Option<u32>,
    /// Seconds between poll cycles.
    pub poll_interval_secs: Option<u64>,
    /// Seconds allowed for one fact collection.
    pub fetch_timeout_secs: Option<u64>,
    /// Path or name of the `osqueryi` executable.
    pub osquery_binary: Option<String>,
    /// Apply the bundled schema before building the pool.
    #[ortho_config(default = true)]
    pub apply_schema: bool,
}

impl HostwatchSettings {
    pub fn bind_host(&self) -> &str {
        self.bind_host.as_deref().unwrap_or(DEFAULT_BIND_HOST)
    }

    pub fn bind_port(&self) -> u16 {
        self.bind_port.unwrap_or(DEFAULT_BIND_PORT)
    }

    /// Socket address for the listener.
    ///
    /// # Errors
    ///
    /// Returns [`std::io::Error`] when the host is not an IP address.
    pub fn bind_addr(&self) -> std::io::Result<SocketAddr> {
        let ip = self.bind_host().parse().map_err(|err| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid bind host {}: {err}", self.bind_host()),
            )
        })?;
        Ok(SocketAddr::new(ip, self.bind_port()))
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn database_max_connections(&self) -> u32 {
        self.database_max_connections
            .unwrap_or(DEFAULT_MAX_CONNECTIONS)
            .max(1)
    }

    pub fn osquery_binary(&self) -> &str {
        self.osquery_binary
            .as_deref()
            .unwrap_or(DEFAULT_OSQUERY_BINARY)
    }

    /// Poller timing; zero values are raised to one second.
    pub fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            interval: Duration::from_secs(
                self.poll_interval_secs
                    .unwrap_or(DEFAULT_POLL_INTERVAL_SECS)
                    .max(1),
            ),
            fetch_timeout: Duration::from_secs(
                self.fetch_timeout_secs
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS)
                    .max(1),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for configuration parsing.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 8] = [
        "HOSTWATCH_BIND_HOST",
        "HOSTWATCH_BIND_PORT",
        "HOSTWATCH_DATABASE_URL",
        "HOSTWATCH_DATABASE_MAX_CONNECTIONS",
        "HOSTWATCH_POLL_INTERVAL_SECS",
        "HOSTWATCH_FETCH_TIMEOUT_SECS",
        "HOSTWATCH_OSQUERY_BINARY",
        "HOSTWATCH_APPLY_SCHEMA",
    ];

    fn load_with(overrides: &[(&str, &str)]) -> HostwatchSettings {
        let _guard = lock_env(VARS.map(|name| {
            let value = overrides
                .iter()
                .find(|(key, _)| *key == name)
                .map(|(_, value)| (*value).to_owned());
            (name, value)
        }));
        HostwatchSettings::load_from_iter([OsString::from("hostwatch")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let settings = load_with(&[]);

        assert_eq!(settings.bind_host(), "0.0.0.0");
        assert_eq!(settings.bind_port(), 7070);
        assert!(settings.database_url().is_none());
        assert_eq!(settings.database_max_connections(), 10);
        assert_eq!(settings.osquery_binary(), "osqueryi");
        assert!(settings.apply_schema);
        assert_eq!(settings.poller_config(), PollerConfig::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let settings = load_with(&[
            ("HOSTWATCH_BIND_HOST", "127.0.0.1"),
            ("HOSTWATCH_BIND_PORT", "8088"),
            ("HOSTWATCH_DATABASE_URL", "postgres://localhost/hostwatch"),
            ("HOSTWATCH_DATABASE_MAX_CONNECTIONS", "4"),
            ("HOSTWATCH_POLL_INTERVAL_SECS", "60"),
            ("HOSTWATCH_FETCH_TIMEOUT_SECS", "5"),
            ("HOSTWATCH_OSQUERY_BINARY", "/opt/osquery/bin/osqueryi"),
            ("HOSTWATCH_APPLY_SCHEMA", "false"),
        ]);

        assert_eq!(
            settings.bind_addr().expect("valid address"),
            "127.0.0.1:8088".parse().expect("socket address")
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://localhost/hostwatch")
        );
        assert_eq!(settings.database_max_connections(), 4);
        assert_eq!(settings.osquery_binary(), "/opt/osquery/bin/osqueryi");
        assert!(!settings.apply_schema);
        assert_eq!(
            settings.poller_config(),
            PollerConfig {
                interval: Duration::from_secs(60),
                fetch_timeout: Duration::from_secs(5),
            }
        );
    }

    #[rstest]
    fn zero_intervals_are_clamped() {
        let settings = load_with(&[
            ("HOSTWATCH_POLL_INTERVAL_SECS", "0"),
            ("HOSTWATCH_FETCH_TIMEOUT_SECS", "0"),
            ("HOSTWATCH_DATABASE_MAX_CONNECTIONS", "0"),
        ]);

        let config = settings.poller_config();
        assert_eq!(config.interval, Duration::from_secs(1));
        assert_eq!(config.fetch_timeout, Duration::from_secs(1));
        assert_eq!(settings.database_max_connections(), 1);
    }

    #[rstest]
    fn blank_database_url_means_memory_store() {
        let settings = load_with(&[("HOSTWATCH_DATABASE_URL", "  ")]);

        assert!(settings.database_url().is_none());
    }

    #[rstest]
    fn hostname_bind_host_is_rejected() {
        let settings = load_with(&[("HOSTWATCH_BIND_HOST", "localhost")]);

        let error = settings.bind_addr().expect_err("not an IP address");
        assert_eq!(error.kind(), std::io::ErrorKind::InvalidInput);
    }
}
