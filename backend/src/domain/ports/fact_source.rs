//! Port for collecting raw host facts from a local agent.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::define_port_error;

/// One result row keyed by column name.
pub type FactRow = BTreeMap<String, String>;

/// Rows returned by the three inventory queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawFacts {
    /// Rows with `name`, `version` and `platform` columns.
    pub os_version: Vec<FactRow>,
    /// Rows with a `version` column describing the agent.
    pub agent_info: Vec<FactRow>,
    /// Installed application rows, most recently opened first.
    pub apps: Vec<FactRow>,
}

define_port_error! {
    /// Errors raised by fact source adapters.
    pub enum FactSourceError {
        /// The agent could not be started or reached.
        Unavailable { message: String } =>
            "fact source unavailable: {message}",
        /// The agent ran the query but reported a failure.
        QueryFailed { query: String, message: String } =>
            "fact query `{query}` failed: {message}",
        /// The agent output could not be decoded.
        Decode { query: String, message: String } =>
            "fact query `{query}` returned undecodable output: {message}",
    }
}

/// Source of raw host facts.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FactSource: Send + Sync {
    /// Run every inventory query and return the raw rows.
    async fn collect(&self) -> Result<RawFacts, FactSourceError>;
}

/// Fact source returning a fixed set of rows.
///
/// Used by tests and local runs without an agent installed.
#[derive(Debug, Clone, Default)]
pub struct FixtureFactSource {
    facts: RawFacts,
}

impl FixtureFactSource {
    /// Serve `facts` on every call.
    #[must_use]
    pub const fn new(facts: RawFacts) -> Self {
        Self { facts }
    }
}

#[async_trait]
impl FactSource for FixtureFactSource {
    async fn collect(&self) -> Result<RawFacts, FactSourceError> {
        Ok(self.facts.clone())
    }
}
