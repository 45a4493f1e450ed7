//! Host inventory service.
//!
//! Collects operating system and installed-application facts from a local
//! osquery agent, reconciles each observation into generation-versioned
//! storage, and serves the current inventory over HTTP.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
pub use settings::HostwatchSettings;
