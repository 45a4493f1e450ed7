//! Fact source backed by the `osqueryi` shell.

mod queries;
mod shell_source;

pub use queries::{AGENT_INFO, INSTALLED_APPS, InventoryQuery, OS_VERSION};
pub use shell_source::OsqueryShellSource;
