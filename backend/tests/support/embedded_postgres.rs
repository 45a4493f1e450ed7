//! Database lifecycle helpers for the embedded cluster.
//!
//! Database creation goes through the `postgres` client because
//! `DROP DATABASE` cannot run inside the transaction Diesel would open.

use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};

use super::format_postgres_error;

/// Drop and recreate `name`, then apply the bundled inventory schema.
///
/// Returns the URL of the fresh database.
pub fn reset_database(cluster: &TestCluster, name: &str) -> Result<String, String> {
    let admin_url = cluster.connection().database_url("postgres");
    let mut admin =
        Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    // Each statement runs on its own; neither may share a transaction block.
    for statement in [
        format!("DROP DATABASE IF EXISTS \"{name}\" WITH (FORCE)"),
        format!("CREATE DATABASE \"{name}\""),
    ] {
        admin
            .batch_execute(&statement)
            .map_err(|err| format_postgres_error(&err))?;
    }

    let url = cluster.connection().database_url(name);
    hostwatch::outbound::persistence::apply_schema_blocking(&url)
        .map_err(|err| err.to_string())?;
    Ok(url)
}

/// Run `sql` on a short-lived connection.
pub fn run_sql(url: &str, sql: &str) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(sql)
        .map_err(|err| format_postgres_error(&err))
}
