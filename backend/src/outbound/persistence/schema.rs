//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` or update by hand when a migration changes a table.

diesel::table! {
    /// Observed host identity generations.
    ///
    /// A row is created the first time an identity tuple is seen (or seen
    /// again after the host drifted to another tuple). The identity columns
    /// never change after insert.
    inventory_generations (id) {
        /// Primary key assigned by a `BIGSERIAL` sequence.
        id -> Int8,
        os_name -> Text,
        os_version -> Text,
        os_platform -> Text,
        /// Version of the fact-collection agent.
        agent_version -> Text,
        created_at -> Timestamptz,
        /// Bumped whenever the active membership set is replaced.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Installed application membership rows.
    ///
    /// Rows with a null `end_time` form a generation's active set. Archived
    /// rows are never updated again.
    installed_apps (id) {
        id -> Int8,
        /// Owning generation.
        generation_id -> Int8,
        name -> Text,
        path -> Text,
        bundle_identifier -> Text,
        bundle_name -> Text,
        bundle_short_version -> Text,
        display_name -> Text,
        minimum_system_version -> Text,
        /// Seconds since the Unix epoch; zero when unknown.
        last_opened_time -> Float8,
        created_at -> Timestamptz,
        /// Reconciliation time at which the row left the active set.
        end_time -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(installed_apps -> inventory_generations (generation_id));

diesel::allow_tables_to_appear_in_same_query!(inventory_generations, installed_apps);
