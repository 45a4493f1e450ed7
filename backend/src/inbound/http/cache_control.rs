//! Cache-control policies for inventory responses.

/// Inventory data changes on every poll; clients must revalidate.
pub const NO_CACHE: &str = "no-cache";

/// Seconds clients should wait before retrying while initialising.
pub const INITIALIZING_RETRY_AFTER_SECS: u32 = 5;

/// Header tuple for current inventory responses.
pub const fn no_cache_header() -> (&'static str, &'static str) {
    ("Cache-Control", NO_CACHE)
}

/// Header tuple for the initialising response; matches the retry hint.
pub const fn initializing_cache_header() -> (&'static str, &'static str) {
    ("Cache-Control", "max-age=5")
}
