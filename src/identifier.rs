//! Identifiers for generated codes.
//!
//! The base form is `QR_<YYYYMMDD_HHMMSS>.png`. Second resolution can collide
//! when two codes are generated within the same second, so a taken name gets
//! a random suffix: `QR_<YYYYMMDD_HHMMSS>_<8 hex>.png`.

use chrono::{DateTime, TimeZone};
use uuid::Uuid;

use crate::error::Result;
use crate::history::HistoryStore;

const PREFIX: &str = "QR_";
const EXTENSION: &str = ".png";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Timestamp-derived identifier without any collision suffix.
pub fn timestamp_identifier<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!("{PREFIX}{}{EXTENSION}", now.format(TIMESTAMP_FORMAT))
}

/// Pick an identifier for a code generated at `now` that is not used by any
/// record or image file in `store`.
///
/// # Errors
///
/// Propagates errors from [`HistoryStore::is_taken`].
pub fn allocate<Tz: TimeZone>(store: &dyn HistoryStore, now: &DateTime<Tz>) -> Result<String>
where
    Tz::Offset: std::fmt::Display,
{
    let base = timestamp_identifier(now);
    if !store.is_taken(&base)? {
        return Ok(base);
    }

    let stamp = now.format(TIMESTAMP_FORMAT).to_string();
    loop {
        let suffix = Uuid::new_v4().simple().to_string();
        let candidate = format!("{PREFIX}{stamp}_{}{EXTENSION}", &suffix[..8]);
        if !store.is_taken(&candidate)? {
            tracing::debug!(base = %base, candidate = %candidate, "identifier collision resolved");
            return Ok(candidate);
        }
    }
}
