//! Time utility functions

use chrono::{DateTime, Utc};

/// Wall-clock timestamp used for entries and audit records
pub type Timestamp = DateTime<Utc>;

/// Get the current wall-clock time
pub fn now() -> Timestamp {
    Utc::now()
}

/// Render a timestamp as `YYYY-MM-DD HH:MM:SS.ffffff UTC`
pub fn format(ts: &Timestamp) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.6f UTC").to_string()
}
