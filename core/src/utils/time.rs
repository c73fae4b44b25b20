use chrono::{DateTime, Utc};
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds between 1601-01-01 and 1970-01-01
const EPOCH_DIFFERENCE: u64 = 11644473600;
const TICKS_PER_SECOND: u64 = 10000000;

/// Convert a Windows FILETIME (100ns ticks since 1601) to UTC. A zero value was never populated and returns `None`
pub(crate) fn filetime_to_datetime(filetime: u64) -> Option<DateTime<Utc>> {
    if filetime == 0 {
        return None;
    }

    let seconds = (filetime / TICKS_PER_SECOND) as i64 - EPOCH_DIFFERENCE as i64;
    let nanos = ((filetime % TICKS_PER_SECOND) * 100) as u32;
    DateTime::from_timestamp(seconds, nanos)
}

/// Convert `SystemTime` to UTC. Times before `UNIX_EPOCH` are supported
pub(crate) fn system_time_to_datetime(time: SystemTime) -> Option<DateTime<Utc>> {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => DateTime::from_timestamp(duration.as_secs() as i64, duration.subsec_nanos()),
        Err(err) => {
            let before = err.duration();
            let mut seconds = -(before.as_secs() as i64);
            let mut nanos = before.subsec_nanos();
            if nanos != 0 {
                seconds -= 1;
                nanos = 1_000_000_000 - nanos;
            }
            DateTime::from_timestamp(seconds, nanos)
        }
    }
}

/// Format time as `%Y-%m-%d %H:%M:%S`
pub(crate) fn format_datetime(time: &DateTime<Utc>) -> String {
    time.format("%Y-%m-%d %H:%M:%S").to_string()
}
