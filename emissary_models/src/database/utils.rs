use chrono::{DateTime, TimeZone, Utc};

/// Converts pagination cursor (Unix timestamp in milliseconds)
/// into a date. Out-of-range values are clamped.
pub fn cursor_to_datetime(cursor: i64) -> DateTime<Utc> {
    match Utc.timestamp_millis_opt(cursor).single() {
        Some(datetime) => datetime,
        None if cursor > 0 => DateTime::<Utc>::MAX_UTC,
        None => DateTime::<Utc>::MIN_UTC,
    }
}

pub fn datetime_to_cursor(datetime: &DateTime<Utc>) -> i64 {
    datetime.timestamp_millis()
}

/// Selects one page of items ordered by creation date (newest first).
/// Only items created strictly before the cursor are included.
pub(crate) fn paginate<T: Clone>(
    items: impl Iterator<Item = T>,
    created_at: impl Fn(&T) -> i64,
    before: i64,
    limit: u16,
) -> Vec<T> {
    let mut page: Vec<T> = items
        .filter(|item| created_at(item) < before)
        .collect();
    // Stable sort keeps insertion order for equal timestamps
    page.sort_by_key(|item| std::cmp::Reverse(created_at(item)));
    page.truncate(limit.into());
    page
}
