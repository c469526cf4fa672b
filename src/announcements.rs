use chrono::NaiveDate;

use crate::models::{Announcement, EventItem};

/// Static notices first, then the next `limit` events dated on or after `today`.
/// Events with unparseable dates are skipped.
pub fn build_announcements(
    static_notices: &[String],
    events: &[EventItem],
    today: NaiveDate,
    limit: usize,
) -> Vec<Announcement> {
    let mut upcoming: Vec<(NaiveDate, &EventItem)> = events
        .iter()
        .filter_map(|e| {
            NaiveDate::parse_from_str(&e.date, "%Y-%m-%d")
                .ok()
                .map(|d| (d, e))
        })
        .filter(|(d, _)| *d >= today)
        .collect();
    upcoming.sort_by_key(|(d, _)| *d);

    static_notices
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .enumerate()
        .map(|(i, text)| Announcement {
            id: format!("notice-{}", i + 1),
            text: text.to_string(),
        })
        .chain(upcoming.into_iter().take(limit).map(|(date, e)| Announcement {
            id: format!("event-{}", e.id),
            text: format!("{} · {}", e.title, date.format("%b %-d")),
        }))
        .collect()
}
