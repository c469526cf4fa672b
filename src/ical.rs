use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::EventItem;

static NON_SLUG: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("regex compiles"));

/// Renders events as all-day RFC 5545 entries.
#[derive(Clone, Debug)]
pub struct IcsExporter {
    organization: String,
    uid_domain: String,
}

impl Default for IcsExporter {
    fn default() -> Self {
        Self::new("Girard Music & Drama Boosters", "girard-boosters")
    }
}

impl IcsExporter {
    pub fn new(organization: impl Into<String>, uid_domain: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
            uid_domain: uid_domain.into(),
        }
    }

    pub fn event_to_ics(&self, event: &EventItem, stamp: DateTime<Utc>) -> String {
        self.events_to_ics(std::slice::from_ref(event), stamp)
    }

    /// All events share the single `DTSTAMP` taken from `stamp`.
    pub fn events_to_ics(&self, events: &[EventItem], stamp: DateTime<Utc>) -> String {
        let dtstamp = format_stamp(stamp);
        let mut lines = vec![
            "BEGIN:VCALENDAR".to_string(),
            "VERSION:2.0".to_string(),
            format!("PRODID:-//{}//EN", self.organization),
            "CALSCALE:GREGORIAN".to_string(),
        ];

        for event in events {
            lines.push("BEGIN:VEVENT".to_string());
            lines.push(format!("UID:{}@{}", event.id, self.uid_domain));
            lines.push(format!("DTSTAMP:{dtstamp}"));
            lines.push(format!("DTSTART;VALUE=DATE:{}", format_date(&event.date)));
            lines.push(format!("SUMMARY:{}", escape_text(&event.title)));
            if let Some(location) = event.location.as_deref().filter(|l| !l.is_empty()) {
                lines.push(format!("LOCATION:{}", escape_text(location)));
            }
            if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
                lines.push(format!("DESCRIPTION:{}", escape_text(description)));
            }
            lines.push("END:VEVENT".to_string());
        }

        lines.push("END:VCALENDAR".to_string());
        lines.join("\r\n")
    }
}

/// `YYYY-MM-DD` to `YYYYMMDD`. Anything else passes through minus its hyphens.
pub fn format_date(date: &str) -> String {
    date.replace('-', "")
}

pub fn format_stamp(stamp: DateTime<Utc>) -> String {
    stamp.format("%Y%m%dT%H%M%SZ").to_string()
}

/// TEXT value escaping; backslash goes first so later escapes stay intact.
pub fn escape_text(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace(',', "\\,")
        .replace(';', "\\;")
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .replace('\n', "\\n")
}

pub fn slugify(title: &str) -> String {
    let lowered = title.to_lowercase();
    NON_SLUG
        .replace_all(&lowered, "-")
        .trim_matches('-')
        .to_string()
}

/// Download name for a single event export.
pub fn ics_filename(title: &str) -> String {
    let slug = slugify(title);
    if slug.is_empty() {
        "event.ics".to_string()
    } else {
        format!("{slug}.ics")
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::models::CalendarType;

    fn meeting() -> EventItem {
        EventItem {
            id: "1".to_string(),
            title: "Booster Meeting".to_string(),
            date: "2025-08-20".to_string(),
            calendar: CalendarType::General,
            location: Some("GHS Auditorium".to_string()),
            description: None,
        }
    }

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 8, 1, 12, 30, 5).unwrap()
    }

    #[test]
    fn test_single_event() {
        let body = IcsExporter::default().event_to_ics(&meeting(), stamp());
        let lines: Vec<&str> = body.split("\r\n").collect();
        assert_eq!(
            lines,
            vec![
                "BEGIN:VCALENDAR",
                "VERSION:2.0",
                "PRODID:-//Girard Music & Drama Boosters//EN",
                "CALSCALE:GREGORIAN",
                "BEGIN:VEVENT",
                "UID:1@girard-boosters",
                "DTSTAMP:20250801T123005Z",
                "DTSTART;VALUE=DATE:20250820",
                "SUMMARY:Booster Meeting",
                "LOCATION:GHS Auditorium",
                "END:VEVENT",
                "END:VCALENDAR",
            ]
        );
        assert!(!body.ends_with("\r\n"));
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a,b;c\\d\ne"), "a\\,b\\;c\\\\d\\ne");
        assert_eq!(escape_text("plain"), "plain");
    }

    #[test]
    fn test_escaped_title_keeps_structure() {
        let mut event = meeting();
        event.title = "Pizza, Pop; Songs\\Skits\nNight".to_string();
        event.description = Some("Line one\nLine two".to_string());
        let body = IcsExporter::default().event_to_ics(&event, stamp());

        assert!(body.contains("SUMMARY:Pizza\\, Pop\\; Songs\\\\Skits\\nNight"));
        assert!(body.contains("DESCRIPTION:Line one\\nLine two"));
        assert!(!body.replace("\r\n", "").contains('\n'));
        assert_eq!(body.matches("BEGIN:VEVENT").count(), 1);
        assert_eq!(body.matches("END:VEVENT").count(), 1);
    }

    #[test]
    fn test_carriage_returns_become_escaped_newlines() {
        assert_eq!(escape_text("a\r\nb\rc"), "a\\nb\\nc");

        let mut event = meeting();
        event.description = Some("Bring a coat\r\nDoors at 6".to_string());
        let body = IcsExporter::default().event_to_ics(&event, stamp());
        assert!(body.contains("DESCRIPTION:Bring a coat\\nDoors at 6\r\n"));
        assert!(!body.replace("\r\n", "").contains('\r'));
    }

    #[test]
    fn test_empty_optionals_omitted() {
        let mut event = meeting();
        event.location = Some(String::new());
        let body = IcsExporter::default().event_to_ics(&event, stamp());
        assert!(!body.contains("LOCATION"));
        assert!(!body.contains("DESCRIPTION"));
    }

    #[test]
    fn test_malformed_date_passes_through() {
        let mut event = meeting();
        event.date = "08/20/2025".to_string();
        let body = IcsExporter::default().event_to_ics(&event, stamp());
        assert!(body.contains("DTSTART;VALUE=DATE:08/20/2025"));
    }

    #[test]
    fn test_multiple_events_share_stamp() {
        let mut second = meeting();
        second.id = "2".to_string();
        second.title = "Band Rehearsal".to_string();
        second.date = "2025-08-22".to_string();
        let body = IcsExporter::default().events_to_ics(&[meeting(), second], stamp());

        assert_eq!(body.matches("BEGIN:VCALENDAR").count(), 1);
        assert_eq!(body.matches("BEGIN:VEVENT").count(), 2);
        assert_eq!(body.matches("DTSTAMP:20250801T123005Z").count(), 2);
        assert!(body.contains("UID:2@girard-boosters"));
        assert!(body.contains("DTSTART;VALUE=DATE:20250822"));
    }

    #[test]
    fn test_empty_list_is_bare_calendar() {
        let body = IcsExporter::new("Test Org", "test").events_to_ics(&[], stamp());
        assert_eq!(
            body,
            "BEGIN:VCALENDAR\r\nVERSION:2.0\r\nPRODID:-//Test Org//EN\r\nCALSCALE:GREGORIAN\r\nEND:VCALENDAR"
        );
    }

    #[test]
    fn test_output_parses_as_calendar() {
        let body = IcsExporter::default().events_to_ics(&[meeting(), meeting()], stamp());
        let parsed: icalendar::Calendar = body.parse().unwrap();
        let events = parsed
            .components
            .iter()
            .filter(|c| c.as_event().is_some())
            .count();
        assert_eq!(events, 2);
    }

    #[test]
    fn test_ics_filename() {
        assert_eq!(ics_filename("Booster Meeting"), "booster-meeting.ics");
        assert_eq!(ics_filename("  Car Wash (Fundraiser)! "), "car-wash-fundraiser.ics");
        assert_eq!(ics_filename("!!!"), "event.ics");
    }
}
