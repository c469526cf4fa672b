use crate::models::{CalendarType, EventItem};

/// Events whose calendar is selected and whose title contains `query`, ignoring case.
/// Input order is preserved. A missing or empty query matches every title.
pub fn filter_events(
    events: &[EventItem],
    selected: &[CalendarType],
    query: Option<&str>,
) -> Vec<EventItem> {
    let needle = query.unwrap_or_default().to_lowercase();
    events
        .iter()
        .filter(|e| selected.contains(&e.calendar) && e.title.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

/// Flips `calendar` in the selection, appending it when absent.
pub fn toggle_calendar(selected: &mut Vec<CalendarType>, calendar: CalendarType) {
    if let Some(pos) = selected.iter().position(|c| *c == calendar) {
        selected.remove(pos);
    } else {
        selected.push(calendar);
    }
}

/// Parses a comma separated calendar list. Blank input means every calendar.
pub fn parse_calendars(raw: Option<&str>) -> Result<Vec<CalendarType>, String> {
    let Some(raw) = raw.filter(|r| !r.trim().is_empty()) else {
        return Ok(CalendarType::ALL.to_vec());
    };
    let mut calendars = Vec::new();
    for part in raw.split(',').filter(|p| !p.trim().is_empty()) {
        let calendar: CalendarType = part.parse().map_err(|e| format!("{e}"))?;
        if !calendars.contains(&calendar) {
            calendars.push(calendar);
        }
    }
    Ok(calendars)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Vec<EventItem> {
        let make = |id: &str, title: &str, date: &str, calendar, location: &str| EventItem {
            id: id.to_string(),
            title: title.to_string(),
            date: date.to_string(),
            calendar,
            location: Some(location.to_string()),
            description: None,
        };
        vec![
            make("1", "Booster Meeting", "2025-08-20", CalendarType::General, "GHS Auditorium"),
            make("2", "Band Rehearsal", "2025-08-22", CalendarType::Band, "Band Room"),
            make("3", "Drama Club Read-Through", "2025-08-25", CalendarType::Drama, "Black Box"),
            make(
                "4",
                "Car Wash Fundraiser",
                "2025-08-30",
                CalendarType::Fundraising,
                "School Parking Lot",
            ),
        ]
    }

    #[test]
    fn test_band_query() {
        let result = filter_events(&seeded(), &[CalendarType::Band], Some("band"));
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].title, "Band Rehearsal");
    }

    #[test]
    fn test_empty_query_matches_missing_query() {
        let events = seeded();
        let cats = [CalendarType::Drama, CalendarType::General];
        let with_empty = filter_events(&events, &cats, Some(""));
        let without = filter_events(&events, &cats, None);
        assert_eq!(with_empty, without);
        let ids: Vec<&str> = without.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "3"]);
    }

    #[test]
    fn test_case_insensitive_and_stable() {
        let result = filter_events(&seeded(), &CalendarType::ALL, Some("R"));
        let ids: Vec<&str> = result.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_nothing_selected() {
        assert!(filter_events(&seeded(), &[], None).is_empty());
    }

    #[test]
    fn test_toggle_calendar() {
        let mut selected = CalendarType::ALL.to_vec();
        toggle_calendar(&mut selected, CalendarType::Drama);
        assert!(!selected.contains(&CalendarType::Drama));
        toggle_calendar(&mut selected, CalendarType::Drama);
        assert_eq!(selected.last(), Some(&CalendarType::Drama));
    }

    #[test]
    fn test_parse_calendars() {
        assert_eq!(parse_calendars(None).unwrap(), CalendarType::ALL.to_vec());
        assert_eq!(parse_calendars(Some(" ")).unwrap(), CalendarType::ALL.to_vec());
        assert_eq!(
            parse_calendars(Some("band,Drama,band")).unwrap(),
            vec![CalendarType::Band, CalendarType::Drama]
        );
        assert!(parse_calendars(Some("band,choir")).is_err());
    }
}
