use std::collections::HashMap;

use thiserror::Error;

use crate::models::{CalendarType, EventDraft};

#[derive(Debug, Error, PartialEq)]
pub enum ImportError {
    #[error("CSV is empty")]
    Empty,
    #[error("No valid rows found")]
    NoValidRows,
}

/// Splits one line on commas outside double quotes. `""` inside quotes is a literal quote.
pub fn parse_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

/// Records keyed by lowercased header names. Blank lines and a leading BOM are skipped.
pub fn parse_csv(text: &str) -> Vec<HashMap<String, String>> {
    let text = text.trim_start_matches('\u{feff}');
    let mut lines = text.trim().lines().filter(|l| !l.trim().is_empty());
    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = parse_csv_line(header_line)
        .into_iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    lines
        .map(|line| {
            let values = parse_csv_line(line);
            headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let raw = values.get(i).map(|v| v.trim()).unwrap_or_default();
                    (header.clone(), raw.to_string())
                })
                .collect()
        })
        .collect()
}

/// `M/D/YYYY` or `M-D-YYYY` into `YYYY-MM-DD`; empty when it doesn't split into three parts.
pub fn normalize_date(input: &str) -> String {
    let parts: Vec<&str> = input.split(['/', '-']).map(str::trim).collect();
    let [month, day, year] = parts.as_slice() else {
        return String::new();
    };
    if month.is_empty() || day.is_empty() || year.is_empty() {
        return String::new();
    }
    format!("{year:0>4}-{month:0>2}-{day:0>2}")
}

fn non_empty(record: &HashMap<String, String>, key: &str) -> Option<String> {
    record.get(key).filter(|v| !v.is_empty()).cloned()
}

/// Converts a spreadsheet export into event drafts, dropping rows without title or date.
pub fn events_from_csv(text: &str) -> Result<Vec<EventDraft>, ImportError> {
    let records = parse_csv(text);
    if records.is_empty() {
        return Err(ImportError::Empty);
    }

    let events: Vec<EventDraft> = records
        .iter()
        .map(|r| {
            let kind = non_empty(r, "type of event")
                .or_else(|| non_empty(r, "type"))
                .or_else(|| non_empty(r, "calendar"))
                .unwrap_or_default();
            EventDraft {
                title: r.get("title").cloned().unwrap_or_default(),
                date: normalize_date(r.get("date").map(String::as_str).unwrap_or_default()),
                calendar: CalendarType::from_loose(&kind),
                location: non_empty(r, "location"),
                description: non_empty(r, "description"),
                published: true,
            }
        })
        .filter(|e| !e.title.is_empty() && !e.date.is_empty())
        .collect();

    if events.is_empty() {
        return Err(ImportError::NoValidRows);
    }
    Ok(events)
}
