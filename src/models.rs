use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Calendar an event belongs to. Serialized with its display name.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, ToSchema)]
pub enum CalendarType {
    Band,
    Drama,
    Fundraising,
    General,
}

impl CalendarType {
    pub const ALL: [CalendarType; 4] = [
        CalendarType::Band,
        CalendarType::Drama,
        CalendarType::Fundraising,
        CalendarType::General,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CalendarType::Band => "Band",
            CalendarType::Drama => "Drama",
            CalendarType::Fundraising => "Fundraising",
            CalendarType::General => "General",
        }
    }

    /// Lenient mapping used for spreadsheet imports; unknown values land in `General`.
    pub fn from_loose(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "band" => CalendarType::Band,
            "drama" => CalendarType::Drama,
            "fundraising" | "fundraiser" => CalendarType::Fundraising,
            _ => CalendarType::General,
        }
    }
}

impl fmt::Display for CalendarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCalendar(pub String);

impl fmt::Display for UnknownCalendar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown calendar '{}'", self.0)
    }
}

impl std::error::Error for UnknownCalendar {}

impl FromStr for CalendarType {
    type Err = UnknownCalendar;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CalendarType::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| UnknownCalendar(trimmed.to_string()))
    }
}

/// Event as shown on the public site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct EventItem {
    pub id: String,
    pub title: String,
    /// `YYYY-MM-DD`; not validated.
    #[schema(example = "2025-08-20")]
    pub date: String,
    pub calendar: CalendarType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Row of the `events` table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct EventRow {
    pub id: String,
    pub title: String,
    pub date: String,
    pub calendar: CalendarType,
    pub location: Option<String>,
    pub description: Option<String>,
    pub published: bool,
}

impl From<EventRow> for EventItem {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            date: row.date,
            calendar: row.calendar,
            location: row.location.filter(|l| !l.is_empty()),
            description: row.description.filter(|d| !d.is_empty()),
        }
    }
}

fn default_published() -> bool {
    true
}

/// Column values for inserting or saving an event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct EventDraft {
    pub title: String,
    pub date: String,
    #[serde(default = "default_calendar")]
    pub calendar: CalendarType,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_calendar() -> CalendarType {
    CalendarType::General
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PhotoRow {
    pub id: String,
    pub path: String,
    pub alt: Option<String>,
    pub order_index: i32,
    pub published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewPhoto {
    pub path: String,
    pub alt: Option<String>,
    pub order_index: i32,
    pub published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct PhotoUpdate {
    #[serde(default)]
    pub alt: Option<String>,
    pub order_index: i32,
    pub published: bool,
}

/// Photo row plus its public URL, for the admin list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AdminPhoto {
    pub id: String,
    pub path: String,
    pub alt: Option<String>,
    pub order_index: i32,
    pub published: bool,
    pub url: String,
}

/// Gallery image with its resolved public URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct GalleryImage {
    pub id: String,
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct DocumentRow {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
    pub order_index: i32,
    pub published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct DocumentDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub order_index: i32,
    #[serde(default = "default_published")]
    pub published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct Announcement {
    pub id: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct AdminEmail {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct JoinRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct JoinResponse {
    pub ok: bool,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct ContactInfo {
    pub organization: String,
    pub email: String,
}

/// Everything the public homepage renders.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct SitePayload {
    pub events: Vec<EventItem>,
    pub photos: Vec<GalleryImage>,
    pub documents: Vec<DocumentRow>,
    pub announcements: Vec<Announcement>,
    pub contact: ContactInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calendar_from_str() {
        assert_eq!("band".parse::<CalendarType>().unwrap(), CalendarType::Band);
        assert_eq!(" Drama ".parse::<CalendarType>().unwrap(), CalendarType::Drama);
        assert!("orchestra".parse::<CalendarType>().is_err());
    }

    #[test]
    fn test_calendar_from_loose() {
        assert_eq!(CalendarType::from_loose("Fundraiser"), CalendarType::Fundraising);
        assert_eq!(CalendarType::from_loose("BAND"), CalendarType::Band);
        assert_eq!(CalendarType::from_loose("picnic"), CalendarType::General);
        assert_eq!(CalendarType::from_loose(""), CalendarType::General);
    }

    #[test]
    fn test_event_row_into_item_drops_empty_optionals() {
        let row = EventRow {
            id: "7".to_string(),
            title: "Spring Concert".to_string(),
            date: "2025-05-02".to_string(),
            calendar: CalendarType::Band,
            location: Some(String::new()),
            description: Some("Bring a friend".to_string()),
            published: true,
        };
        let item = EventItem::from(row);
        assert_eq!(item.location, None);
        assert_eq!(item.description.as_deref(), Some("Bring a friend"));
    }

    #[test]
    fn test_event_draft_defaults() {
        let draft: EventDraft =
            serde_json::from_str(r#"{"title":"Car Wash","date":"2025-08-30"}"#).unwrap();
        assert_eq!(draft.calendar, CalendarType::General);
        assert!(draft.published);
    }
}
