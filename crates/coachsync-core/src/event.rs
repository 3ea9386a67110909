//! Calendar event and client models.
//!
//! Events arrive from two sources: the Google Calendar REST API
//! (`events.list`) and the Firestore cache that mirrors it. Field shapes
//! are not guaranteed to agree between them, so every field the matcher
//! reads is optional and deserializes leniently: a field with the wrong
//! JSON type reads as absent instead of failing the whole event.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize any JSON value, keeping it only if it fits `T`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Like [`lenient`] for arrays, but per element: entries that do not fit
/// `T` are dropped and the rest kept.
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Option<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => Ok(Some(
            items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect(),
        )),
        _ => Ok(None),
    }
}

/// A coaching client. Only `id` and `name` matter for matching; other
/// profile fields are ignored on input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

impl Client {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A calendar event participant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub response_status: Option<String>,
}

impl Attendee {
    /// Attendee known only by email.
    pub fn email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            ..Self::default()
        }
    }

    /// Attendee known only by display name.
    pub fn named(display_name: impl Into<String>) -> Self {
        Self {
            display_name: Some(display_name.into()),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Email, or `""` when absent.
    pub fn email_str(&self) -> &str {
        self.email.as_deref().unwrap_or("")
    }

    /// Display name, or `""` when absent.
    pub fn display_name_str(&self) -> &str {
        self.display_name.as_deref().unwrap_or("")
    }

    /// The name shown for this attendee: display name if non-empty,
    /// otherwise the email.
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => self.email_str(),
        }
    }
}

/// Key/value bag under `extendedProperties.shared` or `.private`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyBag {
    /// Comma-separated guest emails written by the work calendar sync.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub guest_emails: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedProperties {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub shared: Option<PropertyBag>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub private: Option<PropertyBag>,
}

/// Start or end of an event as the Calendar API reports it. Kept as raw
/// strings; nothing in matching interprets them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventTime {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

/// The subset of a Google Calendar event read by the matcher.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub start: Option<EventTime>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub end: Option<EventTime>,
    #[serde(default, deserialize_with = "lenient_list", skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<Attendee>>,
    /// Comma-separated guest emails, populated by the Firestore cache.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub guest_emails: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub extended_properties: Option<ExtendedProperties>,
}

impl CalendarEvent {
    pub fn new(id: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            summary: Some(summary.into()),
            ..Self::default()
        }
    }

    pub fn with_attendee(mut self, attendee: Attendee) -> Self {
        self.attendees.get_or_insert_with(Vec::new).push(attendee);
        self
    }

    pub fn with_attendees(mut self, attendees: impl IntoIterator<Item = Attendee>) -> Self {
        self.attendees
            .get_or_insert_with(Vec::new)
            .extend(attendees);
        self
    }

    pub fn with_guest_emails(mut self, guest_emails: impl Into<String>) -> Self {
        self.guest_emails = Some(guest_emails.into());
        self
    }

    /// Decode a batch of raw events, skipping entries that are not event
    /// objects so one bad record does not sink the rest.
    pub fn from_json_batch(values: Vec<serde_json::Value>) -> Vec<CalendarEvent> {
        values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value(value) {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::warn!(index, error = %e, "skipping malformed calendar event");
                    None
                }
            })
            .collect()
    }

    /// Raw attendee list; empty when the event carries none.
    pub fn attendee_list(&self) -> &[Attendee] {
        self.attendees.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_google_api_shape() {
        let json = r#"{
            "id": "evt-1",
            "summary": "PT Session",
            "start": { "dateTime": "2026-03-02T09:00:00-05:00", "timeZone": "America/New_York" },
            "end": { "dateTime": "2026-03-02T10:00:00-05:00", "timeZone": "America/New_York" },
            "attendees": [
                { "email": "coach@teamexos.com", "displayName": "Coach", "responseStatus": "accepted" },
                { "email": "devon@example.com", "displayName": "Devon McGuire" }
            ],
            "extendedProperties": { "shared": { "guest_emails": "a@x.com,b@x.com", "other": "1" } },
            "htmlLink": "https://calendar.google.com/event?eid=abc"
        }"#;

        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        assert_eq!(event.id.as_deref(), Some("evt-1"));
        assert_eq!(event.attendee_list().len(), 2);
        assert_eq!(event.attendee_list()[1].label(), "Devon McGuire");
        assert_eq!(
            event
                .extended_properties
                .as_ref()
                .and_then(|p| p.shared.as_ref())
                .and_then(|s| s.guest_emails.as_deref()),
            Some("a@x.com,b@x.com")
        );
        assert_eq!(
            event.start.unwrap().time_zone.as_deref(),
            Some("America/New_York")
        );
    }

    #[test]
    fn wrong_field_types_read_as_absent() {
        let json = r#"{
            "id": 42,
            "summary": { "text": "PT" },
            "attendees": "devon@example.com",
            "guestEmails": ["a@x.com"]
        }"#;

        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        assert!(event.id.is_none());
        assert!(event.summary.is_none());
        assert!(event.attendees.is_none());
        assert!(event.guest_emails.is_none());
    }

    #[test]
    fn null_fields_read_as_absent() {
        let json = r#"{ "id": "e", "summary": null, "attendees": null }"#;
        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        assert!(event.summary.is_none());
        assert!(event.attendee_list().is_empty());
    }

    #[test]
    fn malformed_attendee_entries_are_dropped_individually() {
        let json = r#"{
            "id": "e",
            "summary": "PT",
            "attendees": [
                { "email": "devon@example.com", "displayName": "Devon McGuire" },
                "stray-string-entry",
                null,
                7,
                { "displayName": "Sam Lee" }
            ]
        }"#;

        let event: CalendarEvent = serde_json::from_str(json).unwrap();
        let labels: Vec<&str> = event.attendee_list().iter().map(Attendee::label).collect();
        assert_eq!(labels, vec!["Devon McGuire", "Sam Lee"]);
    }

    #[test]
    fn batch_decoding_skips_non_event_entries() {
        let values: Vec<serde_json::Value> = serde_json::from_str(
            r#"[null, { "id": "a", "summary": "PT" }, "oops", 3, { "id": "b" }]"#,
        )
        .unwrap();

        let events = CalendarEvent::from_json_batch(values);
        let ids: Vec<Option<&str>> = events.iter().map(|e| e.id.as_deref()).collect();
        assert_eq!(ids, vec![Some("a"), Some("b")]);
    }

    #[test]
    fn label_falls_back_to_email_for_empty_display_name() {
        let attendee = Attendee {
            email: Some("sam@example.com".to_string()),
            display_name: Some(String::new()),
            response_status: None,
        };
        assert_eq!(attendee.label(), "sam@example.com");
        assert_eq!(Attendee::default().label(), "");
    }

    #[test]
    fn client_ignores_profile_fields() {
        let json = r#"{ "id": "1", "name": "Sam Lee", "email": "sam@x.com", "goals": ["strength"] }"#;
        let client: Client = serde_json::from_str(json).unwrap();
        assert_eq!(client, Client::new("1", "Sam Lee"));
    }
}
