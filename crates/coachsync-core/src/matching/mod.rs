//! Calendar event to client matching.
//!
//! Decides whether a calendar event is a trainable session and which
//! client(s) it belongs to:
//! - Session gate: exclusion, class and coaching keywords on the title
//! - Attendee extraction: drops rooms, video links and the coach
//! - Name matching: exact / partial / fuzzy against the client roster
//! - Batch helpers and diagnostics for the scheduling views
//!
//! Every entry point is total. A malformed event degrades to "invalid" or
//! "no match" and never aborts a batch.

pub mod names;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::event::{CalendarEvent, Client};

pub use names::{names_match, normalize_name, Confidence};

/// Built-in keywords for 1-on-1 coaching sessions.
pub const DEFAULT_COACHING_KEYWORDS: &[&str] =
    &["personal training", "pt", "training session", "workout"];

/// Built-in keywords for group classes.
pub const DEFAULT_CLASS_KEYWORDS: &[&str] = &[
    "class",
    "group class",
    "group training",
    "group session",
    "total",
    "choice",
];

/// Built-in keywords that disqualify an event outright.
pub const DEFAULT_EXCLUSION_KEYWORDS: &[&str] = &["hold", "blocked", "meeting", "admin"];

/// Built-in coach email patterns.
pub const DEFAULT_COACH_PATTERNS: &[&str] = &["@xwf.google.com", "@teamexos.com"];

const ROOM_RESOURCE_DOMAIN: &str = "resource.calendar.google.com";
const VIDEO_CONFERENCE_TAG: &str = "[GVC]";

/// Keyword and pattern lists used by the matcher.
///
/// Always holds the built-in defaults; user entries are added on top,
/// never in place of them. All entries are stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingRules {
    coaching_keywords: Vec<String>,
    class_keywords: Vec<String>,
    exclusion_keywords: Vec<String>,
    coach_patterns: Vec<String>,
}

fn union_with_defaults(user: &[String], defaults: &[&str]) -> Vec<String> {
    let mut merged: Vec<String> = Vec::with_capacity(user.len() + defaults.len());
    for entry in user
        .iter()
        .map(|s| s.trim().to_lowercase())
        .chain(defaults.iter().map(|s| s.to_lowercase()))
    {
        if !entry.is_empty() && !merged.contains(&entry) {
            merged.push(entry);
        }
    }
    merged
}

impl Default for MatchingRules {
    fn default() -> Self {
        Self::from_user(&[], &[], &[], &[])
    }
}

impl MatchingRules {
    /// Union user-supplied lists with the defaults.
    pub fn from_user(
        coaching_keywords: &[String],
        class_keywords: &[String],
        exclusion_keywords: &[String],
        coach_patterns: &[String],
    ) -> Self {
        Self {
            coaching_keywords: union_with_defaults(coaching_keywords, DEFAULT_COACHING_KEYWORDS),
            class_keywords: union_with_defaults(class_keywords, DEFAULT_CLASS_KEYWORDS),
            exclusion_keywords: union_with_defaults(exclusion_keywords, DEFAULT_EXCLUSION_KEYWORDS),
            coach_patterns: union_with_defaults(coach_patterns, DEFAULT_COACH_PATTERNS),
        }
    }

    pub fn coaching_keywords(&self) -> &[String] {
        &self.coaching_keywords
    }

    pub fn class_keywords(&self) -> &[String] {
        &self.class_keywords
    }

    pub fn exclusion_keywords(&self) -> &[String] {
        &self.exclusion_keywords
    }

    pub fn coach_patterns(&self) -> &[String] {
        &self.coach_patterns
    }

    pub fn is_coaching_session(&self, title: &str) -> bool {
        contains_any(title, &self.coaching_keywords)
    }

    pub fn is_class_session(&self, title: &str) -> bool {
        contains_any(title, &self.class_keywords)
    }

    pub fn should_exclude(&self, title: &str) -> bool {
        contains_any(title, &self.exclusion_keywords)
    }

    pub fn is_coach(&self, name_or_email: &str) -> bool {
        contains_any(name_or_email, &self.coach_patterns)
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    let haystack = haystack.to_lowercase();
    needles.iter().any(|needle| haystack.contains(needle.as_str()))
}

/// One client matched to one attendee of an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMatchResult {
    pub client_id: String,
    pub client_name: String,
    /// Attendee name as it appeared on the event.
    pub matched_name: String,
    pub confidence: Confidence,
}

impl ClientMatchResult {
    fn new(client: &Client, attendee_name: &str) -> Self {
        Self {
            client_id: client.id.clone(),
            client_name: client.name.clone(),
            matched_name: attendee_name.to_string(),
            confidence: Confidence::classify(&client.name, attendee_name),
        }
    }
}

/// Session size, derived from the number of non-coach attendees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionType {
    #[serde(rename = "1-on-1")]
    OneOnOne,
    #[serde(rename = "buddy")]
    Buddy,
    #[serde(rename = "group")]
    Group,
}

impl SessionType {
    /// 1 attendee is 1-on-1, 2 is buddy, anything larger is group.
    pub fn from_attendee_count(count: usize) -> Self {
        match count {
            0 | 1 => SessionType::OneOnOne,
            2 => SessionType::Buddy,
            _ => SessionType::Group,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionType::OneOnOne => "1-on-1",
            SessionType::Buddy => "buddy",
            SessionType::Group => "group",
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Every client matched on one event.
///
/// `matches.len() <= total_attendees`, and `session_type` follows the
/// attendee count, not the match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiClientMatchResult {
    pub matches: Vec<ClientMatchResult>,
    pub session_type: SessionType,
    pub total_attendees: usize,
}

/// Whether the event is a session worth matching.
///
/// Exclusion keywords win over everything. Class sessions are valid even
/// with no attendees, since the coach may be the only listed participant.
/// Coaching sessions need at least one non-coach attendee.
pub fn is_valid_session_event(event: &CalendarEvent, rules: &MatchingRules) -> bool {
    let Some(title) = event.summary.as_deref() else {
        return false;
    };

    if rules.should_exclude(title) {
        return false;
    }

    if rules.is_class_session(title) {
        return true;
    }

    if rules.is_coaching_session(title) {
        return !extract_attendee_names(event, rules).is_empty();
    }

    false
}

/// Names of the event's attendees, minus rooms, video links and the coach.
///
/// Each attendee contributes its display name, or its email when no
/// display name is set. Guest-email metadata is not consulted here; see
/// [`extract_guest_emails`].
pub fn extract_attendee_names(event: &CalendarEvent, rules: &MatchingRules) -> Vec<String> {
    let Some(attendees) = event.attendees.as_deref() else {
        tracing::debug!(event_id = ?event.id, "no attendees on event");
        return Vec::new();
    };

    let names: Vec<String> = attendees
        .iter()
        .filter(|attendee| {
            let email = attendee.email_str();
            let display_name = attendee.display_name_str();

            if email.contains(ROOM_RESOURCE_DOMAIN)
                || email.contains(VIDEO_CONFERENCE_TAG)
                || display_name.contains(VIDEO_CONFERENCE_TAG)
            {
                return false;
            }

            !(rules.is_coach(display_name) || rules.is_coach(email))
        })
        .map(|attendee| attendee.label().to_string())
        .filter(|name| !name.trim().is_empty())
        .collect();

    tracing::debug!(event_id = ?event.id, ?names, "extracted attendee names");
    names
}

fn split_emails(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_string)
        .collect()
}

/// Guest emails recorded by the work calendar sync.
///
/// Looked up in priority order: `guestEmails`, then
/// `extendedProperties.shared.guest_emails`, then
/// `extendedProperties.private.guest_emails`. The first non-empty source
/// wins.
pub fn extract_guest_emails(event: &CalendarEvent) -> Vec<String> {
    if let Some(raw) = event.guest_emails.as_deref().filter(|s| !s.is_empty()) {
        return split_emails(raw);
    }

    let Some(props) = event.extended_properties.as_ref() else {
        return Vec::new();
    };

    [props.shared.as_ref(), props.private.as_ref()]
        .into_iter()
        .flatten()
        .find_map(|bag| bag.guest_emails.as_deref())
        .map(split_emails)
        .unwrap_or_default()
}

/// First client matching any attendee, using the default coach patterns
/// and no session gate.
pub fn match_event_to_client(event: &CalendarEvent, clients: &[Client]) -> Option<ClientMatchResult> {
    let attendee_names = extract_attendee_names(event, &MatchingRules::default());

    for attendee_name in &attendee_names {
        if let Some(client) = clients.iter().find(|c| names_match(&c.name, attendee_name)) {
            let result = ClientMatchResult::new(client, attendee_name);
            tracing::debug!(
                client = %client.name,
                attendee = %attendee_name,
                confidence = result.confidence.as_str(),
                "matched event to client"
            );
            return Some(result);
        }
    }

    None
}

/// Every client the event's attendees identify.
///
/// Each attendee matches at most one client (the first in roster order),
/// and a client is never matched twice. Returns `None` if the event fails
/// the session gate (unless `skip_validation`), has no attendees, or
/// matches nobody.
pub fn match_event_to_all_clients(
    event: &CalendarEvent,
    clients: &[Client],
    rules: &MatchingRules,
    skip_validation: bool,
) -> Option<MultiClientMatchResult> {
    if !skip_validation && !is_valid_session_event(event, rules) {
        return None;
    }

    let attendee_names = extract_attendee_names(event, rules);
    if attendee_names.is_empty() {
        return None;
    }

    let mut matches = Vec::new();
    let mut matched_ids: HashSet<&str> = HashSet::new();

    for attendee_name in &attendee_names {
        let found = clients
            .iter()
            .filter(|c| !matched_ids.contains(c.id.as_str()))
            .find(|c| names_match(&c.name, attendee_name));

        if let Some(client) = found {
            matches.push(ClientMatchResult::new(client, attendee_name));
            matched_ids.insert(client.id.as_str());
        }
    }

    if matches.is_empty() {
        return None;
    }

    Some(MultiClientMatchResult {
        matches,
        session_type: SessionType::from_attendee_count(attendee_names.len()),
        total_attendees: attendee_names.len(),
    })
}

/// Single-match results keyed by event id, in event order. Events without
/// an id or a match are dropped.
pub fn match_events_to_clients(
    events: &[CalendarEvent],
    clients: &[Client],
) -> IndexMap<String, ClientMatchResult> {
    events
        .iter()
        .filter_map(|event| {
            let id = event.id.clone()?;
            match_event_to_client(event, clients).map(|m| (id, m))
        })
        .collect()
}

/// Multi-match results keyed by event id, in event order.
pub fn match_events_to_all_clients(
    events: &[CalendarEvent],
    clients: &[Client],
    rules: &MatchingRules,
    skip_validation: bool,
) -> IndexMap<String, MultiClientMatchResult> {
    events
        .iter()
        .filter_map(|event| {
            let id = event.id.clone()?;
            match_event_to_all_clients(event, clients, rules, skip_validation).map(|m| (id, m))
        })
        .collect()
}

/// A valid session that has attendees but no client among them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedEvent<'a> {
    pub event: &'a CalendarEvent,
    pub attendee_names: Vec<String>,
}

/// Valid session events whose attendees match no client.
///
/// The match check uses single-match semantics with the default coach
/// patterns, as [`match_event_to_client`] does.
pub fn get_unmatched_events<'a>(
    events: &'a [CalendarEvent],
    clients: &[Client],
    rules: &MatchingRules,
) -> Vec<UnmatchedEvent<'a>> {
    events
        .iter()
        .filter_map(|event| {
            let attendee_names = extract_attendee_names(event, rules);
            if attendee_names.is_empty() || !is_valid_session_event(event, rules) {
                return None;
            }
            match match_event_to_client(event, clients) {
                Some(_) => None,
                None => Some(UnmatchedEvent {
                    event,
                    attendee_names,
                }),
            }
        })
        .collect()
}

/// Why an event with attendees was left out of matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    ExcludedKeyword,
    NoClientsListed,
    MissingSessionKeywords,
}

impl ExclusionReason {
    pub fn message(&self) -> &'static str {
        match self {
            ExclusionReason::ExcludedKeyword => "Excluded keyword (hold, meeting, admin, etc.)",
            ExclusionReason::NoClientsListed => "Coaching session with no clients listed",
            ExclusionReason::MissingSessionKeywords => {
                "Missing session keywords (PT, Training, Class, etc.)"
            }
        }
    }
}

impl fmt::Display for ExclusionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for ExclusionReason {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExcludedEvent<'a> {
    pub event: &'a CalendarEvent,
    pub reason: ExclusionReason,
}

/// Events with at least one raw attendee that the session gate rejects,
/// tagged with the reason.
pub fn get_excluded_events<'a>(
    events: &'a [CalendarEvent],
    rules: &MatchingRules,
) -> Vec<ExcludedEvent<'a>> {
    events
        .iter()
        .filter_map(|event| {
            let title = event.summary.as_deref()?;
            if event.attendee_list().is_empty() {
                return None;
            }

            let reason = if rules.should_exclude(title) {
                ExclusionReason::ExcludedKeyword
            } else {
                let coaching = rules.is_coaching_session(title);
                let class = rules.is_class_session(title);
                if coaching && !class && extract_attendee_names(event, rules).is_empty() {
                    ExclusionReason::NoClientsListed
                } else if !coaching && !class {
                    ExclusionReason::MissingSessionKeywords
                } else {
                    return None;
                }
            };

            Some(ExcludedEvent { event, reason })
        })
        .collect()
}

/// Match coverage over a batch of events, counted with single-match
/// semantics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchingStats {
    pub total_events: usize,
    pub events_with_attendees: usize,
    pub matched_events: usize,
    pub unmatched_events: usize,
    /// Percentage (0-100) of events with attendees that matched.
    pub match_rate: f64,
}

pub fn get_matching_stats(events: &[CalendarEvent], clients: &[Client]) -> MatchingStats {
    let defaults = MatchingRules::default();
    let events_with_attendees = events
        .iter()
        .filter(|e| !extract_attendee_names(e, &defaults).is_empty())
        .count();
    let matched_events = match_events_to_clients(events, clients).len();

    let match_rate = if events_with_attendees > 0 {
        matched_events as f64 / events_with_attendees as f64 * 100.0
    } else {
        0.0
    };

    MatchingStats {
        total_events: events.len(),
        events_with_attendees,
        matched_events,
        unmatched_events: events_with_attendees.saturating_sub(matched_events),
        match_rate,
    }
}
