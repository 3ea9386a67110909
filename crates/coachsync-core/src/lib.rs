//! # CoachSync Core Library
//!
//! Scheduling logic for a coaching practice whose sessions live in Google
//! Calendar. It implements a CLI-first philosophy: everything here is pure
//! and synchronous, the `coachsync-cli` binary is a thin layer over it, and
//! all network and Firestore access stays with the caller.
//!
//! ## Architecture
//!
//! - **Matching**: classify calendar events as sessions and match their
//!   attendees to the client roster (exact / partial / fuzzy)
//! - **Recurrence**: turn a week template into one weekly RRULE per workout
//!   category, and parse rules back
//! - **Storage**: TOML-based configuration of the event detection keywords
//!
//! ## Key Components
//!
//! - [`CalendarEvent`]: lenient model of a Google Calendar event
//! - [`MatchingRules`]: keyword and coach pattern lists, defaults included
//! - [`match_event_to_all_clients`]: multi-client matching with session type
//! - [`week_template_to_rrule`]: week template to per-category RRULEs
//! - [`Config`]: application configuration management

pub mod error;
pub mod event;
pub mod matching;
pub mod recurrence;
pub mod storage;

pub use error::{ConfigError, CoreError, RecurrenceError};
pub use event::{Attendee, CalendarEvent, Client, EventTime, ExtendedProperties, PropertyBag};
pub use matching::{
    extract_attendee_names, extract_guest_emails, get_excluded_events, get_matching_stats,
    get_unmatched_events, is_valid_session_event, match_event_to_all_clients,
    match_event_to_client, match_events_to_all_clients, match_events_to_clients,
    ClientMatchResult, Confidence, ExcludedEvent, ExclusionReason, MatchingRules, MatchingStats,
    MultiClientMatchResult, SessionType, UnmatchedEvent,
};
pub use recurrence::{
    create_single_day_rrule, parse_rrule, recurrence_for_category, split_series_until,
    week_template_to_rrule, ParsedRRule, RecurrenceMap, TemplateDay, WeekTemplate,
};
pub use storage::{Config, MatchingConfig};
