//! Integration tests for event matching and recurrence encoding.
//!
//! These tests drive the public API from JSON in both shapes events
//! arrive in: the Google Calendar REST API and the Firestore cache.

use chrono::NaiveDate;
use coachsync_core::{
    get_excluded_events, get_matching_stats, get_unmatched_events, match_event_to_all_clients,
    match_events_to_all_clients, parse_rrule, week_template_to_rrule, CalendarEvent, Client,
    Config, Confidence, MatchingRules, SessionType, WeekTemplate,
};

fn clients() -> Vec<Client> {
    serde_json::from_str(
        r#"[
            { "id": "1", "name": "Devon McGuire", "email": "devon@example.com" },
            { "id": "2", "name": "Sam Lee", "phone": "555-0100" },
            { "id": "3", "name": "Priya Natarajan" }
        ]"#,
    )
    .unwrap()
}

fn google_events() -> Vec<CalendarEvent> {
    serde_json::from_str(
        r#"[
            {
                "id": "g1",
                "summary": "PT Session",
                "start": { "dateTime": "2026-03-02T07:00:00-05:00", "timeZone": "America/New_York" },
                "end": { "dateTime": "2026-03-02T08:00:00-05:00", "timeZone": "America/New_York" },
                "attendees": [
                    { "email": "kim@teamexos.com", "displayName": "Coach Kim", "responseStatus": "accepted" },
                    { "email": "devon@example.com", "displayName": "Devon" },
                    { "email": "sam@example.com", "displayName": "Sam Lee" },
                    { "email": "c_1888@resource.calendar.google.com", "displayName": "Floor 2" }
                ]
            },
            {
                "id": "g2",
                "summary": "Total Body Class",
                "attendees": [
                    { "email": "priya.n@example.com", "displayName": "Priya Natarajan" },
                    { "email": "guest1@example.com" },
                    { "email": "guest2@example.com" }
                ]
            },
            {
                "id": "g3",
                "summary": "Calendar hold - PT",
                "attendees": [ { "email": "devon@example.com", "displayName": "Devon" } ]
            },
            {
                "id": "g4",
                "summary": "Workout w/ Jordan",
                "attendees": [ { "email": "jordan@example.com", "displayName": "Jordan Blake" } ]
            },
            {
                "id": "g5",
                "summary": "Dentist",
                "attendees": [ { "email": "devon@example.com", "displayName": "Devon" } ]
            }
        ]"#,
    )
    .unwrap()
}

#[test]
fn test_google_batch_matching() {
    let rules = MatchingRules::default();
    let matches = match_events_to_all_clients(&google_events(), &clients(), &rules, false);

    assert_eq!(matches.keys().collect::<Vec<_>>(), vec!["g1", "g2"]);

    let pt = &matches["g1"];
    assert_eq!(pt.session_type, SessionType::Buddy);
    assert_eq!(pt.total_attendees, 2);
    assert_eq!(pt.matches[0].client_id, "1");
    assert_eq!(pt.matches[0].matched_name, "Devon");
    assert_eq!(pt.matches[0].confidence, Confidence::Partial);
    assert_eq!(pt.matches[1].client_id, "2");
    assert_eq!(pt.matches[1].confidence, Confidence::Exact);

    let class = &matches["g2"];
    assert_eq!(class.session_type, SessionType::Group);
    assert_eq!(class.total_attendees, 3);
    assert_eq!(class.matches.len(), 1);
    assert_eq!(class.matches[0].client_id, "3");
}

#[test]
fn test_multi_match_output_shape() {
    let events = google_events();
    let result =
        match_event_to_all_clients(&events[0], &clients(), &MatchingRules::default(), false)
            .unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(json["sessionType"], "buddy");
    assert_eq!(json["totalAttendees"], 2);
    assert_eq!(json["matches"][0]["clientId"], "1");
    assert_eq!(json["matches"][0]["clientName"], "Devon McGuire");
    assert_eq!(json["matches"][0]["matchedName"], "Devon");
    assert_eq!(json["matches"][0]["confidence"], "partial");
}

#[test]
fn test_diagnostics_over_google_events() {
    let rules = MatchingRules::default();
    let events = google_events();

    let unmatched = get_unmatched_events(&events, &clients(), &rules);
    assert_eq!(unmatched.len(), 1);
    assert_eq!(unmatched[0].event.id.as_deref(), Some("g4"));
    assert_eq!(unmatched[0].attendee_names, vec!["Jordan Blake"]);

    let excluded = get_excluded_events(&events, &rules);
    let reasons: Vec<(String, String)> = excluded
        .iter()
        .map(|e| (e.event.id.clone().unwrap(), e.reason.to_string()))
        .collect();
    assert_eq!(
        reasons,
        vec![
            (
                "g3".to_string(),
                "Excluded keyword (hold, meeting, admin, etc.)".to_string()
            ),
            (
                "g5".to_string(),
                "Missing session keywords (PT, Training, Class, etc.)".to_string()
            ),
        ]
    );
}

#[test]
fn test_stats_count_single_matches() {
    let stats = get_matching_stats(&google_events(), &clients());
    assert_eq!(stats.total_events, 5);
    assert_eq!(stats.events_with_attendees, 5);
    // g1, g2, g3 and g5 all have a matchable attendee; no session gate
    assert_eq!(stats.matched_events, 4);
    assert_eq!(stats.unmatched_events, 1);
    assert!((stats.match_rate - 80.0).abs() < 1e-9);
}

#[test]
fn test_firestore_cache_shape_degrades() {
    let events: Vec<CalendarEvent> = serde_json::from_str(
        r#"[
            { "id": "f1", "summary": "PT", "guestEmails": "devon@example.com, sam@example.com" },
            { "id": "f2", "summary": 17, "attendees": [ { "displayName": "Sam Lee" } ] },
            { "id": "f3", "summary": "PT", "attendees": { "0": { "displayName": "Sam Lee" } } },
            { "summary": "PT", "attendees": [ { "displayName": "Sam Lee" } ] },
            { "id": "f5", "summary": "PT", "attendees": [ { "displayName": "Sam Lee" } ] }
        ]"#,
    )
    .unwrap();

    let rules = MatchingRules::default();
    let matches = match_events_to_all_clients(&events, &clients(), &rules, false);
    assert_eq!(matches.keys().collect::<Vec<_>>(), vec!["f5"]);

    assert_eq!(
        coachsync_core::extract_guest_emails(&events[0]),
        vec!["devon@example.com", "sam@example.com"]
    );
}

#[test]
fn test_stray_attendee_entry_keeps_the_rest() {
    let event: CalendarEvent = serde_json::from_str(
        r#"{
            "id": "s1",
            "summary": "PT Session",
            "attendees": [
                { "email": "devon@example.com", "displayName": "Devon McGuire" },
                "stray-string-entry"
            ]
        }"#,
    )
    .unwrap();

    let rules = MatchingRules::default();
    assert_eq!(
        coachsync_core::extract_attendee_names(&event, &rules),
        vec!["Devon McGuire"]
    );

    let result = match_event_to_all_clients(&event, &clients(), &rules, false).unwrap();
    assert_eq!(result.matches[0].client_id, "1");
    assert_eq!(result.matches[0].confidence, Confidence::Exact);
    assert_eq!(
        coachsync_core::match_event_to_client(&event, &clients()).map(|m| m.client_id),
        Some("1".to_string())
    );
}

#[test]
fn test_config_rules_feed_matching() {
    let mut config = Config::default();
    config.set("matching.coach_patterns", "@mygym.com").unwrap();
    config.set("matching.coaching_keywords", "bootcamp").unwrap();

    let event: CalendarEvent = serde_json::from_str(
        r#"{
            "id": "c1",
            "summary": "Bootcamp",
            "attendees": [
                { "email": "alex@mygym.com", "displayName": "Alex Trainer" },
                { "email": "sam@example.com", "displayName": "Sam Lee" }
            ]
        }"#,
    )
    .unwrap();

    let result =
        match_event_to_all_clients(&event, &clients(), &config.matching_rules(), false).unwrap();
    assert_eq!(result.total_attendees, 1);
    assert_eq!(result.session_type, SessionType::OneOnOne);

    assert!(
        match_event_to_all_clients(&event, &clients(), &MatchingRules::default(), false).is_none()
    );
}

#[test]
fn test_week_template_rules_parse_back() {
    let template: WeekTemplate = serde_json::from_str(
        r#"{
            "name": "Hypertrophy",
            "days": [
                { "day": "Monday", "workoutCategory": "Upper" },
                { "day": "Tuesday", "workoutCategory": "Lower" },
                { "day": "Wednesday", "workoutCategory": "Rest Day" },
                { "day": "Thursday", "workoutCategory": "Upper" },
                { "day": "Friday", "workoutCategory": "Lower" },
                { "day": "Saturday", "workoutCategory": "Conditioning" },
                { "day": "Sunday", "workoutCategory": "rest day" }
            ]
        }"#,
    )
    .unwrap();

    let until = NaiveDate::from_ymd_opt(2026, 6, 30).unwrap();
    let rules = week_template_to_rrule(&template, until);
    assert_eq!(
        rules.keys().collect::<Vec<_>>(),
        vec!["Upper", "Lower", "Conditioning"]
    );

    let upper = parse_rrule(&rules["Upper"][0]);
    assert_eq!(upper.frequency, "WEEKLY");
    assert_eq!(upper.by_day, vec!["MO", "TH"]);
    assert_eq!(upper.until, Some(until));

    let conditioning = parse_rrule(&rules["Conditioning"][0]);
    assert_eq!(conditioning.by_day, vec!["SA"]);
}
