//! Weekly recurrence rules for Google Calendar.
//!
//! A week template assigns a workout category to each day. Each category
//! becomes one `RRULE:FREQ=WEEKLY;BYDAY=..;UNTIL=..` string, the shape the
//! Calendar API's `recurrence` field expects. `UNTIL` is a calendar-local
//! `yyyymmdd` date with no timezone conversion.

use chrono::{NaiveDate, Weekday};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RecurrenceError;

/// Category marker for days without a session (case-insensitive substring).
pub const REST_DAY_MARKER: &str = "rest day";

/// Category name to its recurrence list (always one rule), in the order
/// categories first appear in the template.
pub type RecurrenceMap = IndexMap<String, Vec<String>>;

/// One day of a week template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDay {
    /// Full English day name, `"Monday"`..`"Sunday"`.
    pub day: String,
    pub workout_category: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variations: Vec<String>,
}

impl TemplateDay {
    pub fn new(day: impl Into<String>, workout_category: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            workout_category: workout_category.into(),
            variations: Vec::new(),
        }
    }
}

/// A 7-day category assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub days: Vec<TemplateDay>,
}

impl WeekTemplate {
    pub fn from_days(days: impl IntoIterator<Item = TemplateDay>) -> Self {
        Self {
            days: days.into_iter().collect(),
            ..Self::default()
        }
    }
}

/// Parse a full day name. Case-sensitive: only `"Monday"`..`"Sunday"`.
pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "Monday" => Some(Weekday::Mon),
        "Tuesday" => Some(Weekday::Tue),
        "Wednesday" => Some(Weekday::Wed),
        "Thursday" => Some(Weekday::Thu),
        "Friday" => Some(Weekday::Fri),
        "Saturday" => Some(Weekday::Sat),
        "Sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Two-letter RRULE `BYDAY` code.
pub fn rrule_day_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

/// `yyyymmdd`
pub fn format_until(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

fn weekly_rule(by_day: &str, until: &str) -> String {
    format!("RRULE:FREQ=WEEKLY;BYDAY={by_day};UNTIL={until}")
}

/// One weekly rule per workout category.
///
/// Rest days are skipped. Unknown day names are logged and skipped. Day
/// codes keep template order and are not deduplicated.
pub fn week_template_to_rrule(template: &WeekTemplate, period_end: NaiveDate) -> RecurrenceMap {
    let until = format_until(period_end);
    let mut category_days: IndexMap<&str, Vec<&'static str>> = IndexMap::new();

    for entry in &template.days {
        let category = entry.workout_category.as_str();
        if category.to_lowercase().contains(REST_DAY_MARKER) {
            continue;
        }

        let Some(weekday) = weekday_from_name(&entry.day) else {
            tracing::warn!(day = %entry.day, category, "unknown day name in week template");
            continue;
        };

        category_days
            .entry(category)
            .or_default()
            .push(rrule_day_code(weekday));
    }

    category_days
        .into_iter()
        .filter(|(_, days)| !days.is_empty())
        .map(|(category, days)| (category.to_string(), vec![weekly_rule(&days.join(","), &until)]))
        .collect()
}

/// Weekly rule for a single day.
///
/// # Errors
///
/// Returns [`RecurrenceError::InvalidDayOfWeek`] if `day_of_week` is not
/// one of `"Monday"`..`"Sunday"`.
pub fn create_single_day_rrule(
    day_of_week: &str,
    until: NaiveDate,
) -> Result<String, RecurrenceError> {
    let weekday = weekday_from_name(day_of_week)
        .ok_or_else(|| RecurrenceError::InvalidDayOfWeek(day_of_week.to_string()))?;
    Ok(weekly_rule(rrule_day_code(weekday), &format_until(until)))
}

/// Recurrence for one category of a template.
///
/// Falls back to a plain weekly rule ending at `until` when the template
/// has no days for `category`.
pub fn recurrence_for_category(
    template: &WeekTemplate,
    until: NaiveDate,
    category: &str,
) -> Vec<String> {
    let mut rules = week_template_to_rrule(template, until);
    if let Some(rule) = rules.shift_remove(category) {
        return rule;
    }

    tracing::warn!(
        category,
        available = ?rules.keys().collect::<Vec<_>>(),
        "no recurrence for category, using weekly fallback"
    );
    vec![format!("RRULE:FREQ=WEEKLY;UNTIL={}", format_until(until))]
}

/// Fields of a parsed rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedRRule {
    pub frequency: String,
    pub by_day: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<NaiveDate>,
}

impl Default for ParsedRRule {
    fn default() -> Self {
        Self {
            frequency: "WEEKLY".to_string(),
            by_day: Vec::new(),
            until: None,
        }
    }
}

impl fmt::Display for ParsedRRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RRULE:FREQ={}", self.frequency)?;
        if !self.by_day.is_empty() {
            write!(f, ";BYDAY={}", self.by_day.join(","))?;
        }
        if let Some(until) = self.until {
            write!(f, ";UNTIL={}", format_until(until))?;
        }
        Ok(())
    }
}

/// Leading `yyyymmdd` of an UNTIL value; `None` if absent or not a real
/// calendar date.
fn parse_until(value: &str) -> Option<NaiveDate> {
    let digits = value.get(..8)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = digits[..4].parse().ok()?;
    let month = digits[4..6].parse().ok()?;
    let day = digits[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Split a rule into its `FREQ`, `BYDAY` and `UNTIL` parts.
///
/// An optional `RRULE:` prefix is accepted. Unknown keys are ignored and
/// `FREQ` is kept verbatim. A missing `FREQ` reads as `WEEKLY`.
pub fn parse_rrule(rrule: &str) -> ParsedRRule {
    let body = rrule.strip_prefix("RRULE:").unwrap_or(rrule);
    let mut parsed = ParsedRRule::default();

    for part in body.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key {
            "FREQ" => parsed.frequency = value.to_string(),
            "BYDAY" => {
                parsed.by_day = value
                    .split(',')
                    .filter(|d| !d.is_empty())
                    .map(str::to_string)
                    .collect();
            }
            "UNTIL" => parsed.until = parse_until(value),
            _ => {}
        }
    }

    parsed
}

/// End an existing series the day before `split_date`.
///
/// Replaces the 8-digit date of the `UNTIL` clause; a rule without one is
/// returned unchanged.
pub fn split_series_until(rrule: &str, split_date: NaiveDate) -> String {
    let Some(day_before) = split_date.pred_opt() else {
        return rrule.to_string();
    };

    let mut search_from = 0;
    while let Some(offset) = rrule[search_from..].find("UNTIL=") {
        let start = search_from + offset + "UNTIL=".len();
        let is_date = rrule
            .get(start..start + 8)
            .is_some_and(|s| s.bytes().all(|b| b.is_ascii_digit()));
        if is_date {
            return format!(
                "{}{}{}",
                &rrule[..start],
                format_until(day_before),
                &rrule[start + 8..]
            );
        }
        search_from = start;
    }

    rrule.to_string()
}
