//! Name comparison between client records and calendar attendees.
//!
//! Matching falls through progressively looser rules: exact, substring,
//! shared word, then a small edit distance for typos. The confidence label
//! is not taken from whichever rule fired; [`Confidence::classify`]
//! re-derives it from the normalized strings, so a shared-word or
//! edit-distance hit is always reported as fuzzy.

use serde::{Deserialize, Serialize};

/// How sure a match is that an attendee name identifies a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Exact,
    Partial,
    Fuzzy,
}

impl Confidence {
    /// Label an already-accepted match.
    ///
    /// Normalized equality is exact, containment in either direction is
    /// partial, anything else is fuzzy.
    pub fn classify(client_name: &str, attendee_name: &str) -> Self {
        let client = normalize_name(client_name);
        let attendee = normalize_name(attendee_name);

        if client == attendee {
            Confidence::Exact
        } else if attendee.contains(&client) || client.contains(&attendee) {
            Confidence::Partial
        } else {
            Confidence::Fuzzy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Exact => "exact",
            Confidence::Partial => "partial",
            Confidence::Fuzzy => "fuzzy",
        }
    }
}

/// Lowercase, trim, drop `.` and `,`, and collapse whitespace runs to a
/// single space, in that order. Punctuation is removed after trimming, so
/// `"Lee ."` normalizes to `"lee "`.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut in_whitespace = false;

    for c in lowered.trim().chars().filter(|c| *c != '.' && *c != ',') {
        if c.is_whitespace() {
            if !in_whitespace {
                out.push(' ');
            }
            in_whitespace = true;
        } else {
            out.push(c);
            in_whitespace = false;
        }
    }

    out
}

/// Whether `attendee_name` plausibly refers to `client_name`.
///
/// ```
/// use coachsync_core::matching::names_match;
///
/// assert!(names_match("Devon McGuire", "Devon"));
/// assert!(names_match("Devon", "Devon McGuire"));
/// assert!(names_match("Devn", "Devon"));
/// assert!(!names_match("Alice", "Bob"));
/// ```
pub fn names_match(client_name: &str, attendee_name: &str) -> bool {
    let client = normalize_name(client_name);
    let attendee = normalize_name(attendee_name);

    if client == attendee {
        return true;
    }

    if attendee.contains(&client) || client.contains(&attendee) {
        return true;
    }

    // "Devon McGuire" vs "McGuire Devon"
    let attendee_words: Vec<&str> = attendee.split(' ').collect();
    if client
        .split(' ')
        .any(|word| word.chars().count() > 2 && attendee_words.contains(&word))
    {
        return true;
    }

    let client_len = client.chars().count();
    let attendee_len = attendee.chars().count();
    if client_len >= 3 && attendee_len >= 3 {
        let max_distance = if client_len > 5 { 2 } else { 1 };
        if strsim::levenshtein(&client, &attendee) <= max_distance {
            return true;
        }
    }

    false
}
