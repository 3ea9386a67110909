pub mod config;
pub mod matching;
pub mod rrule;

use coachsync_core::CalendarEvent;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::Read;
use std::path::Path;

/// Read JSON from a file, or from stdin when the path is `-`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let content = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {e}", path.display()))?
    };
    Ok(serde_json::from_str(&content)?)
}

/// Read an array of calendar events, skipping entries that are not events.
pub fn read_events(path: &Path) -> Result<Vec<CalendarEvent>, Box<dyn std::error::Error>> {
    let values: Vec<serde_json::Value> = read_json(path)?;
    Ok(CalendarEvent::from_json_batch(values))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse a `YYYY-MM-DD` argument.
pub fn parse_date(s: &str) -> Result<chrono::NaiveDate, String> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("invalid date '{s}' (expected YYYY-MM-DD): {e}"))
}
