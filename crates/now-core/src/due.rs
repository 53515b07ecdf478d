use chrono::{DateTime, Local, NaiveDate, TimeZone};
use regex::Regex;

pub const DUE_MARKER: &str = "@due:";

/// Find the first `@due:YYYY-MM-DD` marker and return local midnight of that
/// date. Dates that match the pattern but do not exist on the calendar
/// (month 13, February 30th, ...) yield `None`.
pub fn extract_due_date(description: &str) -> Option<DateTime<Local>> {
    let re = Regex::new(r"@due:([0-9]{4})-([0-9]{2})-([0-9]{2})").expect("regex");
    let caps = re.captures(description)?;
    let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
    let month = caps.get(2)?.as_str().parse::<u32>().ok()?;
    let day = caps.get(3)?.as_str().parse::<u32>().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    local_midnight(date)
}

/// Midnight is skipped on some DST transitions; take the earliest instant the
/// local clock reads on that date in that case.
pub fn local_midnight(date: NaiveDate) -> Option<DateTime<Local>> {
    let midnight = date.and_hms_opt(0, 0, 0)?;
    if let Some(value) = Local.from_local_datetime(&midnight).earliest() {
        return Some(value);
    }
    (1..=3).find_map(|hour| {
        let shifted = date.and_hms_opt(hour, 0, 0)?;
        Local.from_local_datetime(&shifted).earliest()
    })
}
