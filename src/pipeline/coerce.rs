use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::Regex;

static RE_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^\d])(\d{1,2})(?:\s*(?::|h|\.)\s*(\d{2}))?(?:\s*([ap])\.?\s?m\b\.?)?")
        .expect("valid time regex")
});
static RE_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid digits regex"));

/// Coerce free-form time text to `HH:MM`.
///
/// Accepts `14:00`, `2:00 PM`, `3 pm`, `15h30` and the same embedded in a
/// label such as `Check-in: 3:00 PM`. A bare hour is only accepted when it is
/// the whole input.
pub fn coerce_time(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    RE_TIME.captures_iter(trimmed).find_map(|caps| {
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute = caps.get(2).map(|m| m.as_str());
        let meridiem = caps.get(3).map(|m| m.as_str().to_ascii_lowercase());

        if minute.is_none() && meridiem.is_none() && trimmed != caps.get(1)?.as_str() {
            return None;
        }
        let minute: u32 = minute.map_or(Some(0), |m| m.parse().ok())?;
        let hour = match meridiem.as_deref() {
            Some(m) if (1..=12).contains(&hour) => match (m, hour) {
                ("a", 12) => 0,
                ("a", h) => h,
                ("p", 12) => 12,
                (_, h) => h + 12,
            },
            Some(_) => return None,
            None => hour,
        };
        NaiveTime::from_hms_opt(hour, minute, 0).map(|t| t.format("%H:%M").to_string())
    })
}

/// First positive whole number in the text, as a digit string.
pub fn coerce_count(raw: &str) -> Option<String> {
    RE_DIGITS
        .find_iter(raw)
        .filter_map(|m| m.as_str().parse::<u32>().ok())
        .find(|n| *n > 0)
        .map(|n| n.to_string())
}
