use chrono::Weekday;

/// Rest used when a rest-time text carries no usable leading integer.
pub const DEFAULT_REST_SECONDS: u32 = 120;

pub const WEEKDAYS: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Normalises a free-text rest time to seconds for the countdown.
///
/// Takes the leading integer of the first word ("2-3 minutes" -> 2, "90 seconds" -> 90).
/// Units are ignored; the text stays the source of truth and this is only a hint.
/// Falls back to [`DEFAULT_REST_SECONDS`] when nothing parses or the value is zero.
pub fn parse_rest_seconds(text: &str) -> u32 {
    let first = text.split_whitespace().next().unwrap_or("");
    match leading_int(first) {
        Some(n) if n > 0 => n,
        _ => DEFAULT_REST_SECONDS,
    }
}

/// Leading run of ASCII digits as an integer.
pub fn leading_int(s: &str) -> Option<u32> {
    let digits: String = s
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Leading decimal number ("62.5kg" -> 62.5, "Bodyweight" -> None).
pub fn leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, c) in s.char_indices() {
        if c.is_ascii_digit() {
            end = i + 1;
        } else if c == '.' && !seen_dot {
            seen_dot = true;
        } else {
            break;
        }
    }
    if end == 0 {
        return None;
    }
    s[..end].parse().ok()
}

/// `m:ss`, minutes unbounded.
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

pub fn format_minutes(minutes: u32) -> String {
    let hours = minutes / 60;
    let minutes = minutes % 60;

    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}

/// Printable width of a string that may carry ANSI colour codes.
pub fn plain_len(s: &str) -> usize {
    let mut n = 0;
    let mut esc = false;
    for c in s.chars() {
        match (esc, c) {
            (true, 'm') => esc = false,
            (true, _) => {}
            (false, '\u{1b}') => esc = true,
            (false, _) => n += 1,
        }
    }
    n
}
