// ABOUTME: ISO 8601 duration rendering for structured recipe timings.
// ABOUTME: Turns values like "PT1H30M" into the display form "1 h 30 min".

use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DURATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:[.,]\d+)?S)?)?$")
        .expect("valid duration regex")
});

/// Components of an ISO 8601 duration, limited to days and below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationParts {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

/// Parses an ISO 8601 duration such as `PT15M`, `PT1H30M` or `P0DT0H20M`.
///
/// Returns `None` for anything else, including the bare `P` / `PT` forms.
pub fn parse_iso_duration(s: &str) -> Option<DurationParts> {
    let caps = ISO_DURATION_RE.captures(s.trim())?;
    if (1..=4).all(|i| caps.get(i).is_none()) {
        return None;
    }
    let field = |i: usize| -> Option<u32> {
        match caps.get(i) {
            Some(m) => m.as_str().parse().ok(),
            None => Some(0),
        }
    };
    Some(DurationParts {
        days: field(1)?,
        hours: field(2)?,
        minutes: field(3)?,
        seconds: field(4)?,
    })
}

impl DurationParts {
    /// Renders the non-zero components, e.g. `1 h 30 min`.
    ///
    /// An all-zero duration renders as `0 min`.
    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.days > 0 {
            parts.push(format!("{} j", self.days));
        }
        if self.hours > 0 {
            parts.push(format!("{} h", self.hours));
        }
        if self.minutes > 0 {
            parts.push(format!("{} min", self.minutes));
        }
        if self.seconds > 0 {
            parts.push(format!("{} s", self.seconds));
        }
        if parts.is_empty() {
            return "0 min".to_string();
        }
        parts.join(" ")
    }
}

/// Renders an ISO 8601 duration for display, or returns the trimmed input
/// unchanged when it is free text such as "15 minutes".
pub fn humanize_duration(s: &str) -> String {
    match parse_iso_duration(s) {
        Some(parts) => parts.display(),
        None => s.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minutes_only() {
        assert_eq!(humanize_duration("PT15M"), "15 min");
    }

    #[test]
    fn test_hours_and_minutes() {
        assert_eq!(humanize_duration("PT1H30M"), "1 h 30 min");
        assert_eq!(humanize_duration("pt2h"), "2 h");
    }

    #[test]
    fn test_day_designator_with_zeroes() {
        assert_eq!(humanize_duration("P0DT0H20M"), "20 min");
        assert_eq!(humanize_duration("P1DT2H"), "1 j 2 h");
    }

    #[test]
    fn test_seconds_and_zero() {
        assert_eq!(humanize_duration("PT45S"), "45 s");
        assert_eq!(humanize_duration("PT0M"), "0 min");
    }

    #[test]
    fn test_free_text_passes_through() {
        assert_eq!(humanize_duration("  15 minutes "), "15 minutes");
        assert_eq!(humanize_duration("PT"), "PT");
        assert_eq!(humanize_duration("P"), "P");
    }

    #[test]
    fn test_parse_parts() {
        assert_eq!(
            parse_iso_duration("PT1H5M"),
            Some(DurationParts {
                hours: 1,
                minutes: 5,
                ..Default::default()
            })
        );
        assert!(parse_iso_duration("1h30").is_none());
    }
}
