use chrono::{DateTime, Utc};
use std::time::Duration;

/// Cut a string down for log output, marking the cut with an ellipsis.
pub fn truncate_for_log(mut s: String, max_len: usize) -> String {
    if s.len() > max_len {
        let mut cut = max_len;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        s.truncate(cut);
        s.push('…');
    }
    s
}

/// True when more than `ttl` has passed since `last_updated`.
pub fn is_expired(last_updated: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
    match chrono::Duration::from_std(ttl) {
        Ok(ttl) => now.signed_duration_since(last_updated) > ttl,
        // a ttl too large for chrono never expires
        Err(_) => false,
    }
}

/// Parse an hour count such as `12` or `12h`.
pub fn parse_hours(raw: &str) -> Option<u64> {
    raw.trim().trim_end_matches('h').parse::<u64>().ok()
}

pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate_for_log("short".to_string(), 10), "short");
        assert_eq!(truncate_for_log("abcdefgh".to_string(), 3), "abc…");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "ééé".to_string();
        assert_eq!(truncate_for_log(s, 3), "é…");
    }

    #[test]
    fn expiry_is_strictly_greater_than_ttl() {
        let now = Utc::now();
        let ttl = Duration::from_secs(3600);
        assert!(!is_expired(now - chrono::Duration::seconds(3600), ttl, now));
        assert!(is_expired(now - chrono::Duration::seconds(3601), ttl, now));
        assert!(!is_expired(now, ttl, now));
    }

    #[test]
    fn parse_hours_accepts_suffix() {
        assert_eq!(parse_hours("12h"), Some(12));
        assert_eq!(parse_hours(" 6 "), Some(6));
        assert_eq!(parse_hours("six"), None);
    }
}
