//! Field validators shared by the forms, and [`FormErrors`], which collects
//! their messages per field.

use std::ops::RangeInclusive;

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

/// Field-level validation messages, in the order they were found.
#[derive(Debug, Default, Clone)]
pub struct FormErrors(IndexMap<&'static str, String>);

impl FormErrors {
    /// Key used for errors which span more than one field.
    pub const GENERAL: &'static str = "__general";

    pub fn new() -> Self {
        Self::default()
    }

    /// Records `msg` against `field`. The first message for a field wins.
    pub fn add(&mut self, field: &'static str, msg: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| msg.into());
    }

    pub fn check(
        &mut self,
        field: &'static str,
        result: Result<(), String>,
    ) {
        if let Err(e) = result {
            self.add(field, e);
        }
    }

    /// Unwraps a parsed value, recording the error (if any) against `field`.
    pub fn take<T>(
        &mut self,
        field: &'static str,
        result: Result<T, String>,
    ) -> Option<T> {
        match result {
            Ok(t) => Some(t),
            Err(e) => {
                self.add(field, e);
                None
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

pub fn is_ascii_no_spaces(username: &str) -> Result<(), String> {
    match username.chars().all(|c| c.is_ascii() && !c.is_whitespace()) {
        true => Ok(()),
        false => Err("should be an ascii string without spaces".to_string()),
    }
}

pub fn is_valid_email(string: &str) -> Result<(), String> {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
        r#"(?:[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*|"(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21\x23-\x5b\x5d-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])*")@(?:(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?|\[(?:(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(?:25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?|[a-z0-9-]*[a-z0-9]:(?:[\x01-\x08\x0b\x0c\x0e-\x1f\x21-\x5a\x53-\x7f]|\\[\x01-\x09\x0b\x0c\x0e-\x7f])+)\])"#
    ).unwrap()
    });
    match RE.is_match(string) {
        true => Ok(()),
        false => Err("invalid email".to_string()),
    }
}

pub fn is_valid_hex_color(string: &str) -> Result<(), String> {
    static RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap());
    match RE.is_match(string) {
        true => Ok(()),
        false => Err("colours must look like #1a2b3c".to_string()),
    }
}

pub fn is_valid_uuid(string: &str) -> Result<(), String> {
    Uuid::parse_str(string)
        .map(|_| ())
        .map_err(|_| "not a valid identifier".to_string())
}

pub fn is_valid_http_url(string: &str) -> Result<(), String> {
    match url::Url::parse(string) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        Ok(_) => Err("only http and https links are allowed".to_string()),
        Err(_) => Err("not a valid URL".to_string()),
    }
}

/// Length in characters (not bytes).
pub fn has_length(
    string: &str,
    range: RangeInclusive<usize>,
) -> Result<(), String> {
    let n = string.chars().count();
    match range.contains(&n) {
        true => Ok(()),
        false => Err(format!(
            "must be between {} and {} characters long",
            range.start(),
            range.end()
        )),
    }
}

pub fn parse_int_in(
    string: &str,
    range: RangeInclusive<i64>,
) -> Result<i64, String> {
    let n = string
        .trim()
        .parse::<i64>()
        .map_err(|_| "must be a whole number".to_string())?;
    match range.contains(&n) {
        true => Ok(n),
        false => Err(format!(
            "must be between {} and {}",
            range.start(),
            range.end()
        )),
    }
}

pub fn parse_level(string: &str) -> Result<i64, String> {
    parse_int_in(string, 1..=5)
}

/// Largest goal or penalty count a result may carry. Standings sum these, so
/// they must stay far from `i64` overflow.
pub const MAX_COUNT: i64 = 99;

/// Goal counts and the like.
pub fn parse_count(string: &str) -> Result<i64, String> {
    let n = string
        .trim()
        .parse::<i64>()
        .map_err(|_| "must be a whole number".to_string())?;
    match n {
        n if n < 0 => Err("cannot be negative".to_string()),
        n if n > MAX_COUNT => Err(format!("cannot be more than {MAX_COUNT}")),
        n => Ok(n),
    }
}

pub fn parse_date(string: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(string.trim(), "%Y-%m-%d")
        .map_err(|_| "must be a date (YYYY-MM-DD)".to_string())
}

/// The format submitted by `datetime-local` inputs.
pub const DATETIME_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

pub fn parse_datetime(string: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(string.trim(), DATETIME_INPUT_FORMAT)
        .map_err(|_| "must be a date and time (YYYY-MM-DDTHH:MM)".to_string())
}

/// Treats blank form fields as absent.
pub fn non_empty(string: &str) -> Option<&str> {
    let trimmed = string.trim();
    match trimmed.is_empty() {
        true => None,
        false => Some(trimmed),
    }
}

pub fn parse_optional<T>(
    string: &str,
    parse: impl Fn(&str) -> Result<T, String>,
) -> Result<Option<T>, String> {
    non_empty(string).map(parse).transpose()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email() {
        assert!(is_valid_email("hello@example.com").is_ok());
        assert!(is_valid_email("hello").is_err());
    }

    #[test]
    fn test_colors() {
        assert!(is_valid_hex_color("#00ff7A").is_ok());
        assert!(is_valid_hex_color("00ff7a").is_err());
        assert!(is_valid_hex_color("#00ff7").is_err());
        assert!(is_valid_hex_color("#00ff7ag").is_err());
    }

    #[test]
    fn test_urls() {
        assert!(is_valid_http_url("https://example.com/logo.png").is_ok());
        assert!(is_valid_http_url("ftp://example.com/logo.png").is_err());
        assert!(is_valid_http_url("logo.png").is_err());
    }

    #[test]
    fn test_counts() {
        assert_eq!(parse_count("3"), Ok(3));
        assert_eq!(parse_count(" 0 "), Ok(0));
        assert_eq!(parse_count("-1"), Err("cannot be negative".to_string()));
        assert!(parse_count("2.5").is_err());
    }

    #[test]
    fn test_counts_are_bounded() {
        assert_eq!(parse_count("99"), Ok(99));
        assert_eq!(
            parse_count("100"),
            Err("cannot be more than 99".to_string())
        );
        assert!(parse_count("9223372036854775807").is_err());
    }

    #[test]
    fn test_datetimes() {
        let kickoff = parse_datetime("2026-03-07T19:30").unwrap();
        assert_eq!(kickoff.format(DATETIME_INPUT_FORMAT).to_string(), "2026-03-07T19:30");
        assert!(parse_datetime("2026-03-07").is_err());
    }

    #[test]
    fn test_optional_fields() {
        assert_eq!(parse_optional("  ", parse_level), Ok(None));
        assert_eq!(parse_optional("4", parse_level), Ok(Some(4)));
        assert!(parse_optional("6", parse_level).is_err());
    }

    #[test]
    fn first_error_for_a_field_wins() {
        let mut errors = FormErrors::new();
        errors.add("name", "too short");
        errors.add("name", "too long");
        errors.check("level", parse_level("0").map(|_| ()));
        assert_eq!(errors.get("name"), Some("too short"));
        assert!(errors.contains("level"));
        assert_eq!(errors.iter().count(), 2);
    }
}
