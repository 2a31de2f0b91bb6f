//! Reusable format rules attached to fields of the built-in post types.
//!
//! Every rule receives a non-blank value; blank optional fields are filtered
//! out before a rule is consulted.

use time::{Date, Time, format_description::FormatItem, macros::format_description};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");
const TIME_FORMAT: &[FormatItem<'static>] = format_description!("[hour]:[minute]");

const MIN_PHONE_DIGITS: usize = 8;
const MAX_PHONE_DIGITS: usize = 15;

pub fn email(value: &str) -> Option<String> {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split('.')
                    .filter(|label| !label.is_empty())
                    .count()
                    >= 2
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !value.chars().any(char::is_whitespace)
        }
        None => false,
    };
    (!valid).then(|| "Please enter a valid email address".to_string())
}

/// Digits with optional `+` prefix and `-`, space or parenthesis separators.
pub fn phone(value: &str) -> Option<String> {
    let value = value.trim();
    let body = value.strip_prefix('+').unwrap_or(value);
    let allowed = body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '-' | ' ' | '(' | ')'));
    let digits = body.chars().filter(char::is_ascii_digit).count();
    let valid = allowed && (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits);
    (!valid).then(|| "Please enter a valid phone number".to_string())
}

pub fn non_negative_integer(value: &str) -> Option<String> {
    match value.trim().parse::<u32>() {
        Ok(_) => None,
        Err(_) => Some("Please enter a whole number of zero or more".to_string()),
    }
}

pub fn calendar_date(value: &str) -> Option<String> {
    Date::parse(value.trim(), DATE_FORMAT)
        .err()
        .map(|_| "Please enter a date as YYYY-MM-DD".to_string())
}

pub fn clock_time(value: &str) -> Option<String> {
    Time::parse(value.trim(), TIME_FORMAT)
        .err()
        .map(|_| "Please enter a time as HH:MM".to_string())
}
