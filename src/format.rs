//! Display-string formatters (C2): date, time, timestamp, interval and
//! money values are stored as a calculation number plus a display string;
//! these formatters are how a writer derives that display string from a
//! pattern, and how callers can recompute it after editing a cell.
//!
//! Date/time/timestamp patterns are a small token language: `YYYY`, `YY`,
//! `MMMM`, `MMM`, `MM`, `DD`, `hh` (24h), `HH` (12h), `mm`, `ss`, `tt`
//! (AM/PM) and `ffffff`..`f` for fractional seconds (`ffffff` is the full
//! six-digit microsecond count; each `f` dropped from the right truncates
//! one more trailing digit). Tokens are matched longest-first so `MMMM` is
//! never seen as four `M`s.

use chrono::{Datelike, Duration, NaiveDate};

use crate::value::EPOCH_DAYS_FROM_CE;

/// Epoch for date/time/timestamp calculation values: day 0 is 1899-12-30.
fn epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap() + Duration::days(EPOCH_DAYS_FROM_CE as i64)
}

const DATE_TOKENS: &[&str] = &["YYYY", "MMMM", "MMM", "MM", "DD", "YY"];
const TIME_TOKENS: &[&str] = &[
    "hh", "HH", "mm", "ss", "tt", "ffffff", "fffff", "ffff", "fff", "ff", "f",
];

const MONTH_NAMES: &[&str] = &[
    "January", "February", "March", "April", "May", "June", "July", "August", "September",
    "October", "November", "December",
];

/// Formats a [`crate::QvdValue::Date`] calculation value (whole days since
/// the epoch) according to `pattern`.
pub struct DateValueFormatter;

impl DateValueFormatter {
    pub fn format(days: i32, pattern: &str) -> String {
        let date = epoch() + Duration::days(days as i64);
        substitute(pattern, DATE_TOKENS, |token| date_token(&date, token))
    }
}

/// Formats a [`crate::QvdValue::Time`] calculation value (fraction of a
/// day, `0.0..1.0`) according to `pattern`.
pub struct TimeValueFormatter;

impl TimeValueFormatter {
    pub fn format(fraction_of_day: f64, pattern: &str) -> String {
        let total_micros = (fraction_of_day.rem_euclid(1.0) * 86_400_000_000.0).round() as i64;
        substitute(pattern, TIME_TOKENS, |token| time_token(total_micros, token))
    }
}

/// Formats a [`crate::QvdValue::Timestamp`] calculation value (days since
/// the epoch, with a fractional part for the time of day) according to
/// `pattern`. Recognizes both date and time tokens.
pub struct TimestampValueFormatter;

impl TimestampValueFormatter {
    pub fn format(value: f64, pattern: &str) -> String {
        let days = value.floor() as i32;
        let frac = value - value.floor();
        let date = epoch() + Duration::days(days as i64);
        let total_micros = (frac * 86_400_000_000.0).round() as i64;
        let mut tokens: Vec<&str> = Vec::with_capacity(DATE_TOKENS.len() + TIME_TOKENS.len());
        tokens.extend_from_slice(DATE_TOKENS);
        tokens.extend_from_slice(TIME_TOKENS);
        substitute(pattern, &tokens, |token| {
            date_token(&date, token).or_else(|| time_token(total_micros, token))
        })
    }
}

/// Formats a [`crate::QvdValue::Interval`] calculation value (a signed
/// number of days) according to `pattern`.
///
/// The largest unit named in the pattern absorbs the value's full
/// magnitude; units below it cascade from what remains. A pattern with no
/// `D` token reports total hours (possibly over 24) in its `hh`/`HH` slot;
/// a pattern with neither `D` nor an hour token reports total minutes in
/// `mm`, and so on down to `ss` alone reporting total seconds.
pub struct IntervalValueFormatter;

impl IntervalValueFormatter {
    pub fn format(value_days: f64, pattern: &str) -> String {
        let negative = value_days < 0.0;
        let total_seconds = (value_days.abs() * 86_400.0).round() as i64;

        let has_days = pattern.contains('D');
        let has_hours = pattern.contains("hh") || pattern.contains("HH");
        let has_minutes = pattern.contains("mm");

        let (days, hours, minutes, seconds) = if has_days {
            (
                total_seconds / 86_400,
                (total_seconds % 86_400) / 3_600,
                (total_seconds % 3_600) / 60,
                total_seconds % 60,
            )
        } else if has_hours {
            (0, total_seconds / 3_600, (total_seconds % 3_600) / 60, total_seconds % 60)
        } else if has_minutes {
            (0, 0, total_seconds / 60, total_seconds % 60)
        } else {
            (0, 0, 0, total_seconds)
        };

        let tokens: &[&str] = &["D", "hh", "HH", "mm", "ss"];
        let body = substitute(pattern, tokens, |token| match token {
            "D" => Some(days.to_string()),
            "hh" | "HH" => Some(format!("{hours:02}")),
            "mm" => Some(format!("{minutes:02}")),
            "ss" => Some(format!("{seconds:02}")),
            _ => None,
        });

        if negative {
            format!("-{body}")
        } else {
            body
        }
    }
}

/// Formats a [`crate::QvdValue::Money`] calculation value with thousand and
/// decimal separators and an optional currency symbol.
#[derive(Debug, Clone)]
pub struct MoneyFormat {
    pub decimal_separator: char,
    pub thousand_separator: Option<char>,
    pub precision: usize,
    pub currency_symbol: String,
    pub symbol_precedes: bool,
    pub symbol_space: bool,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            thousand_separator: Some(','),
            precision: 2,
            currency_symbol: String::new(),
            symbol_precedes: true,
            symbol_space: false,
        }
    }
}

impl MoneyFormat {
    pub fn format(&self, value: f64) -> String {
        let negative = value.is_sign_negative() && value != 0.0;
        let number = self.format_magnitude(value.abs());
        let with_symbol = self.apply_symbol(number);
        if negative {
            format!("-{with_symbol}")
        } else {
            with_symbol
        }
    }

    fn format_magnitude(&self, magnitude: f64) -> String {
        let scaled = format!("{magnitude:.*}", self.precision);
        let (int_part, frac_part) = match scaled.split_once('.') {
            Some((i, f)) => (i, Some(f)),
            None => (scaled.as_str(), None),
        };
        let mut out = match self.thousand_separator {
            Some(sep) => group_thousands(int_part, sep),
            None => int_part.to_string(),
        };
        if let Some(f) = frac_part {
            out.push(self.decimal_separator);
            out.push_str(f);
        }
        out
    }

    fn apply_symbol(&self, number: String) -> String {
        if self.currency_symbol.is_empty() {
            return number;
        }
        let space = if self.symbol_space { " " } else { "" };
        if self.symbol_precedes {
            format!("{}{space}{number}", self.currency_symbol)
        } else {
            format!("{number}{space}{}", self.currency_symbol)
        }
    }

    /// The `Fmt` string QVD stores for this format: `positive;negative`,
    /// with the negative half re-using the same pattern under a leading
    /// minus sign.
    pub fn get_qvd_format_string(&self) -> String {
        let positive = self.apply_symbol(self.number_placeholder());
        format!("{positive};-{positive}")
    }

    fn number_placeholder(&self) -> String {
        let int_pattern = match self.thousand_separator {
            Some(sep) => format!("#{sep}##0"),
            None => "0".to_string(),
        };
        if self.precision == 0 {
            int_pattern
        } else {
            format!("{int_pattern}{}{}", self.decimal_separator, "0".repeat(self.precision))
        }
    }
}

fn group_thousands(digits: &str, sep: char) -> String {
    let bytes = digits.as_bytes();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in bytes.iter().enumerate() {
        let remaining = bytes.len() - i;
        if i > 0 && remaining.is_multiple_of(3) {
            out.push(sep);
        }
        out.push(*ch as char);
    }
    out
}

fn date_token(date: &NaiveDate, token: &str) -> Option<String> {
    match token {
        "YYYY" => Some(format!("{:04}", date.year())),
        "YY" => Some(format!("{:02}", date.year().rem_euclid(100))),
        "MMMM" => Some(MONTH_NAMES[date.month0() as usize].to_string()),
        "MMM" => Some(MONTH_NAMES[date.month0() as usize][..3].to_string()),
        "MM" => Some(format!("{:02}", date.month())),
        "DD" => Some(format!("{:02}", date.day())),
        _ => None,
    }
}

fn time_token(total_micros: i64, token: &str) -> Option<String> {
    let total_seconds = total_micros / 1_000_000;
    let hour24 = (total_seconds / 3_600) % 24;
    let micros_of_second = (total_micros % 1_000_000) as u32;
    match token {
        "hh" => Some(format!("{hour24:02}")),
        "HH" => {
            let hour12 = match hour24 % 12 {
                0 => 12,
                h => h,
            };
            Some(format!("{hour12:02}"))
        }
        "mm" => Some(format!("{:02}", (total_seconds % 3_600) / 60)),
        "ss" => Some(format!("{:02}", total_seconds % 60)),
        "tt" => Some(if hour24 < 12 { "AM".to_string() } else { "PM".to_string() }),
        "ffffff" | "fffff" | "ffff" | "fff" | "ff" | "f" => {
            let digits = format!("{micros_of_second:06}");
            Some(digits[..token.len()].to_string())
        }
        _ => None,
    }
}

/// Scans `pattern` left to right, replacing the longest matching token at
/// each position via `resolve`; any character that matches no token is
/// copied through unchanged.
fn substitute(pattern: &str, tokens: &[&str], resolve: impl Fn(&str) -> Option<String>) -> String {
    let mut sorted_tokens: Vec<&&str> = tokens.iter().collect();
    sorted_tokens.sort_by_key(|t| std::cmp::Reverse(t.len()));

    let mut out = String::with_capacity(pattern.len());
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    'outer: while i < chars.len() {
        for token in &sorted_tokens {
            let token_chars: Vec<char> = token.chars().collect();
            if chars[i..].starts_with(&token_chars[..]) {
                if let Some(resolved) = resolve(token) {
                    out.push_str(&resolved);
                    i += token_chars.len();
                    continue 'outer;
                }
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn date_format_basic() {
        // day 0 is 1899-12-30; 1 day later is 1899-12-31.
        assert_eq!(DateValueFormatter::format(1, "YYYY-MM-DD"), "1899-12-31");
    }

    #[test]
    fn time_format_basic() {
        // 0.5 of a day is noon.
        assert_eq!(TimeValueFormatter::format(0.5, "hh:mm:ss tt"), "12:00:00 PM");
    }

    #[test]
    fn timestamp_format_combines_date_and_time() {
        let value = 1.0 + 0.25; // 1899-12-31 06:00:00
        assert_eq!(
            TimestampValueFormatter::format(value, "YYYY-MM-DD hh:mm:ss"),
            "1899-12-31 06:00:00"
        );
    }

    #[test]
    fn hh_is_24_hour_and_hh_uppercase_is_12_hour() {
        // 0.75 of a day is 18:00.
        assert_eq!(TimeValueFormatter::format(0.75, "hh:mm"), "18:00");
        assert_eq!(TimeValueFormatter::format(0.75, "HH:mm tt"), "06:00 PM");
    }

    #[test]
    fn fractional_second_tokens_truncate_from_the_right() {
        // 0.5 days plus 123456 microseconds past noon.
        let fraction = 0.5 + 123_456.0 / 86_400_000_000.0;
        assert_eq!(TimeValueFormatter::format(fraction, "ss.ffffff"), "00.123456");
        assert_eq!(TimeValueFormatter::format(fraction, "ss.fffff"), "00.12345");
        assert_eq!(TimeValueFormatter::format(fraction, "ss.f"), "00.1");
    }

    #[test]
    fn interval_without_day_token_rolls_hours_past_24() {
        // 1.5 days -> 36 hours, with no D in the pattern.
        assert_eq!(IntervalValueFormatter::format(1.5, "hh:mm:ss"), "36:00:00");
    }

    #[test]
    fn interval_with_day_token_caps_hours_at_24() {
        assert_eq!(IntervalValueFormatter::format(1.5, "D hh:mm:ss"), "1 12:00:00");
    }

    #[test]
    fn interval_negative_value_keeps_sign() {
        assert_eq!(IntervalValueFormatter::format(-0.5, "hh:mm:ss"), "-12:00:00");
    }

    #[test]
    fn money_format_groups_thousands_and_places_symbol() {
        let fmt = MoneyFormat {
            currency_symbol: "$".to_string(),
            symbol_precedes: true,
            symbol_space: false,
            ..MoneyFormat::default()
        };
        assert_eq!(fmt.format(1234567.891), "$1,234,567.89");
        assert_eq!(fmt.format(-42.5), "-$42.50");
    }

    #[test]
    fn money_qvd_format_string_has_positive_and_negative_halves() {
        let fmt = MoneyFormat::default();
        assert_eq!(fmt.get_qvd_format_string(), "#,##0.00;-#,##0.00");
    }
}
