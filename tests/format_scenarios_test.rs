//! Format-helper scenarios: interval cascading and money formatting.

use qvd::format::{IntervalValueFormatter, MoneyFormat};

#[test]
fn interval_cascades_days_and_hours_into_minutes_when_pattern_has_no_day_or_hour_token() {
    // 1 day, 2h, 30m -> 1590 minutes when the pattern only names mm:ss.
    let value_days = 1.0 + 2.0 / 24.0 + 30.0 / (24.0 * 60.0);
    assert_eq!(IntervalValueFormatter::format(value_days, "mm:ss"), "1590:00");
}

#[test]
fn money_format_with_custom_separators_and_trailing_symbol() {
    let fmt = MoneyFormat {
        decimal_separator: ',',
        thousand_separator: Some('.'),
        precision: 2,
        currency_symbol: "EUR".to_string(),
        symbol_precedes: false,
        symbol_space: true,
    };
    assert_eq!(fmt.format(1_234_567.5), "1.234.567,50 EUR");
    assert_eq!(fmt.get_qvd_format_string(), "#.##0,00 EUR;-#.##0,00 EUR");
}
