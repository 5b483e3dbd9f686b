// Unit tests for tick range policies and tooltip parsing

use super::*;
use pretty_assertions::assert_eq;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ticks(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

#[test]
fn test_tooltip_parse_strips_separators() {
    let details = TooltipDetails::parse(" 2025-06-01 ", "1,234,567", " react ").unwrap();
    assert_eq!(
        details,
        TooltipDetails {
            date: "2025-06-01".to_string(),
            package_name: "react".to_string(),
            downloads: 1_234_567,
        }
    );
    assert!(details.has_valid_date());
}

#[test]
fn test_tooltip_parse_rejects_bad_parts() {
    assert_eq!(
        TooltipDetails::parse("2025-06-01", "10", "   "),
        Err(TooltipError::EmptyPackageName)
    );
    assert_eq!(
        TooltipDetails::parse("2025-06-01", "lots", "react"),
        Err(TooltipError::InvalidDownloads("lots".to_string()))
    );
    assert_eq!(
        TooltipDetails::parse("2025-06-01", "-5", "react"),
        Err(TooltipError::InvalidDownloads("-5".to_string()))
    );
    assert!(matches!(
        TooltipDetails::parse("", "10", "react"),
        Err(TooltipError::MissingData { .. })
    ));
}

#[test]
fn test_tooltip_zero_downloads_is_missing_data() {
    let err = TooltipDetails::parse("2025-06-01", "0", "tiny-package").unwrap_err();
    assert_eq!(
        err,
        TooltipError::MissingData {
            date: "2025-06-01".to_string(),
            downloads: 0
        }
    );
    assert!(err.to_string().contains("missing required data"));
}

#[test]
fn test_tooltip_keeps_unvalidated_date_text() {
    // Format is checked separately so the raw label is still reported
    let details = TooltipDetails::parse("Jun 1, 2025", "12", "vue").unwrap();
    assert_eq!(details.date, "Jun 1, 2025");
    assert!(!details.has_valid_date());
}

#[test]
fn test_date_format() {
    assert!(is_valid_date_format("2025-06-15"));
    assert!(is_valid_date_format("2024-02-29"));
    assert!(!is_valid_date_format("2025-02-30"));
    assert!(!is_valid_date_format("2025-6-15"));
    assert!(!is_valid_date_format("15-06-2025"));
    assert!(!is_valid_date_format("2025-06-15T00:00"));
    assert!(!is_valid_date_format(""));
}

#[test]
fn test_parse_date() {
    assert_eq!(parse_date("2025-01-31").unwrap(), day(2025, 1, 31));
    assert!(parse_date("2025-13-01").is_err());
    assert!(parse_date("yesterday").is_err());
}

#[test]
fn test_tick_components() {
    assert_eq!(tick_year("2025-06-15"), Some(2025));
    assert_eq!(tick_month("2025-06-15"), Some(6));
    assert_eq!(tick_month("2025-06"), Some(6));
    assert_eq!(tick_year("Jun"), None);
    assert_eq!(tick_month("2025"), None);
    assert_eq!(tick_month("2025-13-01"), None);
}

#[test]
fn test_wrap_month() {
    assert_eq!(wrap_month(0), 12);
    assert_eq!(wrap_month(-5), 7);
    assert_eq!(wrap_month(13), 1);
    assert_eq!(wrap_month(6), 6);
}

#[test]
fn test_one_year_range() {
    let today = day(2025, 6, 15);
    let good = ticks(&["2024-07-01", "2024-10-01", "2025-01-01", "2025-04-01", "2025-06-01"]);
    assert!(dates_in_year_range(&good, YearSpan::OneYear, today));

    let check = check_year_range(&good, YearSpan::OneYear, today);
    assert_eq!(check.distinct, vec![2024, 2025]);
    assert_eq!(check.minimum, 2024);
    assert_eq!(check.newest, Some(2025));

    // Newest year must be the current year
    let stale = ticks(&["2023-07-01", "2024-06-01"]);
    assert!(!dates_in_year_range(&stale, YearSpan::OneYear, today));

    let too_old = ticks(&["2023-12-01", "2025-01-01"]);
    assert!(!dates_in_year_range(&too_old, YearSpan::OneYear, today));
}

#[test]
fn test_multi_year_tolerance_bands() {
    let today = day(2025, 6, 15);

    let two = ticks(&["2023-07-01", "2024-01-01", "2025-01-01"]);
    assert!(dates_in_year_range(&two, YearSpan::TwoYears, today));
    assert!(!dates_in_year_range(&two, YearSpan::OneYear, today));

    let six_distinct = ticks(&[
        "2020-07-01",
        "2021-01-01",
        "2022-01-01",
        "2023-01-01",
        "2024-01-01",
        "2025-01-01",
    ]);
    assert!(dates_in_year_range(&six_distinct, YearSpan::FiveYears, today));

    let four_distinct = ticks(&["2022-07-01", "2023-01-01", "2024-01-01", "2025-01-01"]);
    assert!(dates_in_year_range(&four_distinct, YearSpan::FiveYears, today));

    let mut seven_distinct = six_distinct.clone();
    seven_distinct.insert(0, "2019-12-01".to_string());
    assert!(!dates_in_year_range(&seven_distinct, YearSpan::FiveYears, today));
}

#[test]
fn test_empty_or_unreadable_ticks_fail() {
    let today = day(2025, 6, 15);
    assert!(!dates_in_year_range(&[], YearSpan::OneYear, today));
    assert!(!dates_in_month_range(&[], MonthSpan::OneMonth, today));

    let labels = ticks(&["Jun", "Jul", "Aug"]);
    assert!(!dates_in_month_range(&labels, MonthSpan::ThreeMonths, today));
}

#[test]
fn test_month_ranges_within_year() {
    let today = day(2025, 6, 15);

    let one = ticks(&["2025-05-16", "2025-05-26", "2025-06-05", "2025-06-15"]);
    assert!(dates_in_month_range(&one, MonthSpan::OneMonth, today));

    let three = ticks(&["2025-03-16", "2025-04-15", "2025-05-15", "2025-06-14"]);
    let check = check_month_range(&three, MonthSpan::ThreeMonths, today);
    assert_eq!(check.distinct, vec![3, 4, 5, 6]);
    assert_eq!(check.minimum, 3);
    assert!(check.in_range);

    // One month too many for the band
    let five = ticks(&["2025-02-16", "2025-03-16", "2025-04-15", "2025-05-15", "2025-06-14"]);
    assert!(!dates_in_month_range(&five, MonthSpan::ThreeMonths, today));

    let stale = ticks(&["2025-04-01", "2025-05-01"]);
    assert!(!dates_in_month_range(&stale, MonthSpan::OneMonth, today));
}

#[test]
fn test_month_range_across_new_year() {
    let today = day(2026, 1, 10);
    let one = ticks(&["2025-12-11", "2025-12-25", "2026-01-08"]);
    let check = check_month_range(&one, MonthSpan::OneMonth, today);
    assert_eq!(check.newest, Some(1));
    assert_eq!(check.minimum, 12);
    assert!(check.in_range);

    let six = ticks(&[
        "2025-07-15",
        "2025-08-15",
        "2025-09-15",
        "2025-10-15",
        "2025-11-15",
        "2025-12-15",
        "2026-01-09",
    ]);
    assert!(dates_in_month_range(&six, MonthSpan::SixMonths, today));
}

#[test]
fn test_wrapped_window_accepts_any_oldest_month() {
    // A 3 month window in March wraps to December, so the oldest month is not bounded
    let today = day(2025, 3, 10);
    let check = check_month_range(
        &ticks(&["2025-01-05", "2025-02-05", "2025-03-05"]),
        MonthSpan::ThreeMonths,
        today,
    );
    assert_eq!(check.minimum, 12);
    assert!(check.in_range);
}

#[test]
fn test_month_range_reads_newest_by_date_and_oldest_by_number() {
    let today = day(2026, 1, 10);

    // Newest is the latest tick, not the largest month number
    let unordered = ticks(&["2026-01-08", "2025-12-11"]);
    let check = check_month_range(&unordered, MonthSpan::OneMonth, today);
    assert_eq!(check.newest, Some(1));
    assert!(check.in_range);

    let stale = ticks(&["2025-12-11", "2025-12-25"]);
    let check = check_month_range(&stale, MonthSpan::OneMonth, today);
    assert_eq!(check.newest, Some(12));
    assert!(!check.in_range);

    // Oldest ignores the year
    let year_old = ticks(&["2024-05-20", "2025-06-10"]);
    assert!(dates_in_month_range(&year_old, MonthSpan::OneMonth, day(2025, 6, 15)));
}
