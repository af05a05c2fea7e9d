//! Renders an experience's date range as `"Sep 2019 - Dec 2019 (4 months)"`.

use jiff::civil::Date;

use crate::models::DateRange;

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_abbr(month: i16) -> &'static str {
    usize::try_from(month - 1)
        .ok()
        .and_then(|index| MONTH_ABBREVIATIONS.get(index))
        .copied()
        .unwrap_or("")
}

/// End month/year of the range, or `None` when the role is ongoing.
fn closed_end(range: &DateRange) -> Option<(i16, i16)> {
    if range.is_still_in_role {
        return None;
    }
    Some((range.ended_month?, range.ended_year?))
}

/// Months between start and end, both inclusive. An ongoing role ends at
/// `today`. Starts in the future count as zero.
pub fn total_months_worked(range: &DateRange, today: Date) -> i32 {
    let (end_month, end_year) = closed_end(range)
        .map(|(m, y)| (i32::from(m), i32::from(y)))
        .unwrap_or((i32::from(today.month()), i32::from(today.year())));

    let total = (end_year - i32::from(range.started_year)) * 12
        + (end_month - i32::from(range.started_month) + 1);
    total.max(0)
}

/// Splits a month count into whole years and the remaining months.
pub fn years_and_months(total_months: i32) -> (i32, i32) {
    (total_months.div_euclid(12), total_months.rem_euclid(12))
}

fn plural(count: i32, unit: &str) -> String {
    if count == 1 {
        format!("{} {}", count, unit)
    } else {
        format!("{} {}s", count, unit)
    }
}

/// The parenthesised duration, or an empty string for a zero duration.
pub fn duration_suffix(years: i32, months: i32) -> String {
    match (years > 0, months > 0) {
        (true, true) => format!(" ({} {})", plural(years, "year"), plural(months, "month")),
        (true, false) => format!(" ({})", plural(years, "year")),
        (false, true) => format!(" ({})", plural(months, "month")),
        (false, false) => String::new(),
    }
}

/// Formats the working period of `range` as seen on `today`.
///
/// A role that is not flagged as ongoing but lacks an end date is rendered
/// as ongoing.
pub fn format_working_period(range: &DateRange, today: Date) -> String {
    let start = format!("{} {}", month_abbr(range.started_month), range.started_year);
    let end = match closed_end(range) {
        Some((month, year)) => format!("{} {}", month_abbr(month), year),
        None => "Present".to_string(),
    };
    let (years, months) = years_and_months(total_months_worked(range, today));

    format!("{} - {}{}", start, end, duration_suffix(years, months))
}

/// Today's date in the system time zone.
pub fn today() -> Date {
    jiff::Zoned::now().date()
}
