//! Cross-field rules for an experience's start/end dates.
//!
//! Every check runs; failures are collected in a fixed order so clients see
//! the same list for the same input.

use crate::error::{AppError, AppResult};
use crate::models::DateRange;

pub const START_YEAR_AFTER_END_YEAR: &str = "Start year cannot be later than end year.";
pub const END_MONTH_BEFORE_START_MONTH: &str =
    "Ended month cannot be earlier than started month.";
pub const STILL_IN_ROLE_WITH_END: &str =
    "If still in role, ended year and ended month must not be provided.";
pub const ENDED_WITHOUT_END: &str =
    "If not still in role, both ended year and ended month must be provided.";

/// An end field as submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndInput {
    /// Key absent from the payload.
    Missing,
    Null,
    /// Sent, but failed its own field check.
    Invalid,
    Value(i16),
}

impl EndInput {
    fn value(self) -> Option<i16> {
        match self {
            EndInput::Value(value) => Some(value),
            _ => None,
        }
    }

    /// Whether a non-null value was sent; unknown when the key is absent.
    fn provided(self) -> Option<bool> {
        match self {
            EndInput::Missing => None,
            EndInput::Null => Some(false),
            EndInput::Invalid | EndInput::Value(_) => Some(true),
        }
    }

    /// The stored form, once the field is known to be valid.
    pub fn resolved(self) -> Option<Option<i16>> {
        match self {
            EndInput::Null => Some(None),
            EndInput::Value(value) => Some(Some(value)),
            EndInput::Missing | EndInput::Invalid => None,
        }
    }
}

impl From<Option<i16>> for EndInput {
    fn from(value: Option<i16>) -> Self {
        value.map_or(EndInput::Null, EndInput::Value)
    }
}

/// The parts of a submitted range that passed their field checks.
/// `None` marks a start value or flag that is missing or invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownDates {
    pub started_month: Option<i16>,
    pub started_year: Option<i16>,
    pub ended_month: EndInput,
    pub ended_year: EndInput,
    pub is_still_in_role: Option<bool>,
}

impl From<&DateRange> for KnownDates {
    fn from(range: &DateRange) -> Self {
        Self {
            started_month: Some(range.started_month),
            started_year: Some(range.started_year),
            ended_month: range.ended_month.into(),
            ended_year: range.ended_year.into(),
            is_still_in_role: Some(range.is_still_in_role),
        }
    }
}

/// Runs each of the four checks whose inputs are known, in order.
pub fn known_violations(dates: &KnownDates) -> Vec<&'static str> {
    let mut errors = Vec::new();
    let ended_year = dates.ended_year.value();

    if let (Some(started_year), Some(ended_year)) = (dates.started_year, ended_year)
        && started_year > ended_year
    {
        errors.push(START_YEAR_AFTER_END_YEAR);
    }

    if let (Some(started_month), Some(ended_month)) =
        (dates.started_month, dates.ended_month.value())
        && dates.started_year.is_some()
        && dates.started_year == ended_year
        && started_month > ended_month
    {
        errors.push(END_MONTH_BEFORE_START_MONTH);
    }

    if let (Some(still), Some(month_sent), Some(year_sent)) = (
        dates.is_still_in_role,
        dates.ended_month.provided(),
        dates.ended_year.provided(),
    ) {
        if still && (month_sent || year_sent) {
            errors.push(STILL_IN_ROLE_WITH_END);
        }
        if !still && !(month_sent && year_sent) {
            errors.push(ENDED_WITHOUT_END);
        }
    }

    errors
}

/// Runs the four ordering/consistency checks and returns every failure.
pub fn violations(range: &DateRange) -> Vec<&'static str> {
    known_violations(&KnownDates::from(range))
}

/// Returns the range unchanged, or a `ValidationErrors` listing every
/// failed check.
pub fn validate_date_range(range: DateRange) -> AppResult<DateRange> {
    let errors = violations(&range);
    if errors.is_empty() {
        Ok(range)
    } else {
        Err(AppError::ValidationErrors {
            errors: errors.into_iter().map(String::from).collect(),
        })
    }
}

/// Message for a year outside 1000..=9999, or `None` when it is fine.
pub fn year_error(year: i64) -> Option<String> {
    if (1000..=9999).contains(&year) {
        None
    } else {
        Some(format!(
            "{} is not a valid year. It must be a 4-digit number.",
            year
        ))
    }
}
