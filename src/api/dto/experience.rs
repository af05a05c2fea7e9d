//! Experience DTOs: one writable shape for create/update, one readable.
//!
//! The numeric fields and the flag are read as [`Submitted`] values, so a
//! wrong type becomes a field error listed next to the date-range errors.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::{AppError, AppResult};
use crate::models::{DateRange, Experience, ExperienceDraft, ExperiencePatch};
use crate::services::experience::date_range::{EndInput, KnownDates, known_violations, year_error};
use crate::services::experience::working_period::{format_working_period, today};
use crate::utils::validate::{CheckedInput, Submitted, field_error};

const INVALID_INTEGER: &str = "A valid integer is required.";
const INVALID_BOOLEAN: &str = "Must be a valid boolean.";
const MONTH_RANGE: &str = "Ensure this value is between 1 and 12.";

type NumberCheck = fn(Submitted<i64>) -> Result<i16, ValidationError>;

fn month(value: Submitted<i64>) -> Result<i16, ValidationError> {
    let month = value
        .valid()
        .ok_or_else(|| field_error("invalid", INVALID_INTEGER))?;
    i16::try_from(month)
        .ok()
        .filter(|m| (1..=12).contains(m))
        .ok_or_else(|| field_error("range", MONTH_RANGE))
}

fn year(value: Submitted<i64>) -> Result<i16, ValidationError> {
    let year = value
        .valid()
        .ok_or_else(|| field_error("invalid", INVALID_INTEGER))?;
    if let Some(message) = year_error(year) {
        return Err(field_error("invalid_year", message));
    }
    i16::try_from(year).map_err(|e| field_error("invalid_year", e.to_string()))
}

fn end_input(value: Option<Option<Submitted<i64>>>, check: NumberCheck) -> EndInput {
    match value {
        None => EndInput::Missing,
        Some(None) => EndInput::Null,
        Some(Some(value)) => check(value).map_or(EndInput::Invalid, EndInput::Value),
    }
}

fn unchecked(error: ValidationError) -> AppError {
    AppError::BadRequest {
        message: format!("Unchecked experience payload: {}", error),
    }
}

/// Distinguishes an absent key (`None`) from an explicit `null` (`Some(None)`).
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Writable shape of an experience.
///
/// `ended_month` and `ended_year` must be sent on a full write but may be
/// `null`.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct ExperienceWrite {
    #[validate(length(
        min = 1,
        max = 100,
        message = "Ensure this field has between 1 and 100 characters."
    ))]
    #[schema(example = "Backend Engineer")]
    pub job_title: Option<String>,
    pub description: Option<String>,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Ensure this field has between 1 and 255 characters."
    ))]
    #[schema(example = "Acme")]
    pub company_name: Option<String>,
    #[schema(value_type = Option<i16>, minimum = 1, maximum = 12)]
    pub started_month: Option<Submitted<i64>>,
    #[schema(value_type = Option<i16>, example = 2019)]
    pub started_year: Option<Submitted<i64>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i16>, minimum = 1, maximum = 12)]
    pub ended_month: Option<Option<Submitted<i64>>>,
    #[serde(default, deserialize_with = "nullable")]
    #[schema(value_type = Option<i16>)]
    pub ended_year: Option<Option<Submitted<i64>>>,
    #[schema(value_type = Option<bool>)]
    pub is_still_in_role: Option<Submitted<bool>>,
}

impl ExperienceWrite {
    fn known_dates(&self) -> KnownDates {
        KnownDates {
            started_month: self.started_month.and_then(|v| month(v).ok()),
            started_year: self.started_year.and_then(|v| year(v).ok()),
            ended_month: end_input(self.ended_month, month),
            ended_year: end_input(self.ended_year, year),
            is_still_in_role: self.is_still_in_role.and_then(Submitted::valid),
        }
    }

    fn dates(&self) -> Option<DateRange> {
        let known = self.known_dates();
        Some(DateRange {
            started_month: known.started_month?,
            started_year: known.started_year?,
            ended_month: known.ended_month.resolved()?,
            ended_year: known.ended_year.resolved()?,
            is_still_in_role: known.is_still_in_role?,
        })
    }

    /// Converts a payload that passed a full check into a draft.
    pub fn into_draft(self) -> AppResult<ExperienceDraft> {
        let dates = self.dates();
        match (self.job_title, self.company_name, dates) {
            (Some(job_title), Some(company_name), Some(dates)) => Ok(ExperienceDraft {
                job_title,
                description: self.description.unwrap_or_default(),
                company_name,
                dates,
            }),
            _ => Err(AppError::BadRequest {
                message: "Incomplete experience payload".to_string(),
            }),
        }
    }

    /// Converts a payload that passed a partial check into a patch.
    pub fn into_patch(self) -> AppResult<ExperiencePatch> {
        let end = |value: Option<Option<Submitted<i64>>>, check: NumberCheck| {
            value
                .map(|inner| inner.map(check).transpose())
                .transpose()
                .map_err(unchecked)
        };
        Ok(ExperiencePatch {
            started_month: self.started_month.map(month).transpose().map_err(unchecked)?,
            started_year: self.started_year.map(year).transpose().map_err(unchecked)?,
            ended_month: end(self.ended_month, month)?,
            ended_year: end(self.ended_year, year)?,
            is_still_in_role: self
                .is_still_in_role
                .map(|flag| flag.valid().ok_or_else(|| field_error("invalid", INVALID_BOOLEAN)))
                .transpose()
                .map_err(unchecked)?,
            job_title: self.job_title,
            description: self.description,
            company_name: self.company_name,
        })
    }
}

impl CheckedInput for ExperienceWrite {
    fn missing_fields(&self) -> Vec<&'static str> {
        let present = [
            ("job_title", self.job_title.is_some()),
            ("company_name", self.company_name.is_some()),
            ("started_month", self.started_month.is_some()),
            ("started_year", self.started_year.is_some()),
            ("ended_month", self.ended_month.is_some()),
            ("ended_year", self.ended_year.is_some()),
            ("is_still_in_role", self.is_still_in_role.is_some()),
        ];
        present
            .into_iter()
            .filter(|(_, is_present)| !is_present)
            .map(|(field, _)| field)
            .collect()
    }

    fn field_errors(&self) -> Vec<(&'static str, ValidationError)> {
        let numbers: [(&'static str, Option<Submitted<i64>>, NumberCheck); 4] = [
            ("started_month", self.started_month, month),
            ("started_year", self.started_year, year),
            ("ended_month", self.ended_month.flatten(), month),
            ("ended_year", self.ended_year.flatten(), year),
        ];
        let mut errors: Vec<_> = numbers
            .into_iter()
            .filter_map(|(field, value, check)| Some((field, check(value?).err()?)))
            .collect();

        if self.is_still_in_role == Some(Submitted::Invalid) {
            errors.push(("is_still_in_role", field_error("invalid", INVALID_BOOLEAN)));
        }
        errors
    }

    fn object_errors(&self) -> Vec<String> {
        known_violations(&self.known_dates())
            .into_iter()
            .map(String::from)
            .collect()
    }
}

/// Readable shape of an experience.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExperienceReadable {
    #[schema(example = "EXPERIENCE-0f8fad5b-d9cb-469f-a165-70867728950e")]
    pub uuid: String,
    pub job_title: String,
    pub description: String,
    pub company_name: String,
    #[schema(example = "Sep 2019 - Dec 2019 (4 months)")]
    pub working_period: String,
}

impl From<&Experience> for ExperienceReadable {
    fn from(experience: &Experience) -> Self {
        Self {
            uuid: experience.audit.uuid.clone(),
            job_title: experience.job_title.clone(),
            description: experience.description.clone(),
            company_name: experience.company_name.clone(),
            working_period: format_working_period(&experience.dates, today()),
        }
    }
}
