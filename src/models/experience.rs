use serde::Serialize;

use crate::models::audit::{AuditFields, Audited};

/// Start/end month-year pair of a job plus the "still in role" flag.
///
/// Months are 1-based. Years are plain calendar years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub started_month: i16,
    pub started_year: i16,
    pub ended_month: Option<i16>,
    pub ended_year: Option<i16>,
    pub is_still_in_role: bool,
}

/// A job-history entry owned by one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Experience {
    pub id: i32,
    pub user_id: i32,
    pub job_title: String,
    pub description: String,
    pub company_name: String,
    pub dates: DateRange,
    pub audit: AuditFields,
}

impl Audited for Experience {
    const ENTITY: &'static str = "Experience";

    fn audit(&self) -> &AuditFields {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditFields {
        &mut self.audit
    }
}

/// The client-writable part of an experience.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExperienceDraft {
    pub job_title: String,
    pub description: String,
    pub company_name: String,
    pub dates: DateRange,
}

/// A partial update. `None` leaves the stored value alone; for the optional
/// end fields `Some(None)` clears them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExperiencePatch {
    pub job_title: Option<String>,
    pub description: Option<String>,
    pub company_name: Option<String>,
    pub started_month: Option<i16>,
    pub started_year: Option<i16>,
    pub ended_month: Option<Option<i16>>,
    pub ended_year: Option<Option<i16>>,
    pub is_still_in_role: Option<bool>,
}

impl ExperiencePatch {
    /// Layers the patch over `base`.
    pub fn apply_to(self, base: ExperienceDraft) -> ExperienceDraft {
        ExperienceDraft {
            job_title: self.job_title.unwrap_or(base.job_title),
            description: self.description.unwrap_or(base.description),
            company_name: self.company_name.unwrap_or(base.company_name),
            dates: DateRange {
                started_month: self.started_month.unwrap_or(base.dates.started_month),
                started_year: self.started_year.unwrap_or(base.dates.started_year),
                ended_month: self.ended_month.unwrap_or(base.dates.ended_month),
                ended_year: self.ended_year.unwrap_or(base.dates.ended_year),
                is_still_in_role: self.is_still_in_role.unwrap_or(base.dates.is_still_in_role),
            },
        }
    }
}

/// Everything needed to insert a new experience row.
#[derive(Debug, Clone)]
pub struct NewExperience {
    pub user_id: i32,
    pub draft: ExperienceDraft,
    pub audit: AuditFields,
}

impl Experience {
    pub fn draft(&self) -> ExperienceDraft {
        ExperienceDraft {
            job_title: self.job_title.clone(),
            description: self.description.clone(),
            company_name: self.company_name.clone(),
            dates: self.dates,
        }
    }

    /// Overwrites the writable fields, leaving ownership and audit alone.
    pub fn apply(&mut self, draft: ExperienceDraft) {
        self.job_title = draft.job_title;
        self.description = draft.description;
        self.company_name = draft.company_name;
        self.dates = draft.dates;
    }
}
