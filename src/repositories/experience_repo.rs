//! Experience repository for async database operations.
//!
//! Every read goes through [`scoped`], which applies one of the three
//! soft-delete views as a SQL predicate.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff_diesel::ToDiesel;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{AuditFields, DateRange, DeleteMode, Experience, NewExperience, Visibility};
use crate::repositories::ExperienceRepository;
use crate::schema::experiences;

#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = experiences)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct ExperienceRow {
    id: i32,
    uuid: String,
    user_id: i32,
    job_title: String,
    description: String,
    company_name: String,
    started_month: i16,
    started_year: i16,
    ended_month: Option<i16>,
    ended_year: Option<i16>,
    is_still_in_role: bool,
    created_at: jiff_diesel::Timestamp,
    created_user_id: i32,
    updated_at: Option<jiff_diesel::Timestamp>,
    updated_user_id: Option<i32>,
    deleted_at: Option<jiff_diesel::Timestamp>,
    deleted_user_id: Option<i32>,
}

impl From<ExperienceRow> for Experience {
    fn from(row: ExperienceRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            job_title: row.job_title,
            description: row.description,
            company_name: row.company_name,
            dates: DateRange {
                started_month: row.started_month,
                started_year: row.started_year,
                ended_month: row.ended_month,
                ended_year: row.ended_year,
                is_still_in_role: row.is_still_in_role,
            },
            audit: AuditFields {
                uuid: row.uuid,
                created_at: row.created_at.to_jiff(),
                created_user_id: row.created_user_id,
                updated_at: row.updated_at.map(|t| t.to_jiff()),
                updated_user_id: row.updated_user_id,
                deleted_at: row.deleted_at.map(|t| t.to_jiff()),
                deleted_user_id: row.deleted_user_id,
            },
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = experiences)]
struct NewExperienceRow {
    uuid: String,
    user_id: i32,
    job_title: String,
    description: String,
    company_name: String,
    started_month: i16,
    started_year: i16,
    ended_month: Option<i16>,
    ended_year: Option<i16>,
    is_still_in_role: bool,
    created_at: jiff_diesel::Timestamp,
    created_user_id: i32,
}

impl From<NewExperience> for NewExperienceRow {
    fn from(new: NewExperience) -> Self {
        let NewExperience {
            user_id,
            draft,
            mut audit,
        } = new;
        audit.ensure_uuid(<Experience as crate::models::Audited>::ENTITY);

        Self {
            uuid: audit.uuid,
            user_id,
            job_title: draft.job_title,
            description: draft.description,
            company_name: draft.company_name,
            started_month: draft.dates.started_month,
            started_year: draft.dates.started_year,
            ended_month: draft.dates.ended_month,
            ended_year: draft.dates.ended_year,
            is_still_in_role: draft.dates.is_still_in_role,
            created_at: audit.created_at.to_diesel(),
            created_user_id: audit.created_user_id,
        }
    }
}

/// Writable columns plus the update stamp. `None` writes NULL so a cleared
/// end date is persisted.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = experiences)]
#[diesel(treat_none_as_null = true)]
struct ExperienceChangeset<'a> {
    job_title: &'a str,
    description: &'a str,
    company_name: &'a str,
    started_month: i16,
    started_year: i16,
    ended_month: Option<i16>,
    ended_year: Option<i16>,
    is_still_in_role: bool,
    updated_at: Option<jiff_diesel::Timestamp>,
    updated_user_id: Option<i32>,
}

/// Starts a boxed query restricted to the requested soft-delete view.
fn scoped(visibility: Visibility) -> experiences::BoxedQuery<'static, Pg> {
    let query = experiences::table.into_boxed();
    match visibility {
        Visibility::Active => query.filter(
            experiences::deleted_at
                .is_null()
                .and(experiences::deleted_user_id.is_null()),
        ),
        Visibility::DeletedOnly => query.filter(
            experiences::deleted_at
                .is_not_null()
                .and(experiences::deleted_user_id.is_not_null()),
        ),
        Visibility::All => query,
    }
}

#[derive(Clone)]
pub struct PgExperienceRepository {
    pool: AsyncDbPool,
}

impl PgExperienceRepository {
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExperienceRepository for PgExperienceRepository {
    async fn create(&self, new_experience: NewExperience) -> AppResult<Experience> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(experiences::table)
            .values(NewExperienceRow::from(new_experience))
            .returning(ExperienceRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(Experience::from)
            .map_err(AppError::from)
    }

    async fn find_by_uuid(
        &self,
        experience_uuid: &str,
        visibility: Visibility,
    ) -> AppResult<Option<Experience>> {
        let mut conn = self.pool.get().await?;

        scoped(visibility)
            .filter(experiences::uuid.eq(experience_uuid.to_string()))
            .select(ExperienceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Experience::from))
            .map_err(AppError::from)
    }

    async fn list_paginated(
        &self,
        visibility: Visibility,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Experience>, i64)> {
        let mut conn = self.pool.get().await?;

        let total: i64 = scoped(visibility).count().get_result(&mut conn).await?;

        let rows = scoped(visibility)
            .order((experiences::created_at.desc(), experiences::id.desc()))
            .offset(offset)
            .limit(limit)
            .select(ExperienceRow::as_select())
            .load(&mut conn)
            .await?;

        Ok((rows.into_iter().map(Experience::from).collect(), total))
    }

    async fn update(&self, experience: &Experience) -> AppResult<Experience> {
        let mut conn = self.pool.get().await?;

        let changes = ExperienceChangeset {
            job_title: &experience.job_title,
            description: &experience.description,
            company_name: &experience.company_name,
            started_month: experience.dates.started_month,
            started_year: experience.dates.started_year,
            ended_month: experience.dates.ended_month,
            ended_year: experience.dates.ended_year,
            is_still_in_role: experience.dates.is_still_in_role,
            updated_at: experience.audit.updated_at.map(|t| t.to_diesel()),
            updated_user_id: experience.audit.updated_user_id,
        };

        diesel::update(experiences::table.filter(experiences::id.eq(experience.id)))
            .set(&changes)
            .returning(ExperienceRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(Experience::from)
            .map_err(AppError::from)
    }

    async fn delete(&self, experience_uuid: &str, actor: i32, mode: DeleteMode) -> AppResult<bool> {
        let mut conn = self.pool.get().await?;

        let affected = match mode {
            DeleteMode::Soft => {
                diesel::update(
                    experiences::table
                        .filter(experiences::uuid.eq(experience_uuid))
                        .filter(experiences::deleted_at.is_null()),
                )
                .set((
                    experiences::deleted_at.eq(Some(jiff::Timestamp::now().to_diesel())),
                    experiences::deleted_user_id.eq(Some(actor)),
                ))
                .execute(&mut conn)
                .await?
            }
            DeleteMode::Hard => {
                diesel::delete(experiences::table.filter(experiences::uuid.eq(experience_uuid)))
                    .execute(&mut conn)
                    .await?
            }
        };

        Ok(affected > 0)
    }

    async fn restore(&self, experience_uuid: &str) -> AppResult<Option<Experience>> {
        let mut conn = self.pool.get().await?;

        diesel::update(experiences::table.filter(experiences::uuid.eq(experience_uuid)))
            .set((
                experiences::deleted_at.eq(None::<jiff_diesel::Timestamp>),
                experiences::deleted_user_id.eq(None::<i32>),
            ))
            .returning(ExperienceRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map(|row| row.map(Experience::from))
            .map_err(AppError::from)
    }
}
