//! Experience service: validation, audit stamping and soft-delete handling.

pub mod date_range;
pub mod working_period;

use std::sync::Arc;

use jiff::Timestamp;

use crate::error::{AppError, AppResult};
use crate::models::{
    AuditFields, Audited, DeleteMode, Experience, ExperienceDraft, ExperiencePatch,
    NewExperience, Visibility,
};
use crate::repositories::ExperienceRepository;
use crate::services::Actor;

pub use date_range::validate_date_range;
pub use working_period::format_working_period;

const ENTITY_NAME: &str = "experience";

/// Experience service coordinating validation and the repository.
#[derive(Clone)]
pub struct ExperienceService {
    repo: Arc<dyn ExperienceRepository>,
}

impl ExperienceService {
    /// Creates a new ExperienceService with the given repository.
    pub fn new(repo: Arc<dyn ExperienceRepository>) -> Self {
        Self { repo }
    }

    /// Creates an experience owned by, and stamped with, the acting user.
    ///
    /// # Errors
    /// `ValidationErrors` when the date range is inconsistent.
    pub async fn create(&self, actor: Actor, draft: ExperienceDraft) -> AppResult<Experience> {
        validate_date_range(draft.dates)?;

        let experience = self
            .repo
            .create(NewExperience {
                user_id: actor.id,
                draft,
                audit: AuditFields::created(Experience::ENTITY, actor.id, Timestamp::now()),
            })
            .await?;

        tracing::info!(
            uuid = %experience.audit.uuid,
            actor = actor.id,
            "Experience created"
        );
        Ok(experience)
    }

    /// Gets a live experience by uuid.
    pub async fn get(&self, uuid: &str) -> AppResult<Experience> {
        self.find(uuid, Visibility::Active).await
    }

    /// Lists experiences in the given view.
    ///
    /// # Returns
    /// A tuple of (experiences, total_count)
    pub async fn list_paginated(
        &self,
        visibility: Visibility,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Experience>, i64)> {
        self.repo.list_paginated(visibility, offset, limit).await
    }

    /// Replaces every writable field.
    pub async fn update(
        &self,
        uuid: &str,
        actor: Actor,
        draft: ExperienceDraft,
    ) -> AppResult<Experience> {
        validate_date_range(draft.dates)?;
        let mut experience = self.get(uuid).await?;
        experience.apply(draft);
        self.save(experience, actor).await
    }

    /// Merges the patch into the stored record, then validates the result.
    pub async fn partial_update(
        &self,
        uuid: &str,
        actor: Actor,
        patch: ExperiencePatch,
    ) -> AppResult<Experience> {
        let mut experience = self.get(uuid).await?;
        let merged = patch.apply_to(experience.draft());
        validate_date_range(merged.dates)?;
        experience.apply(merged);
        self.save(experience, actor).await
    }

    /// Deletes a live experience, softly unless `mode` says otherwise.
    pub async fn delete(&self, uuid: &str, actor: Actor, mode: DeleteMode) -> AppResult<()> {
        let visibility = match mode {
            DeleteMode::Soft => Visibility::Active,
            DeleteMode::Hard => Visibility::All,
        };
        self.find(uuid, visibility).await?;

        if !self.repo.delete(uuid, actor.id, mode).await? {
            return Err(AppError::not_found(ENTITY_NAME, uuid));
        }

        tracing::info!(uuid = %uuid, actor = actor.id, mode = ?mode, "Experience deleted");
        Ok(())
    }

    /// Brings a soft-deleted experience back. Only admins may do this.
    pub async fn restore(&self, uuid: &str, actor: Actor) -> AppResult<Experience> {
        if !actor.is_admin {
            tracing::warn!(uuid = %uuid, actor = actor.id, "Restore rejected for non-admin");
            return Err(AppError::forbidden(
                "You do not have permission to perform this action.",
            ));
        }

        let restored = self
            .repo
            .restore(uuid)
            .await?
            .ok_or_else(|| AppError::not_found(ENTITY_NAME, uuid))?;

        tracing::info!(uuid = %uuid, actor = actor.id, "Experience restored");
        Ok(restored)
    }

    async fn find(&self, uuid: &str, visibility: Visibility) -> AppResult<Experience> {
        self.repo
            .find_by_uuid(uuid, visibility)
            .await?
            .ok_or_else(|| AppError::not_found(ENTITY_NAME, uuid))
    }

    async fn save(&self, mut experience: Experience, actor: Actor) -> AppResult<Experience> {
        experience.audit.mark_updated(actor.id, Timestamp::now());
        let saved = self.repo.update(&experience).await?;
        tracing::info!(uuid = %saved.audit.uuid, actor = actor.id, "Experience updated");
        Ok(saved)
    }
}
