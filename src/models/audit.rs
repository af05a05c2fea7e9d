//! Audit envelope shared by every record except users.
//!
//! A record carries its public uuid, who created it and when, the last
//! update, and the soft-delete marker. The delete timestamp and the deleting
//! user always travel together: both present means deleted, both absent
//! means live.

use jiff::Timestamp;
use serde::Serialize;

use crate::utils::identifier::generate_uuid;

/// Common audit fields embedded by value in each audited record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditFields {
    pub uuid: String,
    pub created_at: Timestamp,
    pub created_user_id: i32,
    pub updated_at: Option<Timestamp>,
    pub updated_user_id: Option<i32>,
    pub deleted_at: Option<Timestamp>,
    pub deleted_user_id: Option<i32>,
}

impl AuditFields {
    /// Stamps a brand new record created by `actor` at `at`.
    pub fn created(entity: &str, actor: i32, at: Timestamp) -> Self {
        Self {
            uuid: generate_uuid(entity),
            created_at: at,
            created_user_id: actor,
            updated_at: None,
            updated_user_id: None,
            deleted_at: None,
            deleted_user_id: None,
        }
    }

    /// Assigns a uuid only when none has been set yet.
    pub fn ensure_uuid(&mut self, entity: &str) {
        if self.uuid.is_empty() {
            self.uuid = generate_uuid(entity);
        }
    }

    pub fn mark_updated(&mut self, actor: i32, at: Timestamp) {
        self.updated_at = Some(at);
        self.updated_user_id = Some(actor);
    }

    pub fn mark_deleted(&mut self, actor: i32, at: Timestamp) {
        self.deleted_at = Some(at);
        self.deleted_user_id = Some(actor);
    }

    /// Clears the soft-delete marker. Callers decide who may do this.
    pub fn restore(&mut self) {
        self.deleted_at = None;
        self.deleted_user_id = None;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some() && self.deleted_user_id.is_some()
    }

    pub fn is_live(&self) -> bool {
        self.deleted_at.is_none() && self.deleted_user_id.is_none()
    }
}

/// Which slice of an audited collection a query sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    /// Rows that are not soft-deleted.
    #[default]
    Active,
    /// Only soft-deleted rows.
    DeletedOnly,
    /// Everything, deleted or not.
    All,
}

impl Visibility {
    /// Applies the view predicate to a single record.
    pub fn admits(self, audit: &AuditFields) -> bool {
        match self {
            Visibility::Active => audit.is_live(),
            Visibility::DeletedOnly => audit.is_deleted(),
            Visibility::All => true,
        }
    }
}

/// How a delete request is carried out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeleteMode {
    /// Set the delete marker and keep the row.
    #[default]
    Soft,
    /// Physically remove the row.
    Hard,
}

impl DeleteMode {
    pub fn from_hard_flag(hard: bool) -> Self {
        if hard { DeleteMode::Hard } else { DeleteMode::Soft }
    }
}

/// Implemented by every record that embeds [`AuditFields`].
pub trait Audited: Clone + Send + Sync + 'static {
    /// Type name fed to the uuid generator, e.g. `Experience`.
    const ENTITY: &'static str;

    fn audit(&self) -> &AuditFields;

    fn audit_mut(&mut self) -> &mut AuditFields;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(seconds: i64) -> Timestamp {
        Timestamp::from_second(seconds).unwrap()
    }

    #[test]
    fn test_created_assigns_prefixed_uuid() {
        let audit = AuditFields::created("Experience", 7, at(10));
        assert!(audit.uuid.starts_with("EXPERIENCE-"));
        assert_eq!(audit.created_user_id, 7);
        assert!(audit.is_live());
    }

    #[test]
    fn test_ensure_uuid_is_idempotent() {
        let mut audit = AuditFields::created("Experience", 1, at(0));
        let original = audit.uuid.clone();
        audit.ensure_uuid("Experience");
        assert_eq!(audit.uuid, original);

        audit.uuid.clear();
        audit.ensure_uuid("Experience");
        assert!(audit.uuid.starts_with("EXPERIENCE-"));
    }

    #[test]
    fn test_delete_and_restore_toggle_views() {
        let mut audit = AuditFields::created("Experience", 1, at(0));
        assert!(Visibility::Active.admits(&audit));
        assert!(!Visibility::DeletedOnly.admits(&audit));

        audit.mark_deleted(2, at(5));
        assert!(!Visibility::Active.admits(&audit));
        assert!(Visibility::DeletedOnly.admits(&audit));
        assert!(Visibility::All.admits(&audit));
        assert_eq!(audit.deleted_user_id, Some(2));

        audit.restore();
        assert!(Visibility::Active.admits(&audit));
        assert!(audit.deleted_at.is_none());
    }

    #[test]
    fn test_half_deleted_row_is_in_neither_filtered_view() {
        let mut audit = AuditFields::created("Experience", 1, at(0));
        audit.deleted_at = Some(at(3));
        assert!(!Visibility::Active.admits(&audit));
        assert!(!Visibility::DeletedOnly.admits(&audit));
        assert!(Visibility::All.admits(&audit));
    }

    #[test]
    fn test_mark_updated_keeps_creation_stamp() {
        let mut audit = AuditFields::created("Experience", 1, at(0));
        audit.mark_updated(3, at(9));
        assert_eq!(audit.created_user_id, 1);
        assert_eq!(audit.created_at, at(0));
        assert_eq!(audit.updated_user_id, Some(3));
        assert_eq!(audit.updated_at, Some(at(9)));
    }
}
