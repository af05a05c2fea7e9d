//! Process-local repositories backed by `DashMap`.
//!
//! Used by the test suite and for running the API without PostgreSQL.
//! [`AuditedStore`] is the generic soft-delete collection; the concrete
//! repositories wrap it.

use std::cmp::Reverse;
use std::sync::Arc;
use std::sync::atomic::{AtomicI32, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use jiff::Timestamp;

use crate::error::{AppError, AppResult};
use crate::models::{Audited, DeleteMode, Experience, NewExperience, NewUser, User, Visibility};
use crate::repositories::{ExperienceRepository, UserRepository};

/// A keyed-by-uuid collection of audited records with the three
/// soft-delete views.
pub struct AuditedStore<T: Audited> {
    records: DashMap<String, (u64, T)>,
    sequence: AtomicU64,
}

impl<T: Audited> Default for AuditedStore<T> {
    fn default() -> Self {
        Self {
            records: DashMap::new(),
            sequence: AtomicU64::new(0),
        }
    }
}

impl<T: Audited> AuditedStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record, assigning its uuid if it has none.
    pub fn insert(&self, mut record: T) -> T {
        record.audit_mut().ensure_uuid(T::ENTITY);
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        self.records
            .insert(record.audit().uuid.clone(), (seq, record.clone()));
        record
    }

    pub fn get(&self, uuid: &str, visibility: Visibility) -> Option<T> {
        self.records
            .get(uuid)
            .map(|entry| entry.value().1.clone())
            .filter(|record| visibility.admits(record.audit()))
    }

    /// Newest-created first, ties broken by insertion order.
    pub fn list(&self, visibility: Visibility, offset: usize, limit: usize) -> (Vec<T>, usize) {
        let mut matching: Vec<(u64, T)> = self
            .records
            .iter()
            .filter(|entry| visibility.admits(entry.value().1.audit()))
            .map(|entry| entry.value().clone())
            .collect();
        matching.sort_by_key(|(seq, record)| (Reverse(record.audit().created_at), Reverse(*seq)));

        let total = matching.len();
        let page = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|(_, record)| record)
            .collect();
        (page, total)
    }

    /// Replaces an existing record, keeping its position in the ordering.
    pub fn replace(&self, record: T) -> Option<T> {
        let mut entry = self.records.get_mut(&record.audit().uuid)?;
        entry.value_mut().1 = record.clone();
        Some(record)
    }

    pub fn delete(&self, uuid: &str, actor: i32, mode: DeleteMode, at: Timestamp) -> bool {
        match mode {
            DeleteMode::Hard => self.records.remove(uuid).is_some(),
            DeleteMode::Soft => match self.records.get_mut(uuid) {
                Some(mut entry) if entry.value().1.audit().is_live() => {
                    entry.value_mut().1.audit_mut().mark_deleted(actor, at);
                    true
                }
                _ => false,
            },
        }
    }

    pub fn restore(&self, uuid: &str) -> Option<T> {
        let mut entry = self.records.get_mut(uuid)?;
        entry.value_mut().1.audit_mut().restore();
        Some(entry.value().1.clone())
    }

    /// Drops every record for which `keep` is false; returns how many went.
    pub fn retain(&self, keep: impl Fn(&T) -> bool) -> usize {
        let before = self.records.len();
        self.records.retain(|_, (_, record)| keep(record));
        before - self.records.len()
    }
}

/// In-memory user storage with a unique username index.
///
/// Deleting a user also removes the experiences it owns or stamped when an
/// experience repository is attached, matching the `ON DELETE CASCADE`
/// foreign keys of the PostgreSQL schema.
pub struct MemoryUserRepository {
    users: DashMap<i32, User>,
    usernames: DashMap<String, i32>,
    next_id: AtomicI32,
    experiences: Option<Arc<MemoryExperienceRepository>>,
}

impl Default for MemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn duplicate_username(username: &str) -> AppError {
    AppError::Duplicate {
        entity: "users".to_string(),
        field: "username".to_string(),
        value: username.to_string(),
    }
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            usernames: DashMap::new(),
            next_id: AtomicI32::new(1),
            experiences: None,
        }
    }

    pub fn with_experiences(experiences: Arc<MemoryExperienceRepository>) -> Self {
        Self {
            experiences: Some(experiences),
            ..Self::new()
        }
    }

    /// Reserves `username` for `id`. Returns false when `id` already held it.
    fn claim_username(&self, username: &str, id: i32) -> AppResult<bool> {
        match self.usernames.entry(username.to_string()) {
            Entry::Occupied(entry) if *entry.get() == id => Ok(false),
            Entry::Occupied(_) => Err(duplicate_username(username)),
            Entry::Vacant(entry) => {
                entry.insert(id);
                Ok(true)
            }
        }
    }

    fn release_username(&self, username: &str, id: i32) {
        self.usernames.remove_if(username, |_, owner| *owner == id);
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.claim_username(&new_user.username, id)?;

        let user = User {
            id,
            uuid: new_user.uuid,
            username: new_user.username,
            first_name: new_user.first_name,
            last_name: new_user.last_name,
            email: new_user.email,
            password: new_user.password,
            is_admin: new_user.is_admin,
            is_active: new_user.is_active,
            date_joined: new_user.date_joined,
        };
        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: i32) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_uuid(&self, uuid: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.uuid == uuid)
            .map(|u| u.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let Some(id) = self.usernames.get(username).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        self.find_by_id(id).await
    }

    async fn list_paginated(&self, offset: i64, limit: i64) -> AppResult<(Vec<User>, i64)> {
        let mut all: Vec<User> = self.users.iter().map(|u| u.value().clone()).collect();
        all.sort_by_key(|u| (Reverse(u.date_joined), Reverse(u.id)));

        let total = all.len() as i64;
        let page = all
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let claimed = self.claim_username(&user.username, user.id)?;

        let Some(mut stored) = self.users.get_mut(&user.id) else {
            if claimed {
                self.release_username(&user.username, user.id);
            }
            return Err(AppError::NotFound {
                entity: "user".to_string(),
                field: "id".to_string(),
                value: user.id.to_string(),
            });
        };
        let previous = std::mem::replace(&mut stored.username, user.username.clone());
        stored.first_name = user.first_name.clone();
        stored.last_name = user.last_name.clone();
        stored.email = user.email.clone();
        let updated = stored.value().clone();
        drop(stored);

        if previous != updated.username {
            self.release_username(&previous, user.id);
        }
        Ok(updated)
    }

    async fn delete(&self, id: i32) -> AppResult<usize> {
        let Some((_, user)) = self.users.remove(&id) else {
            return Ok(0);
        };
        self.release_username(&user.username, id);
        if let Some(experiences) = &self.experiences {
            let removed = experiences.remove_rows_of(id);
            tracing::debug!(user_id = id, removed, "Removed experiences of deleted user");
        }
        Ok(1)
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

/// In-memory experience storage on top of [`AuditedStore`].
pub struct MemoryExperienceRepository {
    store: AuditedStore<Experience>,
    next_id: AtomicI32,
}

impl Default for MemoryExperienceRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryExperienceRepository {
    pub fn new() -> Self {
        Self {
            store: AuditedStore::new(),
            next_id: AtomicI32::new(1),
        }
    }

    /// Removes experiences owned by `user_id` or carrying it in an audit
    /// stamp, soft-deleted ones included.
    pub fn remove_rows_of(&self, user_id: i32) -> usize {
        self.store.retain(|experience| {
            let audit = &experience.audit;
            experience.user_id != user_id
                && audit.created_user_id != user_id
                && audit.updated_user_id != Some(user_id)
                && audit.deleted_user_id != Some(user_id)
        })
    }
}

#[async_trait]
impl ExperienceRepository for MemoryExperienceRepository {
    async fn create(&self, new_experience: NewExperience) -> AppResult<Experience> {
        let NewExperience {
            user_id,
            draft,
            audit,
        } = new_experience;

        let experience = Experience {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            user_id,
            job_title: draft.job_title,
            description: draft.description,
            company_name: draft.company_name,
            dates: draft.dates,
            audit,
        };
        Ok(self.store.insert(experience))
    }

    async fn find_by_uuid(
        &self,
        uuid: &str,
        visibility: Visibility,
    ) -> AppResult<Option<Experience>> {
        Ok(self.store.get(uuid, visibility))
    }

    async fn list_paginated(
        &self,
        visibility: Visibility,
        offset: i64,
        limit: i64,
    ) -> AppResult<(Vec<Experience>, i64)> {
        let (page, total) =
            self.store
                .list(visibility, offset.max(0) as usize, limit.max(0) as usize);
        Ok((page, total as i64))
    }

    async fn update(&self, experience: &Experience) -> AppResult<Experience> {
        self.store
            .replace(experience.clone())
            .ok_or_else(|| AppError::not_found("experience", &experience.audit.uuid))
    }

    async fn delete(&self, uuid: &str, actor: i32, mode: DeleteMode) -> AppResult<bool> {
        Ok(self.store.delete(uuid, actor, mode, Timestamp::now()))
    }

    async fn restore(&self, uuid: &str) -> AppResult<Option<Experience>> {
        Ok(self.store.restore(uuid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuditFields, DateRange, ExperienceDraft};

    fn at(seconds: i64) -> Timestamp {
        Timestamp::from_second(seconds).unwrap()
    }

    fn experience(title: &str, created: i64) -> Experience {
        Experience {
            id: 0,
            user_id: 1,
            job_title: title.to_string(),
            description: String::new(),
            company_name: "Acme".to_string(),
            dates: DateRange {
                started_month: 1,
                started_year: 2020,
                ended_month: None,
                ended_year: None,
                is_still_in_role: true,
            },
            audit: AuditFields::created("Experience", 1, at(created)),
        }
    }

    #[test]
    fn test_store_lists_newest_first() {
        let store = AuditedStore::new();
        store.insert(experience("old", 10));
        store.insert(experience("new", 20));
        store.insert(experience("mid", 15));

        let (page, total) = store.list(Visibility::Active, 0, 10);
        let titles: Vec<_> = page.iter().map(|e| e.job_title.as_str()).collect();
        assert_eq!(titles, vec!["new", "mid", "old"]);
        assert_eq!(total, 3);
    }

    #[test]
    fn test_store_soft_delete_round_trip_through_views() {
        let store = AuditedStore::new();
        let record = store.insert(experience("job", 10));
        let uuid = record.audit.uuid.clone();

        assert!(store.delete(&uuid, 9, DeleteMode::Soft, at(30)));
        assert!(store.get(&uuid, Visibility::Active).is_none());
        assert_eq!(store.list(Visibility::Active, 0, 10).1, 0);
        let deleted = store.get(&uuid, Visibility::DeletedOnly).unwrap();
        assert_eq!(deleted.audit.deleted_user_id, Some(9));
        assert_eq!(store.list(Visibility::All, 0, 10).1, 1);

        // deleting again is a no-op on an already deleted row
        assert!(!store.delete(&uuid, 9, DeleteMode::Soft, at(31)));

        store.restore(&uuid).unwrap();
        assert!(store.get(&uuid, Visibility::Active).is_some());
        assert!(store.get(&uuid, Visibility::DeletedOnly).is_none());
    }

    #[test]
    fn test_store_hard_delete_removes_row() {
        let store = AuditedStore::new();
        let uuid = store.insert(experience("job", 10)).audit.uuid;

        assert!(store.delete(&uuid, 1, DeleteMode::Hard, at(11)));
        assert!(store.get(&uuid, Visibility::All).is_none());
        assert!(!store.delete(&uuid, 1, DeleteMode::Hard, at(12)));
    }

    #[test]
    fn test_store_pagination() {
        let store = AuditedStore::new();
        for i in 0..5 {
            store.insert(experience(&format!("job{}", i), i));
        }
        let (page, total) = store.list(Visibility::Active, 2, 2);
        assert_eq!(total, 5);
        let titles: Vec<_> = page.iter().map(|e| e.job_title.as_str()).collect();
        assert_eq!(titles, vec!["job2", "job1"]);
    }

    #[tokio::test]
    async fn test_memory_experience_repository_assigns_ids() {
        let repo = MemoryExperienceRepository::new();
        let draft = ExperienceDraft {
            job_title: "Engineer".to_string(),
            description: String::new(),
            company_name: "Acme".to_string(),
            dates: experience("x", 0).dates,
        };
        let first = repo
            .create(NewExperience {
                user_id: 1,
                draft: draft.clone(),
                audit: AuditFields::created("Experience", 1, at(1)),
            })
            .await
            .unwrap();
        let second = repo
            .create(NewExperience {
                user_id: 1,
                draft,
                audit: AuditFields::created("Experience", 1, at(2)),
            })
            .await
            .unwrap();
        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_ne!(first.audit.uuid, second.audit.uuid);
    }

    #[tokio::test]
    async fn test_memory_user_repository_rejects_duplicate_username() {
        let repo = MemoryUserRepository::new();
        let new_user = NewUser {
            uuid: "USER-PROFILE-1".to_string(),
            username: "alice".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: "alice@example.com".to_string(),
            password: "hash".to_string(),
            is_admin: false,
            is_active: true,
            date_joined: at(0),
        };
        repo.create(new_user.clone()).await.unwrap();
        let err = repo.create(new_user).await.unwrap_err();
        assert!(matches!(err, AppError::Duplicate { .. }));
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            uuid: format!("USER-PROFILE-{}", username),
            username: username.to_string(),
            first_name: String::new(),
            last_name: String::new(),
            email: format!("{}@example.com", username),
            password: "hash".to_string(),
            is_admin: false,
            is_active: true,
            date_joined: at(0),
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_keep_usernames_unique() {
        let repo = Arc::new(MemoryUserRepository::new());
        let tasks: Vec<_> = (0..32)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.create(new_user("bob")).await })
            })
            .collect();

        let mut created = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(_) => created += 1,
                Err(err) => assert!(matches!(err, AppError::Duplicate { .. })),
            }
        }
        assert_eq!(created, 1);
        assert_eq!(repo.list_paginated(0, 100).await.unwrap().1, 1);
    }

    #[tokio::test]
    async fn test_rename_frees_the_old_username() {
        let repo = MemoryUserRepository::new();
        let mut alice = repo.create(new_user("alice")).await.unwrap();
        let bob = repo.create(new_user("bob")).await.unwrap();

        alice.username = "bob".to_string();
        assert!(matches!(
            repo.update(&alice).await,
            Err(AppError::Duplicate { .. })
        ));

        alice.username = "carol".to_string();
        repo.update(&alice).await.unwrap();
        assert!(repo.find_by_username("alice").await.unwrap().is_none());
        assert_eq!(repo.find_by_username("carol").await.unwrap().unwrap().id, alice.id);

        repo.delete(bob.id).await.unwrap();
        repo.create(new_user("bob")).await.unwrap();
        repo.create(new_user("alice")).await.unwrap();
    }

    #[tokio::test]
    async fn test_deleting_a_user_removes_their_experiences() {
        let experiences = Arc::new(MemoryExperienceRepository::new());
        let users = MemoryUserRepository::with_experiences(experiences.clone());
        let owner = users.create(new_user("owner")).await.unwrap();
        let other = users.create(new_user("other")).await.unwrap();

        for (user_id, created_by) in [(owner.id, owner.id), (other.id, other.id), (other.id, owner.id)] {
            experiences
                .create(NewExperience {
                    user_id,
                    draft: ExperienceDraft {
                        job_title: "Engineer".to_string(),
                        description: String::new(),
                        company_name: "Acme".to_string(),
                        dates: experience("x", 0).dates,
                    },
                    audit: AuditFields::created("Experience", created_by, at(1)),
                })
                .await
                .unwrap();
        }

        assert_eq!(users.delete(owner.id).await.unwrap(), 1);
        let (left, total) = experiences.store.list(Visibility::All, 0, 10);
        assert_eq!(total, 1);
        assert_eq!(left[0].user_id, other.id);
        assert_eq!(users.delete(owner.id).await.unwrap(), 0);
    }
}
