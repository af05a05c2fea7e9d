//! User repository for async database operations.
//!
//! Provides CRUD operations for the users table using diesel_async.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use jiff_diesel::ToDiesel;

use crate::db::AsyncDbPool;
use crate::error::{AppError, AppResult};
use crate::models::{NewUser, User};
use crate::repositories::UserRepository;
use crate::schema::users;

/// Row shape of the users table.
#[derive(Debug, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
struct UserRow {
    id: i32,
    uuid: String,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    is_admin: bool,
    is_active: bool,
    date_joined: jiff_diesel::Timestamp,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            uuid: row.uuid,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            password: row.password,
            is_admin: row.is_admin,
            is_active: row.is_active,
            date_joined: row.date_joined.to_jiff(),
        }
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
struct NewUserRow {
    uuid: String,
    username: String,
    first_name: String,
    last_name: String,
    email: String,
    password: String,
    is_admin: bool,
    is_active: bool,
    date_joined: jiff_diesel::Timestamp,
}

impl From<NewUser> for NewUserRow {
    fn from(user: NewUser) -> Self {
        Self {
            uuid: user.uuid,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            password: user.password,
            is_admin: user.is_admin,
            is_active: user.is_active,
            date_joined: user.date_joined.to_diesel(),
        }
    }
}

/// Profile columns an update may touch.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = users)]
struct UserProfileChangeset<'a> {
    username: &'a str,
    first_name: &'a str,
    last_name: &'a str,
    email: &'a str,
}

/// User repository holding an async connection pool.
#[derive(Clone)]
pub struct PgUserRepository {
    pool: AsyncDbPool,
}

impl PgUserRepository {
    /// Creates a new PgUserRepository with the given connection pool.
    pub fn new(pool: AsyncDbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut conn = self.pool.get().await?;

        diesel::insert_into(users::table)
            .values(NewUserRow::from(new_user))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(User::from)
            .map_err(AppError::from)
    }

    async fn find_by_id(&self, user_id: i32) -> AppResult<Option<User>> {
        let mut conn = self.pool.get().await?;

        users::table
            .filter(users::id.eq(user_id))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(AppError::from)
    }

    async fn find_by_uuid(&self, user_uuid: &str) -> AppResult<Option<User>> {
        let mut conn = self.pool.get().await?;

        users::table
            .filter(users::uuid.eq(user_uuid))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(AppError::from)
    }

    async fn find_by_username(&self, name: &str) -> AppResult<Option<User>> {
        let mut conn = self.pool.get().await?;

        users::table
            .filter(users::username.eq(name))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map(|row| row.map(User::from))
            .map_err(AppError::from)
    }

    async fn list_paginated(&self, offset: i64, limit: i64) -> AppResult<(Vec<User>, i64)> {
        let mut conn = self.pool.get().await?;

        let total: i64 = users::table.count().get_result(&mut conn).await?;

        let rows = users::table
            .order((users::date_joined.desc(), users::id.desc()))
            .offset(offset)
            .limit(limit)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await?;

        Ok((rows.into_iter().map(User::from).collect(), total))
    }

    async fn update(&self, user: &User) -> AppResult<User> {
        let mut conn = self.pool.get().await?;

        let changes = UserProfileChangeset {
            username: &user.username,
            first_name: &user.first_name,
            last_name: &user.last_name,
            email: &user.email,
        };

        diesel::update(users::table.filter(users::id.eq(user.id)))
            .set(&changes)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(User::from)
            .map_err(AppError::from)
    }

    async fn delete(&self, user_id: i32) -> AppResult<usize> {
        let mut conn = self.pool.get().await?;

        diesel::delete(users::table.filter(users::id.eq(user_id)))
            .execute(&mut conn)
            .await
            .map_err(AppError::from)
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.pool.get().await?;
        diesel::sql_query("SELECT 1").execute(&mut conn).await?;
        Ok(())
    }
}
