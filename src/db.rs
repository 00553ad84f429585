use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use rocket::tokio::task::{self, JoinError};
use thiserror::Error;

use crate::api::thing_management::models::{NewThing, Thing, ThingPatch};
use crate::api::user_management::models::{NewUser, User};
use crate::schema::{things, users};

pub(crate) const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub(crate) type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

/// Managed handle to whichever store the server was started with.
pub(crate) type Db = Box<dyn Database>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("couldn't get a database connection: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("database task failed: {0}")]
    Task(#[from] JoinError),
    #[error("couldn't run migrations: {0}")]
    Migration(String),
    #[error("in-memory store is poisoned")]
    Poisoned,
}

/// Document store for users and their things.
///
/// Every thing operation takes the owner's id and only ever touches rows
/// belonging to that owner; a thing owned by someone else looks missing.
#[rocket::async_trait]
pub(crate) trait Database: Send + Sync {
    async fn upsert_user(&self, user: NewUser) -> Result<User, DbError>;

    async fn find_user_by_sub(&self, sub: String) -> Result<Option<User>, DbError>;

    async fn insert_thing(&self, thing: NewThing) -> Result<Thing, DbError>;

    async fn find_thing(&self, id: i32, owner: i32) -> Result<Option<Thing>, DbError>;

    /// Newest first.
    async fn list_things(&self, owner: i32, limit: i64) -> Result<Vec<Thing>, DbError>;

    async fn update_thing(
        &self,
        id: i32,
        owner: i32,
        patch: ThingPatch,
    ) -> Result<Option<Thing>, DbError>;

    /// Returns whether a row was deleted.
    async fn delete_thing(&self, id: i32, owner: i32) -> Result<bool, DbError>;

    /// The owner's thing currently holding `image_id`, if any.
    async fn find_thing_with_image(
        &self,
        owner: i32,
        image_id: String,
    ) -> Result<Option<Thing>, DbError>;
}

pub(crate) struct PgDatabase {
    pool: Pool,
}

impl PgDatabase {
    pub(crate) fn connect(database_url: &str) -> Result<PgDatabase, DbError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = r2d2::Pool::builder().build(manager)?;

        let mut conn = pool.get()?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|err| DbError::Migration(err.to_string()))?;
        tracing::info!(count = applied.len(), "applied pending migrations");

        Ok(PgDatabase { pool })
    }

    /// Diesel is blocking, so every query gets its own blocking task.
    async fn run<F, T>(&self, query: F) -> Result<T, DbError>
    where
        F: FnOnce(&mut PgConnection) -> QueryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        task::spawn_blocking(move || -> Result<T, DbError> {
            let mut conn = pool.get()?;
            Ok(query(&mut conn)?)
        })
        .await?
    }
}

#[rocket::async_trait]
impl Database for PgDatabase {
    async fn upsert_user(&self, new_user: NewUser) -> Result<User, DbError> {
        self.run(move |c| {
            diesel::insert_into(users::table)
                .values(&new_user)
                .on_conflict(users::sub)
                .do_update()
                .set(&new_user)
                .get_result::<User>(c)
        })
        .await
    }

    async fn find_user_by_sub(&self, sub: String) -> Result<Option<User>, DbError> {
        self.run(move |c| {
            users::table
                .filter(users::sub.eq(sub))
                .first::<User>(c)
                .optional()
        })
        .await
    }

    async fn insert_thing(&self, new_thing: NewThing) -> Result<Thing, DbError> {
        self.run(move |c| {
            diesel::insert_into(things::table)
                .values(&new_thing)
                .get_result::<Thing>(c)
        })
        .await
    }

    async fn find_thing(&self, id: i32, owner: i32) -> Result<Option<Thing>, DbError> {
        self.run(move |c| {
            things::table
                .filter(things::id.eq(id).and(things::user_id.eq(owner)))
                .first::<Thing>(c)
                .optional()
        })
        .await
    }

    async fn list_things(&self, owner: i32, limit: i64) -> Result<Vec<Thing>, DbError> {
        self.run(move |c| {
            things::table
                .filter(things::user_id.eq(owner))
                .order((things::creation_time.desc(), things::id.desc()))
                .limit(limit)
                .load::<Thing>(c)
        })
        .await
    }

    async fn update_thing(
        &self,
        id: i32,
        owner: i32,
        patch: ThingPatch,
    ) -> Result<Option<Thing>, DbError> {
        self.run(move |c| {
            let target = things::table.filter(things::id.eq(id).and(things::user_id.eq(owner)));

            // Diesel refuses an UPDATE without columns.
            if patch.is_empty() {
                return target.first::<Thing>(c).optional();
            }

            diesel::update(target)
                .set(&patch)
                .get_result::<Thing>(c)
                .optional()
        })
        .await
    }

    async fn delete_thing(&self, id: i32, owner: i32) -> Result<bool, DbError> {
        self.run(move |c| {
            diesel::delete(things::table.filter(things::id.eq(id).and(things::user_id.eq(owner))))
                .execute(c)
                .map(|deleted| deleted > 0)
        })
        .await
    }

    async fn find_thing_with_image(
        &self,
        owner: i32,
        image_id: String,
    ) -> Result<Option<Thing>, DbError> {
        self.run(move |c| {
            things::table
                .filter(things::user_id.eq(owner).and(things::image_id.eq(image_id)))
                .first::<Thing>(c)
                .optional()
        })
        .await
    }
}
