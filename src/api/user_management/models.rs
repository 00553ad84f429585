use crate::schema::users;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[diesel(table_name = users)]
pub struct User {
    pub id: i32,
    pub sub: String,
    pub username: String,
    pub email: String,
}

#[derive(Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = users)]
pub struct NewUser {
    pub sub: String,
    pub username: String,
    pub email: String,
}

/// Injected into every owner-scoped handler by the session guard.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: i32,
    pub user: User,
}
