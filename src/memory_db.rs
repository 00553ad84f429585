use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use crate::api::thing_management::models::{NewThing, Thing, ThingPatch};
use crate::api::user_management::models::{NewUser, User};
use crate::db::{Database, DbError};

/// Process-local store used when no `DATABASE_URL` is configured.
#[derive(Default)]
pub(crate) struct MemoryDatabase {
    state: Mutex<MemoryState>,
}

#[derive(Default)]
struct MemoryState {
    users: BTreeMap<i32, User>,
    things: BTreeMap<i32, Thing>,
    last_user_id: i32,
    last_thing_id: i32,
}

impl MemoryDatabase {
    fn state(&self) -> Result<MutexGuard<'_, MemoryState>, DbError> {
        self.state.lock().map_err(|_| DbError::Poisoned)
    }
}

fn owned_by(thing: &Thing, id: i32, owner: i32) -> bool {
    thing.id == id && thing.user_id == owner
}

#[rocket::async_trait]
impl Database for MemoryDatabase {
    async fn upsert_user(&self, new_user: NewUser) -> Result<User, DbError> {
        let mut state = self.state()?;

        if let Some(user) = state.users.values_mut().find(|u| u.sub == new_user.sub) {
            user.username = new_user.username;
            user.email = new_user.email;
            return Ok(user.clone());
        }

        state.last_user_id += 1;
        let user = User {
            id: state.last_user_id,
            sub: new_user.sub,
            username: new_user.username,
            email: new_user.email,
        };
        state.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_user_by_sub(&self, sub: String) -> Result<Option<User>, DbError> {
        Ok(self
            .state()?
            .users
            .values()
            .find(|u| u.sub == sub)
            .cloned())
    }

    async fn insert_thing(&self, new_thing: NewThing) -> Result<Thing, DbError> {
        let mut state = self.state()?;

        state.last_thing_id += 1;
        let thing = Thing {
            id: state.last_thing_id,
            creation_time: Utc::now(),
            title: new_thing.title,
            description: new_thing.description,
            image_id: new_thing.image_id,
            user_id: new_thing.user_id,
        };
        state.things.insert(thing.id, thing.clone());

        Ok(thing)
    }

    async fn find_thing(&self, id: i32, owner: i32) -> Result<Option<Thing>, DbError> {
        Ok(self
            .state()?
            .things
            .get(&id)
            .filter(|thing| owned_by(thing, id, owner))
            .cloned())
    }

    async fn list_things(&self, owner: i32, limit: i64) -> Result<Vec<Thing>, DbError> {
        let state = self.state()?;

        let mut list = state
            .things
            .values()
            .filter(|thing| thing.user_id == owner)
            .cloned()
            .collect::<Vec<_>>();
        list.sort_by(|a, b| (b.creation_time, b.id).cmp(&(a.creation_time, a.id)));
        list.truncate(usize::try_from(limit).unwrap_or(0));

        Ok(list)
    }

    async fn update_thing(
        &self,
        id: i32,
        owner: i32,
        patch: ThingPatch,
    ) -> Result<Option<Thing>, DbError> {
        let mut state = self.state()?;

        Ok(state
            .things
            .get_mut(&id)
            .filter(|thing| owned_by(thing, id, owner))
            .map(|thing| {
                patch.apply(thing);
                thing.clone()
            }))
    }

    async fn delete_thing(&self, id: i32, owner: i32) -> Result<bool, DbError> {
        let mut state = self.state()?;

        let owned = state
            .things
            .get(&id)
            .map_or(false, |thing| owned_by(thing, id, owner));
        if owned {
            state.things.remove(&id);
        }

        Ok(owned)
    }

    async fn find_thing_with_image(
        &self,
        owner: i32,
        image_id: String,
    ) -> Result<Option<Thing>, DbError> {
        Ok(self
            .state()?
            .things
            .values()
            .find(|thing| thing.user_id == owner && thing.image_id.as_ref() == Some(&image_id))
            .cloned())
    }
}
