use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ThingsError;
use crate::schema::things;
use crate::settings::Settings;

pub const DEFAULT_LIST_LIMIT: i64 = 50;
pub const MAX_LIST_LIMIT: i64 = 100;

#[derive(Queryable, Identifiable, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = things)]
pub struct Thing {
    pub id: i32,
    pub creation_time: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub image_id: Option<String>,
    pub user_id: i32,
}

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = things)]
pub struct NewThing {
    pub title: String,
    pub description: Option<String>,
    pub image_id: Option<String>,
    pub user_id: i32,
}

/// Partial update. `None` leaves a column untouched, `Some(None)` clears it.
#[derive(AsChangeset, Default, Debug, Clone, PartialEq, Eq)]
#[diesel(table_name = things)]
pub struct ThingPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub image_id: Option<Option<String>>,
}

impl ThingPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.image_id.is_none()
    }

    pub fn apply(&self, thing: &mut Thing) {
        if let Some(title) = &self.title {
            thing.title = title.clone();
        }
        if let Some(description) = &self.description {
            thing.description = description.clone();
        }
        if let Some(image_id) = &self.image_id {
            thing.image_id = image_id.clone();
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ThingOut {
    pub id: i32,
    pub creation_time: DateTime<Utc>,
    pub title: String,
    pub description: Option<String>,
    pub image_id: Option<String>,
    pub image_url: Option<String>,
    pub user_id: i32,
}

impl ThingOut {
    pub fn new(thing: Thing, settings: &Settings) -> ThingOut {
        ThingOut {
            image_url: thing.image_id.as_deref().map(|id| settings.storage_url(id)),
            id: thing.id,
            creation_time: thing.creation_time,
            title: thing.title,
            description: thing.description,
            image_id: thing.image_id,
            user_id: thing.user_id,
        }
    }
}

#[derive(Deserialize, Validate, Debug, Clone, Default)]
pub struct CreateThing {
    #[validate(length(min = 1, max = 200, message = "title must be 1 to 200 characters"))]
    pub title: String,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,
    pub image_id: Option<String>,
}

impl CreateThing {
    pub fn into_new_thing(self, user_id: i32) -> Result<NewThing, ThingsError> {
        let create = CreateThing {
            title: self.title.trim().to_string(),
            description: self.description.filter(|d| !d.is_empty()),
            image_id: self.image_id,
        };
        create.validate()?;

        Ok(NewThing {
            title: create.title,
            description: create.description,
            image_id: create.image_id,
            user_id,
        })
    }
}

#[derive(Deserialize, Validate, Debug, Clone, Default)]
pub struct UpdateThing {
    #[validate(length(min = 1, max = 200, message = "title must be 1 to 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "description must be at most 2000 characters"))]
    pub description: Option<String>,
    pub image_id: Option<String>,
    #[serde(default)]
    pub remove_image: bool,
}

impl UpdateThing {
    pub fn into_patch(self) -> Result<ThingPatch, ThingsError> {
        if self.remove_image && self.image_id.is_some() {
            return Err(ThingsError::Validation(
                "image_id and remove_image can't be combined".to_string(),
            ));
        }

        let update = UpdateThing {
            title: self.title.map(|t| t.trim().to_string()),
            ..self
        };
        update.validate()?;

        let image_id = match (update.image_id, update.remove_image) {
            (Some(id), _) => Some(Some(id)),
            (None, true) => Some(None),
            (None, false) => None,
        };

        Ok(ThingPatch {
            title: update.title,
            description: update.description.map(|d| Some(d).filter(|d| !d.is_empty())),
            image_id,
        })
    }
}

pub fn clamp_limit(limit: Option<i64>) -> i64 {
    limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT)
}
