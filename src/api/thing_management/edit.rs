use crate::api::thing_management::images::{check_image, discard_image};
use crate::api::thing_management::models::{ThingOut, UpdateThing};
use crate::api::user_management::models::AuthenticatedUser;
use crate::blob_storage::BlobStorage;
use crate::db::Db;
use crate::error::ThingsError;
use crate::settings::Settings;
use rocket::serde::json::Json;
use rocket::State;

#[patch("/things/<thing_id>", data = "<update>")]
pub(crate) async fn edit_thing(
    update: Json<UpdateThing>,
    thing_id: i32,
    user: AuthenticatedUser,
    db: &State<Db>,
    blobs: &State<BlobStorage>,
    settings: &State<Settings>,
) -> Result<Json<ThingOut>, ThingsError> {
    let patch = update.into_inner().into_patch()?;

    let current = db
        .find_thing(thing_id, user.user_id)
        .await?
        .ok_or_else(|| {
            tracing::debug!(thing_id, user_id = user.user_id, "edit of missing or foreign thing");
            ThingsError::NotFound("Thing")
        })?;

    if let Some(Some(image_id)) = &patch.image_id {
        if current.image_id.as_ref() != Some(image_id) {
            check_image(db, blobs, image_id, user.user_id).await?;
        }
    }

    let thing = db
        .update_thing(thing_id, user.user_id, patch)
        .await?
        .ok_or(ThingsError::NotFound("Thing"))?;

    if let Some(old_image) = current.image_id {
        if thing.image_id.as_ref() != Some(&old_image) {
            discard_image(blobs, &old_image).await;
        }
    }

    tracing::info!(thing_id, user_id = user.user_id, "updated thing");

    Ok(Json(ThingOut::new(thing, settings)))
}
