use crate::api::thing_management::images::check_image;
use crate::api::thing_management::models::{CreateThing, ThingOut};
use crate::api::user_management::models::AuthenticatedUser;
use crate::blob_storage::BlobStorage;
use crate::db::Db;
use crate::error::ThingsError;
use crate::settings::Settings;
use rocket::serde::json::Json;
use rocket::State;

#[post("/things", data = "<create>")]
pub(crate) async fn create_thing(
    create: Json<CreateThing>,
    user: AuthenticatedUser,
    db: &State<Db>,
    blobs: &State<BlobStorage>,
    settings: &State<Settings>,
) -> Result<Json<ThingOut>, ThingsError> {
    let new_thing = create.into_inner().into_new_thing(user.user_id)?;

    if let Some(image_id) = &new_thing.image_id {
        check_image(db, blobs, image_id, user.user_id).await?;
    }

    let thing = db.insert_thing(new_thing).await?;
    tracing::info!(thing_id = thing.id, user_id = user.user_id, "created thing");

    Ok(Json(ThingOut::new(thing, settings)))
}
