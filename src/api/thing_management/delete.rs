use crate::api::thing_management::images::discard_image;
use crate::api::user_management::models::AuthenticatedUser;
use crate::blob_storage::BlobStorage;
use crate::db::Db;
use crate::error::ThingsError;
use rocket::State;

#[delete("/things/<thing_id>")]
pub(crate) async fn delete_thing(
    user: AuthenticatedUser,
    thing_id: i32,
    db: &State<Db>,
    blobs: &State<BlobStorage>,
) -> Result<(), ThingsError> {
    let thing = db
        .find_thing(thing_id, user.user_id)
        .await?
        .ok_or(ThingsError::NotFound("Thing"))?;

    if !db.delete_thing(thing.id, user.user_id).await? {
        return Err(ThingsError::NotFound("Thing"));
    }

    if let Some(image_id) = &thing.image_id {
        discard_image(blobs, image_id).await;
    }

    tracing::info!(thing_id, user_id = user.user_id, "deleted thing");

    Ok(())
}
