use crate::blob_storage::BlobStorage;
use crate::db::Db;
use crate::error::ThingsError;

/// A thing may only reference a blob its owner uploaded, and no other
/// thing may hold it already: removing one thing deletes its blob.
pub(super) async fn check_image(
    db: &Db,
    blobs: &BlobStorage,
    image_id: &str,
    user_id: i32,
) -> Result<(), ThingsError> {
    match blobs.meta(image_id).await? {
        Some(meta) if meta.owner_id == user_id => {}
        _ => return Err(ThingsError::Validation(format!("Unknown image {}", image_id))),
    }

    if let Some(holder) = db
        .find_thing_with_image(user_id, image_id.to_string())
        .await?
    {
        return Err(ThingsError::Validation(format!(
            "Image {} is already used by thing {}",
            image_id, holder.id
        )));
    }

    Ok(())
}

/// Used once the thing itself is gone or updated; a failure here only
/// leaves an orphaned blob behind.
pub(super) async fn discard_image(blobs: &BlobStorage, image_id: &str) {
    if let Err(err) = blobs.delete(image_id).await {
        tracing::warn!(%image_id, error = %err, "couldn't delete image");
    }
}
