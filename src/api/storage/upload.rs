use rocket::data::{Data, ToByteUnit};
use rocket::http::ContentType;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

use crate::api::storage::tickets::UploadTickets;
use crate::blob_storage::{BlobMeta, BlobStorage};
use crate::error::ThingsError;
use crate::settings::Settings;

#[derive(Serialize, Deserialize, Debug)]
pub struct UploadOut {
    pub storage_id: String,
}

/// Target of a generated upload URL. The ticket in the path is the only
/// credential, so no session is needed.
#[post("/storage/upload/<token>", data = "<data>")]
pub(crate) async fn upload(
    token: &str,
    data: Data<'_>,
    content_type: Option<&ContentType>,
    tickets: &State<UploadTickets>,
    blobs: &State<BlobStorage>,
    settings: &State<Settings>,
) -> Result<Json<UploadOut>, ThingsError> {
    let ticket = tickets
        .redeem(token)?
        .ok_or(ThingsError::NotFound("Upload URL"))?;

    let bytes = data.open(settings.max_upload_bytes.bytes()).into_bytes().await?;
    let rejection = if !bytes.is_complete() {
        Some(ThingsError::PayloadTooLarge)
    } else if bytes.is_empty() {
        Some(ThingsError::Validation("Upload is empty".to_string()))
    } else {
        None
    };
    if let Some(err) = rejection {
        // A rejected body leaves the URL usable for a retry.
        tickets.restore(token, ticket)?;
        return Err(err);
    }
    let bytes = bytes.into_inner();

    let meta = BlobMeta {
        content_type: content_type
            .map(|ct| ct.to_string())
            .unwrap_or_else(|| ContentType::Binary.to_string()),
        owner_id: ticket.user_id,
    };
    let storage_id = blobs.put(&bytes, &meta).await?;

    tracing::info!(
        user_id = ticket.user_id,
        %storage_id,
        size = bytes.len(),
        "stored upload"
    );

    Ok(Json(UploadOut { storage_id }))
}

/// Blobs are public so that `image_url` can be used directly by a browser.
#[get("/storage/<storage_id>")]
pub(crate) async fn get_blob(
    storage_id: &str,
    blobs: &State<BlobStorage>,
) -> Result<(ContentType, Vec<u8>), ThingsError> {
    let (meta, bytes) = blobs
        .get(storage_id)
        .await?
        .ok_or(ThingsError::NotFound("Blob"))?;

    let content_type = ContentType::parse_flexible(&meta.content_type).unwrap_or(ContentType::Binary);

    Ok((content_type, bytes))
}
