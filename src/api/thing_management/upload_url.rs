use crate::api::storage::tickets::UploadTickets;
use crate::api::user_management::models::AuthenticatedUser;
use crate::error::ThingsError;
use crate::settings::Settings;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct UploadUrlOut {
    pub upload_url: String,
}

#[post("/things/upload_url")]
pub(crate) fn generate_upload_url(
    user: AuthenticatedUser,
    tickets: &State<UploadTickets>,
    settings: &State<Settings>,
) -> Result<Json<UploadUrlOut>, ThingsError> {
    let token = tickets.issue(user.user_id)?;

    Ok(Json(UploadUrlOut {
        upload_url: settings.api_url(&format!("storage/upload/{}", token)),
    }))
}
