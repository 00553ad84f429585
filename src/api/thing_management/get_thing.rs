use crate::api::thing_management::models::ThingOut;
use crate::api::user_management::models::AuthenticatedUser;
use crate::db::Db;
use crate::error::ThingsError;
use crate::settings::Settings;
use rocket::serde::json::Json;
use rocket::State;

#[get("/things/<thing_id>")]
pub(crate) async fn get_thing(
    user: AuthenticatedUser,
    thing_id: i32,
    db: &State<Db>,
    settings: &State<Settings>,
) -> Result<Json<ThingOut>, ThingsError> {
    let thing = db
        .find_thing(thing_id, user.user_id)
        .await?
        .ok_or(ThingsError::NotFound("Thing"))?;

    Ok(Json(ThingOut::new(thing, settings)))
}
