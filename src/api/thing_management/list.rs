use crate::api::thing_management::models::{clamp_limit, ThingOut};
use crate::api::user_management::models::AuthenticatedUser;
use crate::db::Db;
use crate::error::ThingsError;
use crate::settings::Settings;
use rocket::serde::json::Json;
use rocket::State;

#[get("/things?<limit>")]
pub(crate) async fn list_things(
    user: AuthenticatedUser,
    limit: Option<i64>,
    db: &State<Db>,
    settings: &State<Settings>,
) -> Result<Json<Vec<ThingOut>>, ThingsError> {
    let thing_list = db.list_things(user.user_id, clamp_limit(limit)).await?;

    let out = thing_list
        .into_iter()
        .map(|thing| ThingOut::new(thing, settings))
        .collect::<Vec<_>>();

    Ok(Json(out))
}
