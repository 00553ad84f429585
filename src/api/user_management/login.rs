use rocket::http::{Cookie, CookieJar};
use rocket::serde::json::Json;
use rocket::State;

use crate::api::user_management::identity::Identity;
use crate::api::user_management::models::{AuthenticatedUser, NewUser, User};
use crate::api::user_management::sessions::{read_session_cookie, UserSession, SESSION_COOKIE};
use crate::db::Db;
use crate::error::ThingsError;

#[get("/check_login")]
pub(crate) async fn check_login(user: AuthenticatedUser) -> Json<User> {
    Json(user.user)
}

#[post("/login", data = "<token>")]
pub(crate) async fn login(
    token: String,
    identity: &State<Identity>,
    sessions: &State<UserSession>,
    db: &State<Db>,
    cookies: &CookieJar<'_>,
) -> Result<Json<User>, ThingsError> {
    let verified = identity.verify(token.trim()).await?;

    let user = db
        .upsert_user(NewUser {
            sub: verified.sub,
            username: verified.name,
            email: verified.email,
        })
        .await?;

    let cookie = sessions.open(user.sub.clone())?;
    let cookie_string = serde_json::to_string(&cookie)
        .map_err(|_| ThingsError::Internal("Couldn't create session cookie"))?;
    cookies.add_private(Cookie::new(SESSION_COOKIE, cookie_string));

    tracing::info!(user_id = user.id, "user logged in");

    Ok(Json(user))
}

#[post("/logout")]
pub(crate) async fn logout(
    sessions: &State<UserSession>,
    cookies: &CookieJar<'_>,
) -> Result<(), ThingsError> {
    if let Some(cookie) = read_session_cookie(cookies) {
        sessions.revoke(&cookie.session_key)?;
    }
    cookies.remove_private(SESSION_COOKIE);

    Ok(())
}
