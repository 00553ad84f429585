use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime};

use rocket::http::CookieJar;
use rocket::outcome::Outcome;
use rocket::request::{self, FromRequest};
use rocket::Request;
use serde::{Deserialize, Serialize};

use crate::api::user_management::models::AuthenticatedUser;
use crate::db::Db;
use crate::error::ThingsError;
use crate::keys::generate_key;

pub(crate) const SESSION_COOKIE: &str = "session";

#[derive(Serialize, Deserialize)]
pub(crate) struct SessionCookie {
    pub(crate) session_key: String,
    pub(crate) creation_time: SystemTime,
}

struct OpenSession {
    sub: String,
    opened_at: Instant,
}

/// Open sessions, keyed by session key, pointing at the user's `sub`.
pub(crate) struct UserSession {
    max_age: Duration,
    sessions: Mutex<HashMap<String, OpenSession>>,
}

impl UserSession {
    pub(crate) fn new(max_age: Duration) -> UserSession {
        UserSession {
            max_age,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn is_live(&self, session: &OpenSession) -> bool {
        session.opened_at.elapsed() < self.max_age
    }

    /// Also drops every session that has outlived `max_age`.
    pub(crate) fn open(&self, sub: String) -> Result<SessionCookie, ThingsError> {
        let mut sessions = self
            .sessions
            .lock()
            .map_err(|_| ThingsError::Internal("Couldn't update user session"))?;

        sessions.retain(|_, session| self.is_live(session));

        let session_key = generate_key();
        sessions.insert(
            session_key.clone(),
            OpenSession {
                sub,
                opened_at: Instant::now(),
            },
        );

        Ok(SessionCookie {
            session_key,
            creation_time: SystemTime::now(),
        })
    }

    pub(crate) fn lookup(&self, session_key: &str) -> Result<Option<String>, ThingsError> {
        Ok(self
            .sessions
            .lock()
            .map_err(|_| ThingsError::Internal("Couldn't get user sessions"))?
            .get(session_key)
            .filter(|session| self.is_live(session))
            .map(|session| session.sub.clone()))
    }

    pub(crate) fn revoke(&self, session_key: &str) -> Result<(), ThingsError> {
        self.sessions
            .lock()
            .map_err(|_| ThingsError::Internal("Couldn't update user session"))?
            .remove(session_key);

        Ok(())
    }

    fn is_expired(&self, cookie: &SessionCookie) -> bool {
        // A creation time in the future counts as expired too.
        cookie
            .creation_time
            .elapsed()
            .map_or(true, |age| age > self.max_age)
    }
}

pub(crate) fn read_session_cookie(cookies: &CookieJar<'_>) -> Option<SessionCookie> {
    let cookie = cookies.get_private(SESSION_COOKIE)?;
    serde_json::from_str::<SessionCookie>(cookie.value()).ok()
}

async fn authenticate(req: &Request<'_>) -> Result<AuthenticatedUser, ThingsError> {
    let cookie = read_session_cookie(req.cookies()).ok_or(ThingsError::Unauthorized)?;

    let sessions = req
        .rocket()
        .state::<UserSession>()
        .ok_or(ThingsError::Internal("UserSession is not managed"))?;
    if sessions.is_expired(&cookie) {
        sessions.revoke(&cookie.session_key)?;
        return Err(ThingsError::Unauthorized);
    }

    let sub = sessions
        .lookup(&cookie.session_key)?
        .ok_or(ThingsError::Unauthorized)?;

    let db = req
        .rocket()
        .state::<Db>()
        .ok_or(ThingsError::Internal("database is not managed"))?;
    let user = db
        .find_user_by_sub(sub)
        .await?
        .ok_or(ThingsError::Unauthorized)?;

    Ok(AuthenticatedUser {
        user_id: user.id,
        user,
    })
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ThingsError;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        match authenticate(req).await {
            Ok(user) => Outcome::Success(user),
            Err(err) => {
                tracing::debug!(error = %err, uri = %req.uri(), "rejected unauthenticated request");
                Outcome::Error((err.status(), err))
            }
        }
    }
}
