mod api;
mod blob_storage;
mod cors;
mod db;
mod error;
mod keys;
mod memory_db;
mod schema;
mod settings;

#[cfg(test)]
mod test_support;

#[macro_use]
extern crate rocket;

use std::time::Duration;

use rocket::{Build, Rocket};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

use api::storage::tickets::UploadTickets;
use api::user_management::identity::{GoogleIdentity, Identity};
use api::user_management::sessions::UserSession;
use blob_storage::BlobStorage;
use cors::CORS;
use db::{Db, DbError, PgDatabase};
use memory_db::MemoryDatabase;
use settings::Settings;

#[derive(Debug, Error)]
enum LaunchError {
    #[error("invalid configuration: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Database(#[from] DbError),
    #[error("server failed: {0}")]
    Rocket(#[from] Box<rocket::Error>),
}

#[get("/")]
fn index() -> &'static str {
    "Things Manager"
}

pub(crate) fn build_rocket(settings: Settings, db: Db, identity: Identity) -> Rocket<Build> {
    let blobs = BlobStorage::new(&settings.storage_folder);
    let tickets = UploadTickets::new(Duration::from_secs(settings.upload_url_ttl_secs));
    let sessions = UserSession::new(Duration::from_secs(settings.session_max_age_secs));

    rocket::build()
        .attach(CORS::new(&settings.site_url))
        .manage(db)
        .manage(identity)
        .manage(blobs)
        .manage(tickets)
        .manage(sessions)
        .manage(settings)
        .register("/", catchers![error::default_catcher])
        .mount("/", routes![index, cors::preflight])
        .mount(
            "/api/v1/",
            routes![
                crate::api::user_management::login::login,
                crate::api::user_management::login::logout,
                crate::api::user_management::login::check_login,
                crate::api::thing_management::list::list_things,
                crate::api::thing_management::get_thing::get_thing,
                crate::api::thing_management::create::create_thing,
                crate::api::thing_management::edit::edit_thing,
                crate::api::thing_management::delete::delete_thing,
                crate::api::thing_management::upload_url::generate_upload_url,
                crate::api::storage::upload::upload,
                crate::api::storage::upload::get_blob,
            ],
        )
}

#[rocket::main]
async fn main() -> Result<(), LaunchError> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::new()?;

    let db: Db = match &settings.database_url {
        Some(url) => Box::new(PgDatabase::connect(url)?),
        None => {
            tracing::warn!("DATABASE_URL is not set, things are kept in memory only");
            Box::new(MemoryDatabase::default())
        }
    };
    let identity: Identity = Box::new(GoogleIdentity::new(&settings.google_client_id));

    build_rocket(settings, db, identity)
        .launch()
        .await
        .map_err(Box::new)?;

    Ok(())
}
