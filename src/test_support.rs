use rocket::http::{ContentType, Status};
use rocket::local::blocking::{Client, LocalResponse};
use serde_json::Value;
use tempfile::TempDir;

use crate::api::thing_management::models::ThingOut;
use crate::api::thing_management::upload_url::UploadUrlOut;
use crate::api::storage::upload::UploadOut;
use crate::api::user_management::identity::{IdentityVerifier, VerifiedIdentity};
use crate::api::user_management::models::User;
use crate::error::ThingsError;
use crate::memory_db::MemoryDatabase;
use crate::settings::Settings;

pub(crate) const DEPLOYMENT_URL: &str = "http://testserver";
pub(crate) const SITE_URL: &str = "http://localhost:3000";

/// Accepts any token as a subject, except `invalid`.
struct FakeIdentity;

#[rocket::async_trait]
impl IdentityVerifier for FakeIdentity {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, ThingsError> {
        if token == "invalid" || token.is_empty() {
            return Err(ThingsError::InvalidToken);
        }

        Ok(VerifiedIdentity {
            sub: token.to_string(),
            name: format!("User {}", token),
            email: format!("{}@example.com", token),
        })
    }
}

pub(crate) fn test_settings(storage: &TempDir) -> Settings {
    Settings {
        google_client_id: "test-client".to_string(),
        deployment_url: DEPLOYMENT_URL.to_string(),
        site_url: SITE_URL.to_string(),
        database_url: None,
        storage_folder: storage.path().display().to_string(),
        max_upload_bytes: 1024,
        upload_url_ttl_secs: 60,
        session_max_age_secs: 60 * 60,
    }
}

/// A server on the in-memory store with blobs in a temp dir. The client
/// keeps cookies, so `login` switches the acting user.
pub(crate) struct TestApp {
    pub(crate) client: Client,
    _storage: TempDir,
}

impl TestApp {
    pub(crate) fn new() -> TestApp {
        let storage = tempfile::tempdir().expect("temp dir");
        let rocket = crate::build_rocket(
            test_settings(&storage),
            Box::new(MemoryDatabase::default()),
            Box::new(FakeIdentity),
        );

        TestApp {
            client: Client::tracked(rocket).expect("valid rocket instance"),
            _storage: storage,
        }
    }

    pub(crate) fn login(&self, sub: &str) -> User {
        let response = self.client.post("/api/v1/login").body(sub).dispatch();
        assert_eq!(response.status(), Status::Ok);
        response.into_json::<User>().expect("user body")
    }

    pub(crate) fn create_thing(&self, body: Value) -> LocalResponse<'_> {
        self.client
            .post("/api/v1/things")
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
    }

    pub(crate) fn create_titled(&self, title: &str) -> ThingOut {
        let response = self.create_thing(serde_json::json!({ "title": title }));
        assert_eq!(response.status(), Status::Ok);
        response.into_json::<ThingOut>().expect("thing body")
    }

    pub(crate) fn patch_thing(&self, id: i32, body: Value) -> LocalResponse<'_> {
        self.client
            .patch(format!("/api/v1/things/{}", id))
            .header(ContentType::JSON)
            .body(body.to_string())
            .dispatch()
    }

    pub(crate) fn get(&self, uri: String) -> LocalResponse<'_> {
        self.client.get(uri).dispatch()
    }

    /// Path part of an absolute URL handed out by the server.
    pub(crate) fn local_path(url: &str) -> String {
        url.strip_prefix(DEPLOYMENT_URL)
            .expect("url under the deployment url")
            .to_string()
    }

    pub(crate) fn upload_url(&self) -> String {
        let response = self.client.post("/api/v1/things/upload_url").dispatch();
        assert_eq!(response.status(), Status::Ok);
        let out = response.into_json::<UploadUrlOut>().expect("upload url body");
        TestApp::local_path(&out.upload_url)
    }

    /// Uploads as the logged-in user and returns the storage id.
    pub(crate) fn upload(&self, bytes: &[u8]) -> String {
        let response = self
            .client
            .post(self.upload_url())
            .header(ContentType::PNG)
            .body(bytes)
            .dispatch();
        assert_eq!(response.status(), Status::Ok);
        response.into_json::<UploadOut>().expect("upload body").storage_id
    }

    pub(crate) fn blob_status(&self, storage_id: &str) -> Status {
        self.get(format!("/api/v1/storage/{}", storage_id)).status()
    }
}

pub(crate) fn error_message(response: LocalResponse<'_>) -> String {
    response
        .into_json::<crate::error::ApiError>()
        .expect("error body")
        .err
}
