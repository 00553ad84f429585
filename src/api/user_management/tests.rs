use rocket::http::Status;

use crate::api::user_management::models::User;
use crate::test_support::{error_message, TestApp};

#[test]
fn check_login_requires_a_session() {
    let app = TestApp::new();

    let response = app.client.get("/api/v1/check_login").dispatch();

    assert_eq!(response.status(), Status::Unauthorized);
    assert_eq!(error_message(response), "UNAUTHORIZED");
}

#[test]
fn login_opens_a_session() {
    let app = TestApp::new();

    let user = app.login("alice");
    assert_eq!(user.sub, "alice");
    assert_eq!(user.email, "alice@example.com");

    let response = app.client.get("/api/v1/check_login").dispatch();
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_json::<User>(), Some(user));
}

#[test]
fn logging_in_again_keeps_the_same_user() {
    let app = TestApp::new();

    let first = app.login("alice");
    app.login("bob");
    let again = app.login("alice");

    assert_eq!(first.id, again.id);
}

#[test]
fn invalid_tokens_are_rejected() {
    let app = TestApp::new();

    let response = app.client.post("/api/v1/login").body("invalid").dispatch();

    assert_eq!(response.status(), Status::Unauthorized);
    assert_eq!(error_message(response), "Couldn't validate identity token");
    assert_eq!(
        app.client.get("/api/v1/check_login").dispatch().status(),
        Status::Unauthorized
    );
}

#[test]
fn logout_ends_the_session() {
    let app = TestApp::new();
    app.login("alice");

    let response = app.client.post("/api/v1/logout").dispatch();
    assert_eq!(response.status(), Status::Ok);

    assert_eq!(
        app.client.get("/api/v1/check_login").dispatch().status(),
        Status::Unauthorized
    );
}

#[test]
fn logout_without_a_session_is_fine() {
    let app = TestApp::new();

    let response = app.client.post("/api/v1/logout").dispatch();

    assert_eq!(response.status(), Status::Ok);
}
