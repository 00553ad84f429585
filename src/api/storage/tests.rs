use rocket::http::{ContentType, Status};

use crate::test_support::{error_message, TestApp};

#[test]
fn uploaded_blobs_are_served_with_their_content_type() {
    let app = TestApp::new();
    app.login("alice");

    let storage_id = app.upload(b"\x89PNG fake");

    let response = app.get(format!("/api/v1/storage/{}", storage_id));
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.content_type(), Some(ContentType::PNG));
    assert_eq!(response.into_bytes(), Some(b"\x89PNG fake".to_vec()));
}

#[test]
fn upload_urls_are_single_use() {
    let app = TestApp::new();
    app.login("alice");
    let url = app.upload_url();

    let first = app.client.post(url.clone()).body("one").dispatch();
    assert_eq!(first.status(), Status::Ok);

    let second = app.client.post(url).body("two").dispatch();
    assert_eq!(second.status(), Status::NotFound);
    assert_eq!(error_message(second), "Upload URL not found");
}

#[test]
fn uploads_over_the_limit_are_rejected() {
    let app = TestApp::new();
    app.login("alice");
    let url = app.upload_url();

    let response = app.client.post(url).body(vec![0u8; 4096]).dispatch();

    assert_eq!(response.status(), Status::PayloadTooLarge);
}

#[test]
fn a_rejected_upload_keeps_the_url_usable() {
    let app = TestApp::new();
    app.login("alice");
    let url = app.upload_url();

    let too_big = app.client.post(url.clone()).body(vec![0u8; 4096]).dispatch();
    assert_eq!(too_big.status(), Status::PayloadTooLarge);

    let empty = app.client.post(url.clone()).dispatch();
    assert_eq!(empty.status(), Status::UnprocessableEntity);

    let retry = app.client.post(url.clone()).body("fits").dispatch();
    assert_eq!(retry.status(), Status::Ok);

    let reused = app.client.post(url).body("again").dispatch();
    assert_eq!(reused.status(), Status::NotFound);
}

#[test]
fn empty_uploads_are_rejected() {
    let app = TestApp::new();
    app.login("alice");
    let url = app.upload_url();

    let response = app.client.post(url).dispatch();

    assert_eq!(response.status(), Status::UnprocessableEntity);
}

#[test]
fn upload_url_does_not_need_the_session_cookie() {
    let app = TestApp::new();
    app.login("alice");
    let url = app.upload_url();
    app.client.post("/api/v1/logout").dispatch();

    let response = app.client.post(url).body("bytes").dispatch();

    assert_eq!(response.status(), Status::Ok);
}

#[test]
fn unknown_and_malformed_storage_ids_are_not_found() {
    let app = TestApp::new();

    assert_eq!(app.blob_status(&"a".repeat(32)), Status::NotFound);
    assert_eq!(app.blob_status("..%2F..%2Fetc%2Fpasswd"), Status::NotFound);
}
