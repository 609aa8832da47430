#![allow(clippy::unwrap_used)]
// Integration tests for `BackendClient` and `MediaUploader` using wiremock.

use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campus_api::backend::{CreateActivityRequest, CreateImageRequest, SendNotificationRequest};
use campus_api::{BackendClient, Error, MediaKind, MediaUploader};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BackendClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = BackendClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

// ── Liveness ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_wakeup() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/wakeup"))
        .respond_with(ResponseTemplate::new(200).set_body_string("awake"))
        .expect(1)
        .mount(&server)
        .await;

    client.wakeup().await.unwrap();
}

#[tokio::test]
async fn test_wakeup_server_error_is_transient() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/wakeup"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = client.wakeup().await.unwrap_err();
    assert!(err.is_transient(), "expected transient error, got: {err:?}");
}

// ── Activities ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_activities() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "_id": "65f1", "name": "Tech Fest", "year": "2",
                "startDate": "2025-03-10", "endDate": "2025-03-12",
                "description": "Annual festival"
            },
            { "_id": "65f2", "name": "Induction", "year": 1 }
        ])))
        .mount(&server)
        .await;

    let activities = client.list_activities().await.unwrap();
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0].id, "65f1");
    assert_eq!(activities[0].start_date, "2025-03-10");
    assert_eq!(activities[1].year.as_number(), Some(1));
}

#[tokio::test]
async fn test_create_activity_posts_camel_case() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/activities"))
        .and(body_json(json!({
            "name": "Workshop",
            "year": "3",
            "startDate": "2025-04-01",
            "endDate": "2025-04-01",
            "description": "Rust for embedded"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "_id": "new-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let id = client
        .create_activity(&CreateActivityRequest {
            name: "Workshop".into(),
            year: "3".into(),
            start_date: "2025-04-01".into(),
            end_date: "2025-04-01".into(),
            description: "Rust for embedded".into(),
        })
        .await
        .unwrap();
    assert_eq!(id.as_deref(), Some("new-1"));
}

#[tokio::test]
async fn test_delete_missing_activity_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/activities/nope"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Activity not found" })),
        )
        .mount(&server)
        .await;

    let err = client.delete_activity("nope").await.unwrap_err();
    assert!(err.is_not_found(), "expected not-found, got: {err:?}");
    match err {
        Error::Backend { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Activity not found");
        }
        other => panic!("expected Backend error, got: {other:?}"),
    }
}

// ── Images ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_image_with_empty_ack() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/images"))
        .and(body_json(json!({ "name": "Lab 3", "imageUrl": "https://cdn/lab3.jpg" })))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let id = client
        .create_image(&CreateImageRequest {
            name: "Lab 3".into(),
            image_url: "https://cdn/lab3.jpg".into(),
        })
        .await
        .unwrap();
    assert_eq!(id, None);
}

#[tokio::test]
async fn test_list_images() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "i1", "name": "Auditorium", "imageUrl": "https://cdn/a.jpg" }
        ])))
        .mount(&server)
        .await;

    let images = client.list_images().await.unwrap();
    assert_eq!(images[0].image_url, "https://cdn/a.jpg");
}

// ── Notifications ───────────────────────────────────────────────────

#[tokio::test]
async fn test_send_notification_with_media() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/notification"))
        .and(body_json(json!({
            "sender": "HOD",
            "receiver": "4-a",
            "message": "Exam schedule attached",
            "mediaUrl": "https://cdn/schedule.pdf"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "message": "sent" })))
        .expect(1)
        .mount(&server)
        .await;

    client
        .send_notification(&SendNotificationRequest {
            sender: "HOD".into(),
            receiver: "4-a".into(),
            message: "Exam schedule attached".into(),
            media_url: Some("https://cdn/schedule.pdf".into()),
        })
        .await
        .unwrap();
}

// ── Calendar ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_calendar() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/upload-calendar"))
        .and(body_string_contains("name=\"pdf\""))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "count": 7, "text": "Odd semester begins" })),
        )
        .mount(&server)
        .await;

    let import = client
        .upload_calendar("calendar.pdf", b"%PDF-1.4 fake".to_vec())
        .await
        .unwrap();
    assert_eq!(import.count, 7);
    assert_eq!(import.text, "Odd semester begins");
}

#[tokio::test]
async fn test_malformed_body_reports_deserialization() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/notification"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = client.list_notifications().await;
    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body.contains("oops")),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Media uploads ───────────────────────────────────────────────────

#[tokio::test]
async fn test_media_upload_returns_secure_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1_1/campus/auto/upload"))
        .and(body_string_contains("campusDisplay"))
        .and(body_string_contains("name=\"folder\""))
        .and(body_string_contains("filename=\"lab.jpg\""))
        .and(body_string_contains("JFIF lab photo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secure_url": "https://res.cdn/campus/lab.jpg",
            "public_id": "campus/lab"
        })))
        .mount(&server)
        .await;

    let uploader = MediaUploader::with_client(
        reqwest::Client::new(),
        Url::parse(&format!("{}/v1_1/campus/auto/upload", server.uri())).unwrap(),
        "campusDisplay",
        Some("campus".into()),
    );

    let asset = uploader
        .upload("lab.jpg", b"JFIF lab photo".to_vec(), MediaKind::Image)
        .await
        .unwrap();
    assert_eq!(asset.secure_url, "https://res.cdn/campus/lab.jpg");
    assert_eq!(asset.public_id.as_deref(), Some("campus/lab"));
}

#[tokio::test]
async fn test_media_upload_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "Upload preset must be whitelisted" }
        })))
        .mount(&server)
        .await;

    let uploader = MediaUploader::with_client(
        reqwest::Client::new(),
        Url::parse(&server.uri()).unwrap(),
        "unknown",
        None,
    );

    let result = uploader.upload("x.png", vec![1, 2, 3], MediaKind::Auto).await;
    match result {
        Err(Error::Upload { message }) => assert!(message.contains("whitelisted")),
        other => panic!("expected Upload error, got: {other:?}"),
    }
}
