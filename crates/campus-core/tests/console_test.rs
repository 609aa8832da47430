#![allow(clippy::unwrap_used)]
// Integration tests for `Console` against a mocked backend and media host.

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use campus_core::{
    AcademicYear, ActivityQuery, Attachment, ClassSection, Command, CommandResult, Console,
    ConsoleConfig, CoreError, MediaConfig, NewActivity, NewNotification,
};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(with_media: bool) -> (MockServer, Console) {
    let server = MockServer::start().await;
    let base = Url::parse(&server.uri()).unwrap();
    let media = with_media.then(|| MediaConfig {
        upload_url: base.join("v1_1/campus/auto/upload").unwrap(),
        preset: "console_unsigned".into(),
        folder: Some("notices".into()),
    });
    let config = ConsoleConfig {
        backend_url: Some(base),
        media,
        ..ConsoleConfig::default()
    };
    (server, Console::new(&config).unwrap())
}

fn date(s: &str) -> NaiveDate {
    s.parse().unwrap()
}

// ── Construction ────────────────────────────────────────────────────

#[test]
fn test_missing_backend_url_is_config_error() {
    let err = Console::new(&ConsoleConfig::default()).err().unwrap();
    assert!(matches!(err, CoreError::Config { .. }), "got: {err:?}");
}

// ── Activities ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_activities_grouped_by_year() {
    let (server, console) = setup(false).await;

    Mock::given(method("GET"))
        .and(path("/api/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "a1", "name": "Hackathon", "year": 3, "startDate": "2025-03-01", "endDate": "2025-03-02", "description": "48h build" },
            { "_id": "a2", "name": "Orientation", "year": "1", "startDate": "2025-07-15", "endDate": "2025-07-15", "description": "Welcome week" },
            { "_id": "a3", "name": "Alumni Talk", "year": "staff", "startDate": "2025-04-10", "endDate": "2025-04-10", "description": "Career talk" },
            { "_id": "a4", "name": "Code Sprint", "year": 3, "startDate": "2025-05-01", "endDate": "2025-05-01", "description": "Open source" },
        ])))
        .mount(&server)
        .await;

    let groups = console.activities(&ActivityQuery::default()).await.unwrap();

    let shape: Vec<(Option<AcademicYear>, Vec<&str>)> = groups
        .iter()
        .map(|g| {
            (
                g.year,
                g.activities.iter().map(|a| a.id.as_str()).collect(),
            )
        })
        .collect();
    assert_eq!(
        shape,
        vec![
            (Some(AcademicYear::First), vec!["a2"]),
            (Some(AcademicYear::Third), vec!["a1", "a4"]),
            (None, vec!["a3"]),
        ]
    );
    assert_eq!(
        groups[0].activities[0].start_date,
        Some(date("2025-07-15"))
    );
}

#[tokio::test]
async fn test_activities_filtered() {
    let (server, console) = setup(false).await;

    Mock::given(method("GET"))
        .and(path("/api/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "a1", "name": "Hackathon", "year": 3, "description": "48h build" },
            { "_id": "a2", "name": "Orientation", "year": 1, "description": "Welcome week" },
            { "_id": "a3", "name": "Hack Night", "year": 1, "description": "Evening session" },
        ])))
        .mount(&server)
        .await;

    let query = ActivityQuery {
        search: Some("HACK".into()),
        year: Some(AcademicYear::First),
    };
    let groups = console.activities(&query).await.unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].activities.len(), 1);
    assert_eq!(groups[0].activities[0].name, "Hack Night");
    assert_eq!(groups[0].activities[0].start_date, None);
}

#[tokio::test]
async fn test_create_activity_sends_wire_format() {
    let (server, console) = setup(false).await;

    Mock::given(method("POST"))
        .and(path("/api/activities"))
        .and(body_json(json!({
            "name": "Sports Meet",
            "year": "2",
            "startDate": "2025-01-20",
            "endDate": "2025-01-22",
            "description": "Annual athletics"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "_id": "new-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let activity = NewActivity::new(
        " Sports Meet ",
        AcademicYear::Second,
        date("2025-01-20"),
        date("2025-01-22"),
        "Annual athletics",
    )
    .unwrap();
    let result = console
        .execute(Command::CreateActivity(activity))
        .await
        .unwrap();

    assert_eq!(
        result,
        CommandResult::Created {
            id: Some("new-1".into())
        }
    );
}

#[tokio::test]
async fn test_invalid_activity_never_reaches_backend() {
    let (server, console) = setup(false).await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let activity = NewActivity {
        name: "Backwards".into(),
        year: AcademicYear::Fourth,
        start_date: date("2025-02-10"),
        end_date: date("2025-02-01"),
        description: "Ends before it starts".into(),
    };
    let err = console
        .execute(Command::CreateActivity(activity))
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_import_calendar() {
    let (server, console) = setup(false).await;

    Mock::given(method("POST"))
        .and(path("/api/upload-calendar"))
        .and(body_string_contains("name=\"pdf\""))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "count": 7, "text": "..." })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = console
        .execute(Command::ImportCalendar {
            file_name: "calendar.pdf".into(),
            bytes: b"%PDF-1.7".to_vec(),
        })
        .await
        .unwrap();

    let CommandResult::CalendarImported(import) = result else {
        panic!("unexpected result: {result:?}");
    };
    assert_eq!(import.count, 7);
}

// ── Gallery ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_upload_image_hosts_then_registers() {
    let (server, console) = setup(true).await;

    Mock::given(method("POST"))
        .and(path("/v1_1/campus/auto/upload"))
        .and(body_string_contains("console_unsigned"))
        .and(body_string_contains("filename=\"fest.jpg\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secure_url": "https://cdn.example/campus/fest.jpg",
            "public_id": "campus/fest"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/images"))
        .and(body_json(json!({
            "name": "Fest",
            "imageUrl": "https://cdn.example/campus/fest.jpg"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "_id": "img-9" })))
        .expect(1)
        .mount(&server)
        .await;

    let result = console
        .execute(Command::UploadImage {
            name: "Fest".into(),
            file_name: "fest.jpg".into(),
            bytes: b"JFIF fest photo".to_vec(),
        })
        .await
        .unwrap();

    assert_eq!(
        result,
        CommandResult::Uploaded {
            id: Some("img-9".into()),
            url: "https://cdn.example/campus/fest.jpg".into(),
        }
    );
}

#[tokio::test]
async fn test_upload_image_without_media_host() {
    let (_server, console) = setup(false).await;

    let err = console
        .execute(Command::UploadImage {
            name: "Fest".into(),
            file_name: "fest.jpg".into(),
            bytes: vec![1, 2, 3],
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Config { .. }), "got: {err:?}");
}

#[tokio::test]
async fn test_images_search() {
    let (server, console) = setup(false).await;

    Mock::given(method("GET"))
        .and(path("/api/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "i1", "name": "Annual Fest", "imageUrl": "https://cdn.example/1.jpg" },
            { "_id": "i2", "name": "Lab Tour", "imageUrl": "https://cdn.example/2.jpg" },
        ])))
        .mount(&server)
        .await;

    let all = console.images(None).await.unwrap();
    assert_eq!(all.len(), 2);

    let fest = console.images(Some("fest")).await.unwrap();
    assert_eq!(fest.len(), 1);
    assert_eq!(fest[0].url, "https://cdn.example/1.jpg");
}

// ── Notifications ───────────────────────────────────────────────────

#[tokio::test]
async fn test_send_notification_with_attachment() {
    let (server, console) = setup(true).await;

    Mock::given(method("POST"))
        .and(path("/v1_1/campus/auto/upload"))
        .and(body_string_contains("notices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "secure_url": "https://cdn.example/notices/timetable.pdf"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/notification"))
        .and(body_json(json!({
            "sender": "HOD",
            "receiver": "3-a",
            "message": "Revised timetable",
            "mediaUrl": "https://cdn.example/notices/timetable.pdf"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "_id": "n-1" })))
        .expect(1)
        .mount(&server)
        .await;

    let receiver: ClassSection = "3-A".parse().unwrap();
    let notification = NewNotification::new(None, receiver, "Revised timetable")
        .unwrap()
        .with_attachment(Attachment {
            file_name: "timetable.pdf".into(),
            bytes: b"%PDF".to_vec(),
        });
    let result = console
        .execute(Command::SendNotification(notification))
        .await
        .unwrap();

    assert!(matches!(result, CommandResult::Uploaded { .. }), "got: {result:?}");
}

#[tokio::test]
async fn test_send_plain_notification_skips_media_host() {
    let (server, console) = setup(true).await;

    Mock::given(method("POST"))
        .and(path("/v1_1/campus/auto/upload"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/notification"))
        .and(body_json(json!({
            "sender": "Principal",
            "receiver": "1-b",
            "message": "Holiday tomorrow"
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let notification = NewNotification::new(
        Some("Principal".into()),
        "1-b".parse().unwrap(),
        "Holiday tomorrow",
    )
    .unwrap();
    let result = console
        .execute(Command::SendNotification(notification))
        .await
        .unwrap();

    assert_eq!(result, CommandResult::Created { id: None });
}

#[tokio::test]
async fn test_notifications_filtered_by_receiver() {
    let (server, console) = setup(false).await;

    Mock::given(method("GET"))
        .and(path("/api/notification"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "_id": "n1", "sender": "HOD", "receiver": "2-a", "message": "Quiz", "createdAt": "2025-03-01T09:30:00Z" },
            { "_id": "n2", "sender": "HOD", "receiver": "2-b", "message": "Lab", "mediaUrl": "" },
        ])))
        .mount(&server)
        .await;

    let all = console.notifications(None).await.unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[0].created_at.is_some());
    assert_eq!(all[1].media_url, None);

    let only = console.notifications(Some("2-A")).await.unwrap();
    assert_eq!(only.len(), 1);
    assert_eq!(only[0].id, "n1");
}

#[tokio::test]
async fn test_delete_missing_notification_is_not_found() {
    let (server, console) = setup(false).await;

    Mock::given(method("DELETE"))
        .and(path("/api/notification/ghost"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Notification not found" })),
        )
        .mount(&server)
        .await;

    let err = console
        .execute(Command::DeleteNotification { id: "ghost".into() })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }), "got: {err:?}");
}

// ── Liveness ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_ping() {
    let (server, console) = setup(false).await;

    Mock::given(method("GET"))
        .and(path("/wakeup"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    console.ping().await.unwrap();
}
