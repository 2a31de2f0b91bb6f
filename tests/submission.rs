#![deny(clippy::all, clippy::pedantic)]

use std::{sync::Arc, time::Duration};

use bytes::Bytes;
use httpmock::MockServer;
use koinonia::{
    application::{
        error::PostFormError,
        form::{FormInstance, FormPhase},
        registry::ConfigRegistry,
        submission::{SubmissionCoordinator, SubmissionError},
        uploader::UploadError,
    },
    config::ApiSettings,
    domain::uploads::{ImageFile, UploadLimits},
    infra::{http::HttpApi, navigation::ConsoleNavigator},
};
use serde_json::json;
use url::Url;

const UPLOAD_PATH: &str = "/api/community/upload-image";

fn api_settings(server: &MockServer, token: Option<&str>) -> ApiSettings {
    ApiSettings {
        base_url: Some(Url::parse(&server.base_url()).expect("mock url")),
        upload_path: UPLOAD_PATH.to_string(),
        token: token.map(str::to_string),
        timeout: Duration::from_secs(5),
    }
}

fn coordinator(settings: &ApiSettings) -> (SubmissionCoordinator, Arc<ConsoleNavigator>) {
    let api = Arc::new(HttpApi::new(settings).expect("http client"));
    let navigator = Arc::new(ConsoleNavigator::new(settings.base_url.clone()));
    (
        SubmissionCoordinator::new(api, navigator.clone(), settings.upload_path.clone()),
        navigator,
    )
}

fn png(name: &str) -> ImageFile {
    ImageFile::new(name, "image/png", Bytes::from_static(b"\x89PNG\r\n\x1a\n"))
}

#[tokio::test]
async fn free_sharing_uploads_in_order_then_posts_urls() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method("POST")
                .path(UPLOAD_PATH)
                .header("authorization", "Bearer church-token")
                .body_includes("filename=\"sofa-1.png\"");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"imageUrl":"https://cdn.example/sofa-1.png"}"#);
        })
        .await;
    let second = server
        .mock_async(|when, then| {
            when.method("POST")
                .path(UPLOAD_PATH)
                .body_includes("filename=\"sofa-2.png\"");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"imageUrl":"https://cdn.example/sofa-2.png"}"#);
        })
        .await;
    let post = server
        .mock_async(|when, then| {
            when.method("POST")
                .path("/api/community/free-sharing")
                .header("authorization", "Bearer church-token")
                .json_body(json!({
                    "title": "Blue sofa",
                    "category": "furniture",
                    "condition": "used",
                    "description": "Three seats, a little worn.",
                    "location": "",
                    "contact_phone": "",
                    "images": [
                        "https://cdn.example/sofa-1.png",
                        "https://cdn.example/sofa-2.png"
                    ],
                    "main_image_index": 1
                }));
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"success":true}"#);
        })
        .await;

    let settings = api_settings(&server, Some("church-token"));
    let (coordinator, navigator) = coordinator(&settings);
    let config = ConfigRegistry::builtin()
        .get_config("free-sharing")
        .expect("free-sharing is generic");
    let mut form = FormInstance::mount(config, UploadLimits::default());
    form.set_field("title", "Blue sofa").expect("title");
    form.set_field("condition", "used").expect("condition");
    form.set_field("description", "Three seats, a little worn.")
        .expect("description");
    form.add_files(vec![png("sofa-1.png"), png("sofa-2.png")])
        .expect("images admitted");
    form.set_main_image(1).expect("main image");

    let receipt = coordinator.submit(&mut form).await.expect("submitted");

    first.assert_async().await;
    second.assert_async().await;
    post.assert_async().await;
    assert_eq!(
        receipt.image_urls,
        vec![
            "https://cdn.example/sofa-1.png",
            "https://cdn.example/sofa-2.png"
        ]
    );
    assert_eq!(form.phase(), FormPhase::Completed);
    assert_eq!(
        navigator.last_destination(),
        Some(format!("{}/community/free-sharing", server.base_url()))
    );
}

#[tokio::test]
async fn failed_upload_stops_before_the_post() {
    let server = MockServer::start_async().await;
    let ok = server
        .mock_async(|when, then| {
            when.method("POST")
                .path(UPLOAD_PATH)
                .body_includes("filename=\"f1.png\"");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"imageUrl":"https://cdn.example/f1.png"}"#);
        })
        .await;
    let broken = server
        .mock_async(|when, then| {
            when.method("POST")
                .path(UPLOAD_PATH)
                .body_includes("filename=\"f2.png\"");
            then.status(500).body("storage offline");
        })
        .await;
    let never = server
        .mock_async(|when, then| {
            when.method("POST")
                .path(UPLOAD_PATH)
                .body_includes("filename=\"f3.png\"");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"imageUrl":"https://cdn.example/f3.png"}"#);
        })
        .await;
    let post = server
        .mock_async(|when, then| {
            when.method("POST").path("/api/community/free-sharing");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"success":true}"#);
        })
        .await;

    let settings = api_settings(&server, None);
    let (coordinator, navigator) = coordinator(&settings);
    let config = ConfigRegistry::builtin()
        .get_config("free-sharing")
        .expect("free-sharing is generic");
    let mut form = FormInstance::mount(config, UploadLimits::default());
    form.set_field("title", "Lamp").expect("title");
    form.set_field("description", "Works fine.").expect("description");
    form.add_files(vec![png("f1.png"), png("f2.png"), png("f3.png")])
        .expect("images admitted");

    let err = coordinator.submit(&mut form).await.expect_err("f2 fails");

    match err {
        PostFormError::Upload(UploadError::Failed {
            ordinal, completed, ..
        }) => {
            assert_eq!(ordinal, 2);
            assert_eq!(completed, 1);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    ok.assert_async().await;
    broken.assert_async().await;
    never.assert_calls_async(0).await;
    post.assert_calls_async(0).await;
    assert_eq!(form.phase(), FormPhase::Editing);
    assert_eq!(form.state().uploads().len(), 3);
    assert!(navigator.last_destination().is_none());
}

#[tokio::test]
async fn rejected_post_keeps_the_form_for_retry() {
    let server = MockServer::start_async().await;
    let post = server
        .mock_async(|when, then| {
            when.method("POST").path("/api/community/job-seeking");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"success":false,"message":"Duplicate post"}"#);
        })
        .await;

    let settings = api_settings(&server, None);
    let (coordinator, navigator) = coordinator(&settings);
    let config = ConfigRegistry::builtin()
        .get_config("job-seeking")
        .expect("job-seeking is generic");
    let mut form = FormInstance::mount(config, UploadLimits::default());
    form.set_field("title", "Looking for work").expect("title");
    form.set_field("desired_field", "Accounting").expect("field");
    form.set_field("introduction", "Ten years in bookkeeping.")
        .expect("introduction");

    let err = coordinator.submit(&mut form).await.expect_err("rejected");

    assert!(matches!(
        err,
        PostFormError::Submission(SubmissionError::Rejected { ref message })
            if message.as_deref() == Some("Duplicate post")
    ));
    post.assert_async().await;
    assert_eq!(form.phase(), FormPhase::Editing);
    assert_eq!(form.state().values().text("title"), Some("Looking for work"));
    assert!(navigator.last_destination().is_none());
}

#[tokio::test]
async fn server_error_on_post_is_a_transport_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method("POST").path("/api/community/job-seeking");
            then.status(503).body("maintenance");
        })
        .await;

    let settings = api_settings(&server, None);
    let (coordinator, _navigator) = coordinator(&settings);
    let config = ConfigRegistry::builtin()
        .get_config("job-seeking")
        .expect("job-seeking is generic");
    let mut form = FormInstance::mount(config, UploadLimits::default());
    form.set_field("title", "Looking for work").expect("title");
    form.set_field("desired_field", "Design").expect("field");
    form.set_field("introduction", "Print and web.").expect("introduction");

    let err = coordinator.submit(&mut form).await.expect_err("unavailable");

    assert!(matches!(err, PostFormError::Submission(SubmissionError::Transport(_))));
    assert!(err.to_string().contains("503"));
    assert_eq!(form.phase(), FormPhase::Editing);
}

#[tokio::test]
async fn validation_failure_makes_no_requests() {
    let server = MockServer::start_async().await;
    let any = server
        .mock_async(|when, then| {
            when.method("POST");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"success":true}"#);
        })
        .await;

    let settings = api_settings(&server, None);
    let (coordinator, _navigator) = coordinator(&settings);
    let config = ConfigRegistry::builtin()
        .get_config("free-sharing")
        .expect("free-sharing is generic");
    let mut form = FormInstance::mount(config, UploadLimits::default());
    form.set_field("title", "Bookshelf").expect("title");
    form.set_field("description", "Oak, two shelves.").expect("description");

    let err = coordinator.submit(&mut form).await.expect_err("no images");

    match err {
        PostFormError::Validation(validation) => assert_eq!(validation.key, "images"),
        other => panic!("unexpected error: {other:?}"),
    }
    any.assert_calls_async(0).await;
    assert_eq!(form.phase(), FormPhase::Editing);
}
