//! End-to-end submission of a community post form.

use std::sync::Arc;

use koinonia_api_types::{MAIN_IMAGE_INDEX_KEY, PostPayload, SubmitResponse};
use metrics::counter;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{fields::FormValues, post_types::PostTypeConfig};

use super::error::PostFormError;
use super::form::{FormAction, FormInstance, FormPhase};
use super::ports::{ApiClient, Navigator, TransportError};
use super::uploader::{ImageUploadOrchestrator, UploadCancel};
use super::validator::validate_all;

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("could not reach the server: {0}")]
    Transport(#[from] TransportError),
    #[error(
        "the server did not accept the post: {}",
        .message.as_deref().unwrap_or("no reason given")
    )]
    Rejected { message: Option<String> },
    #[error("the server sent a response without a success flag")]
    Malformed,
}

/// What the user sees after a post is created.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionReceipt {
    pub post_type: String,
    pub message: String,
    pub list_path: String,
    pub image_urls: Vec<String>,
}

/// Build the JSON body for `config.submit_endpoint`.
///
/// Every field is copied verbatim under its key, except the images field,
/// which carries the uploaded URLs. `main_image_index` is present only when at
/// least one image was uploaded.
pub fn compose_payload(
    config: &PostTypeConfig,
    values: &FormValues,
    image_urls: &[String],
    main_image_index: usize,
) -> PostPayload {
    let mut payload = PostPayload::new();
    for field in &config.fields {
        let value = if field.kind.is_images() {
            serde_json::Value::Array(
                image_urls
                    .iter()
                    .cloned()
                    .map(serde_json::Value::String)
                    .collect(),
            )
        } else {
            values
                .get(&field.key)
                .map_or_else(|| field.default_value().to_json(), |value| value.to_json())
        };
        payload.insert(field.key.clone(), value);
    }
    if !image_urls.is_empty() {
        payload.insert(MAIN_IMAGE_INDEX_KEY.to_string(), main_image_index.into());
    }
    payload
}

fn interpret_response(body: serde_json::Value) -> Result<(), SubmissionError> {
    match SubmitResponse::from_value(body) {
        Some(response) if response.success => Ok(()),
        Some(response) => Err(SubmissionError::Rejected {
            message: response.message,
        }),
        None => Err(SubmissionError::Malformed),
    }
}

#[derive(Clone)]
pub struct SubmissionCoordinator {
    api: Arc<dyn ApiClient>,
    navigator: Arc<dyn Navigator>,
    uploader: ImageUploadOrchestrator,
}

impl SubmissionCoordinator {
    pub fn new(
        api: Arc<dyn ApiClient>,
        navigator: Arc<dyn Navigator>,
        upload_endpoint: impl Into<String>,
    ) -> Self {
        let uploader = ImageUploadOrchestrator::new(api.clone(), upload_endpoint);
        Self {
            api,
            navigator,
            uploader,
        }
    }

    /// Stops a running submission before its next image upload.
    pub fn cancel_handle(&self) -> UploadCancel {
        self.uploader.cancel_handle()
    }

    /// Validate, upload, submit and navigate.
    ///
    /// On any failure the form returns to editing with its values and image
    /// selection untouched so the user can retry.
    pub async fn submit(
        &self,
        form: &mut FormInstance<'_>,
    ) -> Result<SubmissionReceipt, PostFormError> {
        let config = form.config();
        form.dispatch(FormAction::Advance(FormPhase::Validating))?;
        self.uploader.cancel_handle().reset();

        if let Err(err) = validate_all(config, form.state().values(), form.state().uploads()) {
            info!(
                post_type = %config.post_type,
                form_id = %form.id(),
                field = %err.key,
                "post form failed validation"
            );
            form.dispatch(FormAction::Advance(FormPhase::Editing))?;
            return Err(err.into());
        }

        let image_urls = if config.has_images() {
            form.dispatch(FormAction::Advance(FormPhase::Uploading))?;
            match self.uploader.upload(form.state().uploads().files()).await {
                Ok(urls) => urls,
                Err(err) => {
                    form.dispatch(FormAction::Advance(FormPhase::Editing))?;
                    return Err(err.into());
                }
            }
        } else {
            Vec::new()
        };

        let payload = compose_payload(
            config,
            form.state().values(),
            &image_urls,
            form.state().uploads().main_image_index(),
        );

        form.dispatch(FormAction::Advance(FormPhase::Submitting))?;
        let outcome = match self.api.post_json(&config.submit_endpoint, &payload).await {
            Ok(body) => interpret_response(body),
            Err(err) => Err(SubmissionError::from(err)),
        };

        if let Err(err) = outcome {
            counter!("koinonia_post_submit_failed_total").increment(1);
            warn!(
                post_type = %config.post_type,
                form_id = %form.id(),
                endpoint = %config.submit_endpoint,
                error = %err,
                "post submission failed"
            );
            form.dispatch(FormAction::Advance(FormPhase::Editing))?;
            return Err(err.into());
        }

        counter!("koinonia_post_submit_total").increment(1);
        form.dispatch(FormAction::Advance(FormPhase::Completed))?;
        info!(
            post_type = %config.post_type,
            form_id = %form.id(),
            images = image_urls.len(),
            "post created"
        );
        self.navigator.navigate(&config.list_path);

        Ok(SubmissionReceipt {
            post_type: config.post_type.clone(),
            message: config.success_message.clone(),
            list_path: config.list_path.clone(),
            image_urls,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::application::form::FormError;
    use crate::application::uploader::{
        UploadError,
        tests::{RecordingApi, jpeg},
    };
    use crate::domain::{
        fields::{FieldSpec, SelectOption},
        rules,
        uploads::UploadLimits,
    };

    #[derive(Default)]
    struct RecordingNavigator {
        visits: Mutex<Vec<String>>,
    }

    impl Navigator for RecordingNavigator {
        fn navigate(&self, path: &str) {
            self.visits.lock().expect("visits lock").push(path.to_string());
        }
    }

    impl RecordingNavigator {
        fn visits(&self) -> Vec<String> {
            self.visits.lock().expect("visits lock").clone()
        }
    }

    fn sharing_config() -> PostTypeConfig {
        PostTypeConfig::new("free-sharing", "Free sharing")
            .success_message("Thanks for sharing!")
            .field(FieldSpec::text("title", "Title").required())
            .field(FieldSpec::select(
                "condition",
                "Condition",
                vec![SelectOption::new("new", "New"), SelectOption::new("used", "Used")],
            ))
            .field(FieldSpec::email("email", "Email").validate(rules::email))
            .field(FieldSpec::images("images", "Photos").required())
    }

    fn coordinator(
        api: Arc<RecordingApi>,
        navigator: Arc<RecordingNavigator>,
    ) -> SubmissionCoordinator {
        SubmissionCoordinator::new(api, navigator, "/api/upload")
    }

    fn accepting_api() -> RecordingApi {
        RecordingApi {
            post_response: Some(json!({ "success": true })),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn successful_submit_uploads_posts_and_navigates() {
        let config = sharing_config();
        let api = Arc::new(accepting_api());
        let navigator = Arc::new(RecordingNavigator::default());
        let mut form = FormInstance::mount(&config, UploadLimits::default());
        form.set_field("title", "Rocking chair").expect("edit");
        form.add_files(vec![jpeg("a.jpg"), jpeg("b.jpg"), jpeg("c.jpg")])
            .expect("admitted");
        form.set_main_image(2).expect("main");

        let receipt = coordinator(api.clone(), navigator.clone())
            .submit(&mut form)
            .await
            .expect("submitted");

        assert_eq!(receipt.message, "Thanks for sharing!");
        assert_eq!(navigator.visits(), vec!["/community/free-sharing"]);
        assert_eq!(form.phase(), FormPhase::Completed);
        assert!(form.state().uploads().is_empty());

        let posts = api.posts.lock().expect("posts lock");
        let (endpoint, payload) = &posts[0];
        assert_eq!(endpoint, "/api/community/free-sharing");
        assert_eq!(
            serde_json::Value::Object(payload.clone()),
            json!({
                "title": "Rocking chair",
                "condition": "new",
                "email": "",
                "images": [
                    "https://cdn.example/a.jpg",
                    "https://cdn.example/b.jpg",
                    "https://cdn.example/c.jpg"
                ],
                "main_image_index": 2
            })
        );
        assert_eq!(receipt.image_urls.len(), 3);
    }

    #[tokio::test]
    async fn validation_failure_has_no_network_effect() {
        let config = sharing_config();
        let api = Arc::new(accepting_api());
        let navigator = Arc::new(RecordingNavigator::default());
        let mut form = FormInstance::mount(&config, UploadLimits::default());
        form.set_field("title", "Chair").expect("edit");

        let err = coordinator(api.clone(), navigator.clone())
            .submit(&mut form)
            .await
            .expect_err("images missing");

        match err {
            PostFormError::Validation(err) => assert_eq!(err.key, "images"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(api.calls.lock().expect("calls lock").is_empty());
        assert!(navigator.visits().is_empty());
        assert_eq!(form.phase(), FormPhase::Editing);
    }

    #[tokio::test]
    async fn upload_failure_preserves_state() {
        let config = sharing_config();
        let api = Arc::new(RecordingApi {
            failing_uploads: vec!["b.jpg".into()],
            ..accepting_api()
        });
        let navigator = Arc::new(RecordingNavigator::default());
        let mut form = FormInstance::mount(&config, UploadLimits::default());
        form.set_field("title", "Lamp").expect("edit");
        form.add_files(vec![jpeg("a.jpg"), jpeg("b.jpg"), jpeg("c.jpg")])
            .expect("admitted");
        let before = form.state().clone();

        let err = coordinator(api.clone(), navigator.clone())
            .submit(&mut form)
            .await
            .expect_err("upload fails");

        assert!(matches!(
            err,
            PostFormError::Upload(UploadError::Failed { ordinal: 2, .. })
        ));
        assert_eq!(api.upload_calls(), vec!["a.jpg", "b.jpg"]);
        assert_eq!(api.post_count(), 0);
        assert_eq!(form.state(), &before);
        assert!(navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn rejected_post_keeps_state_and_stays_put() {
        let config = sharing_config();
        let api = Arc::new(RecordingApi {
            post_response: Some(json!({ "success": false, "message": "duplicate post" })),
            ..Default::default()
        });
        let navigator = Arc::new(RecordingNavigator::default());
        let mut form = FormInstance::mount(&config, UploadLimits::default());
        form.set_field("title", "Lamp").expect("edit");
        form.add_files(vec![jpeg("a.jpg")]).expect("admitted");
        let before = form.state().clone();

        let err = coordinator(api.clone(), navigator.clone())
            .submit(&mut form)
            .await
            .expect_err("rejected");

        match err {
            PostFormError::Submission(SubmissionError::Rejected { message }) => {
                assert_eq!(message.as_deref(), Some("duplicate post"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(form.state(), &before);
        assert!(navigator.visits().is_empty());
    }

    #[tokio::test]
    async fn malformed_and_transport_failures_are_submission_errors() {
        let config = sharing_config();
        for response in [Some(json!({ "ok": true })), Some(json!("done")), None] {
            let api = Arc::new(RecordingApi {
                post_response: response,
                ..Default::default()
            });
            let navigator = Arc::new(RecordingNavigator::default());
            let mut form = FormInstance::mount(&config, UploadLimits::default());
            form.set_field("title", "Lamp").expect("edit");
            form.add_files(vec![jpeg("a.jpg")]).expect("admitted");

            let err = coordinator(api, navigator.clone())
                .submit(&mut form)
                .await
                .expect_err("not a success");
            assert!(matches!(err, PostFormError::Submission(_)));
            assert_eq!(form.phase(), FormPhase::Editing);
            assert!(navigator.visits().is_empty());
        }
    }

    #[tokio::test]
    async fn retry_after_failure_succeeds_without_reentry() {
        let config = sharing_config();
        let navigator = Arc::new(RecordingNavigator::default());
        let mut form = FormInstance::mount(&config, UploadLimits::default());
        form.set_field("title", "Lamp").expect("edit");
        form.add_files(vec![jpeg("a.jpg")]).expect("admitted");

        let flaky = Arc::new(RecordingApi::default());
        coordinator(flaky, navigator.clone())
            .submit(&mut form)
            .await
            .expect_err("transport down");

        let healthy = Arc::new(accepting_api());
        coordinator(healthy.clone(), navigator.clone())
            .submit(&mut form)
            .await
            .expect("second attempt");
        assert_eq!(healthy.post_count(), 1);
        assert_eq!(navigator.visits().len(), 1);
    }

    #[tokio::test]
    async fn completed_form_cannot_be_resubmitted() {
        let config = sharing_config();
        let api = Arc::new(accepting_api());
        let navigator = Arc::new(RecordingNavigator::default());
        let coordinator = coordinator(api.clone(), navigator);
        let mut form = FormInstance::mount(&config, UploadLimits::default());
        form.set_field("title", "Lamp").expect("edit");
        form.add_files(vec![jpeg("a.jpg")]).expect("admitted");

        coordinator.submit(&mut form).await.expect("first");
        let err = coordinator.submit(&mut form).await.expect_err("terminal");
        assert!(matches!(err, PostFormError::Form(FormError::Completed)));
        assert_eq!(api.post_count(), 1);
    }

    #[test]
    fn payload_without_images_has_no_main_index() {
        let config = PostTypeConfig::new("item-request", "Item request")
            .field(FieldSpec::text("title", "Title"))
            .field(FieldSpec::images("images", "Photos"));
        let mut values = FormValues::for_fields(&config.fields);
        values.set(
            "title",
            crate::domain::fields::FieldValue::Text("Stroller".into()),
        );

        let payload = compose_payload(&config, &values, &[], 0);
        assert_eq!(
            serde_json::Value::Object(payload),
            json!({ "title": "Stroller", "images": [] })
        );
    }

    #[test]
    fn payload_without_images_field_has_no_images_key() {
        let config = PostTypeConfig::new("job-seeking", "Job seeking")
            .field(FieldSpec::number("experience_years", "Years"));
        let values = FormValues::for_fields(&config.fields);
        let payload = compose_payload(&config, &values, &[], 0);
        assert_eq!(
            serde_json::Value::Object(payload),
            json!({ "experience_years": "" })
        );
    }
}
