//! Ordered, fail-fast upload of the selected images.
//!
//! Images go out one at a time in selection order. The Nth URL returned
//! belongs to the Nth file, which is what lets `main_image_index` keep its
//! meaning after upload. The first failure stops the stage; images uploaded
//! before it stay on the remote store and nothing deletes them.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use koinonia_api_types::ImageUploadResponse;
use metrics::counter;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::uploads::ImageFile;

use super::ports::{ApiClient, TransportError};

#[derive(Debug, Error)]
pub enum UploadFailure {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("response did not include an image URL")]
    MalformedResponse,
}

#[derive(Debug, Error)]
pub enum UploadError {
    /// `ordinal` is 1-based; `completed` images were stored before it.
    #[error("image {ordinal} ({filename}) failed to upload: {source}")]
    Failed {
        ordinal: usize,
        filename: String,
        completed: usize,
        #[source]
        source: UploadFailure,
    },
    #[error("upload cancelled after {completed} of {total} images")]
    Cancelled { completed: usize, total: usize },
}

/// Shared flag that stops the upload stage before its next image.
///
/// A request already on the wire is never interrupted.
#[derive(Debug, Clone, Default)]
pub struct UploadCancel(Arc<AtomicBool>);

impl UploadCancel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone)]
pub struct ImageUploadOrchestrator {
    api: Arc<dyn ApiClient>,
    endpoint: String,
    cancel: UploadCancel,
}

impl ImageUploadOrchestrator {
    pub fn new(api: Arc<dyn ApiClient>, endpoint: impl Into<String>) -> Self {
        Self {
            api,
            endpoint: endpoint.into(),
            cancel: UploadCancel::new(),
        }
    }

    pub fn cancel_handle(&self) -> UploadCancel {
        self.cancel.clone()
    }

    /// Upload `files` in order and return their URLs in the same order.
    pub async fn upload(&self, files: &[ImageFile]) -> Result<Vec<String>, UploadError> {
        let total = files.len();
        let mut urls = Vec::with_capacity(total);

        for (position, file) in files.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!(completed = position, total, "image upload cancelled");
                return Err(UploadError::Cancelled {
                    completed: position,
                    total,
                });
            }

            debug!(
                ordinal = position + 1,
                total,
                filename = %file.name,
                size_bytes = file.size(),
                "uploading image"
            );
            match self.upload_one(file).await {
                Ok(url) => {
                    counter!("koinonia_image_upload_total").increment(1);
                    urls.push(url);
                }
                Err(source) => {
                    counter!("koinonia_image_upload_failed_total").increment(1);
                    warn!(
                        ordinal = position + 1,
                        total,
                        filename = %file.name,
                        error = %source,
                        "image upload failed; earlier uploads are left in place"
                    );
                    return Err(UploadError::Failed {
                        ordinal: position + 1,
                        filename: file.name.clone(),
                        completed: position,
                        source,
                    });
                }
            }
        }

        Ok(urls)
    }

    async fn upload_one(&self, file: &ImageFile) -> Result<String, UploadFailure> {
        let body = self.api.upload_image(&self.endpoint, file).await?;
        ImageUploadResponse::from_value(body)
            .map(|response| response.image_url)
            .ok_or(UploadFailure::MalformedResponse)
    }
}
