//! Local image selection and its admission rules.

use bytes::Bytes;
use thiserror::Error;

use crate::util::bytes::format_bytes;

/// Maximum number of images a single post may carry.
pub const MAX_IMAGES: usize = 12;

/// Maximum size of one image in bytes (5 MiB).
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

/// MIME types accepted for post images.
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/gif"];

/// A locally selected image that has not been uploaded yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub name: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// Essence of the content type, lowercased and without parameters.
    pub fn mime_essence(&self) -> String {
        self.content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }
}

/// Admission limits for one selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadLimits {
    pub max_files: usize,
    pub max_file_bytes: u64,
}

impl Default for UploadLimits {
    fn default() -> Self {
        Self {
            max_files: MAX_IMAGES,
            max_file_bytes: MAX_IMAGE_BYTES,
        }
    }
}

/// Reasons a batch of candidate images is refused.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ImageConstraintError {
    #[error(
        "you can attach at most {max} images ({selected} already selected, {} more requested: {})",
        .files.len(),
        .files.join(", ")
    )]
    TooMany {
        selected: usize,
        max: usize,
        files: Vec<String>,
    },
    #[error("images must be {} or smaller: {}", size_label(.limit), .files.join(", "))]
    TooLarge { limit: u64, files: Vec<String> },
    #[error("only JPEG, PNG and GIF images are supported: {}", .files.join(", "))]
    UnsupportedType { files: Vec<String> },
}

impl ImageConstraintError {
    pub fn rule(&self) -> &'static str {
        match self {
            ImageConstraintError::TooMany { .. } => "count",
            ImageConstraintError::TooLarge { .. } => "size",
            ImageConstraintError::UnsupportedType { .. } => "type",
        }
    }

    pub fn files(&self) -> &[String] {
        match self {
            ImageConstraintError::TooMany { files, .. }
            | ImageConstraintError::TooLarge { files, .. }
            | ImageConstraintError::UnsupportedType { files } => files,
        }
    }
}

fn size_label(limit: &u64) -> String {
    format_bytes(*limit)
}

/// Check a batch against the limits without touching any selection.
///
/// Rules are evaluated in the order count, size, type; the first broken rule
/// is reported with every file that breaks it.
pub fn check_batch(
    selected: usize,
    candidates: &[ImageFile],
    limits: &UploadLimits,
) -> Result<(), ImageConstraintError> {
    if selected + candidates.len() > limits.max_files {
        return Err(ImageConstraintError::TooMany {
            selected,
            max: limits.max_files,
            files: candidates.iter().map(|file| file.name.clone()).collect(),
        });
    }

    let oversized: Vec<String> = candidates
        .iter()
        .filter(|file| file.size() > limits.max_file_bytes)
        .map(|file| file.name.clone())
        .collect();
    if !oversized.is_empty() {
        return Err(ImageConstraintError::TooLarge {
            limit: limits.max_file_bytes,
            files: oversized,
        });
    }

    let unsupported: Vec<String> = candidates
        .iter()
        .filter(|file| !ALLOWED_IMAGE_TYPES.contains(&file.mime_essence().as_str()))
        .map(|file| file.name.clone())
        .collect();
    if !unsupported.is_empty() {
        return Err(ImageConstraintError::UnsupportedType { files: unsupported });
    }

    Ok(())
}

/// Ordered selection of local images plus the representative position.
///
/// `main_image_index` is always `< files.len()` when files are present and
/// `0` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadState {
    files: Vec<ImageFile>,
    main_image_index: usize,
}

impl UploadState {
    pub fn files(&self) -> &[ImageFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn main_image_index(&self) -> usize {
        self.main_image_index
    }

    /// Admit the whole batch or nothing. Returns the new selection length.
    pub fn add_files(
        &mut self,
        candidates: Vec<ImageFile>,
        limits: &UploadLimits,
    ) -> Result<usize, ImageConstraintError> {
        check_batch(self.files.len(), &candidates, limits)?;
        self.files.extend(candidates);
        Ok(self.files.len())
    }

    /// Remove one file; out-of-range indexes are ignored.
    pub fn remove_file(&mut self, index: usize) -> Option<ImageFile> {
        if index >= self.files.len() {
            return None;
        }
        let removed = self.files.remove(index);
        let last = self.files.len().saturating_sub(1);
        if index == self.main_image_index || self.main_image_index > last {
            self.main_image_index = self.main_image_index.min(last);
        }
        Some(removed)
    }

    /// Point the representative image at `index`; ignored when out of range.
    pub fn set_main_image(&mut self, index: usize) -> bool {
        if index >= self.files.len() {
            return false;
        }
        self.main_image_index = index;
        true
    }
}
