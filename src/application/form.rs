//! Per-instance form state and the reducer that evolves it.
//!
//! All edits and phase changes go through [`FormState::reduce`], which never
//! mutates its input: a rejected action leaves the previous state in place.

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{
    fields::{FieldValue, FormValues},
    post_types::PostTypeConfig,
    uploads::{ImageConstraintError, ImageFile, UploadLimits, UploadState},
};

/// Lifecycle of one form instance.
///
/// `Editing` is both the initial and the retry phase; `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    Editing,
    Validating,
    Uploading,
    Submitting,
    Completed,
}

impl FormPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            FormPhase::Editing => "editing",
            FormPhase::Validating => "validating",
            FormPhase::Uploading => "uploading",
            FormPhase::Submitting => "submitting",
            FormPhase::Completed => "completed",
        }
    }

    /// Any phase between "submit pressed" and a terminal outcome.
    pub fn is_busy(self) -> bool {
        matches!(
            self,
            FormPhase::Validating | FormPhase::Uploading | FormPhase::Submitting
        )
    }

    fn can_advance_to(self, next: FormPhase) -> bool {
        use FormPhase::{Completed, Editing, Submitting, Uploading, Validating};
        matches!(
            (self, next),
            (Editing, Validating)
                | (Validating, Editing | Uploading | Submitting)
                | (Uploading, Editing | Submitting)
                | (Submitting, Editing | Completed)
        )
    }
}

impl fmt::Display for FormPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub enum FormAction {
    FieldChanged { key: String, value: String },
    FilesAdded(Vec<ImageFile>),
    FileRemoved(usize),
    MainImageSet(usize),
    Advance(FormPhase),
}

impl FormAction {
    fn is_edit(&self) -> bool {
        !matches!(self, FormAction::Advance(_))
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("the form is busy ({phase}); wait for the current submission to finish")]
    Busy { phase: FormPhase },
    #[error("the post has already been submitted")]
    Completed,
    #[error("cannot move the form from {from} to {to}")]
    InvalidTransition { from: FormPhase, to: FormPhase },
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("field `{0}` holds images, not text")]
    NotText(String),
    #[error("this form does not collect images")]
    NoImageField,
    #[error(transparent)]
    ImageConstraint(#[from] ImageConstraintError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    values: FormValues,
    uploads: UploadState,
    phase: FormPhase,
}

impl FormState {
    /// Fresh state for `config`: default values, no images, editing.
    pub fn new(config: &PostTypeConfig) -> Self {
        Self {
            values: FormValues::for_fields(&config.fields),
            uploads: UploadState::default(),
            phase: FormPhase::Editing,
        }
    }

    pub fn values(&self) -> &FormValues {
        &self.values
    }

    pub fn uploads(&self) -> &UploadState {
        &self.uploads
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn reduce(
        &self,
        config: &PostTypeConfig,
        limits: &UploadLimits,
        action: FormAction,
    ) -> Result<FormState, FormError> {
        if action.is_edit() {
            match self.phase {
                FormPhase::Editing => {}
                FormPhase::Completed => return Err(FormError::Completed),
                phase => return Err(FormError::Busy { phase }),
            }
        }

        let mut next = self.clone();
        match action {
            FormAction::FieldChanged { key, value } => {
                let field = config
                    .field_by_key(&key)
                    .ok_or_else(|| FormError::UnknownField(key.clone()))?;
                if field.kind.is_images() {
                    return Err(FormError::NotText(key));
                }
                let value = field.clamp_input(value);
                next.values.set(&key, FieldValue::Text(value));
            }
            FormAction::FilesAdded(files) => {
                if !config.has_images() {
                    return Err(FormError::NoImageField);
                }
                next.uploads.add_files(files, limits)?;
            }
            FormAction::FileRemoved(index) => {
                next.uploads.remove_file(index);
            }
            FormAction::MainImageSet(index) => {
                next.uploads.set_main_image(index);
            }
            FormAction::Advance(to) => {
                if self.phase == FormPhase::Completed {
                    return Err(FormError::Completed);
                }
                if to == FormPhase::Validating && self.phase.is_busy() {
                    return Err(FormError::Busy { phase: self.phase });
                }
                if !self.phase.can_advance_to(to) {
                    return Err(FormError::InvalidTransition {
                        from: self.phase,
                        to,
                    });
                }
                if to == FormPhase::Completed {
                    return Ok(FormState {
                        phase: FormPhase::Completed,
                        ..FormState::new(config)
                    });
                }
                next.phase = to;
            }
        }
        Ok(next)
    }
}

/// One mounted form: its config, limits and current state.
#[derive(Debug)]
pub struct FormInstance<'c> {
    id: Uuid,
    config: &'c PostTypeConfig,
    limits: UploadLimits,
    state: FormState,
}

impl<'c> FormInstance<'c> {
    pub fn mount(config: &'c PostTypeConfig, limits: UploadLimits) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            limits,
            state: FormState::new(config),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &'c PostTypeConfig {
        self.config
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn phase(&self) -> FormPhase {
        self.state.phase
    }

    pub fn dispatch(&mut self, action: FormAction) -> Result<(), FormError> {
        self.state = self.state.reduce(self.config, &self.limits, action)?;
        Ok(())
    }

    pub fn set_field(&mut self, key: &str, value: impl Into<String>) -> Result<(), FormError> {
        self.dispatch(FormAction::FieldChanged {
            key: key.to_string(),
            value: value.into(),
        })
    }

    pub fn add_files(&mut self, files: Vec<ImageFile>) -> Result<(), FormError> {
        self.dispatch(FormAction::FilesAdded(files))
    }

    pub fn remove_file(&mut self, index: usize) -> Result<(), FormError> {
        self.dispatch(FormAction::FileRemoved(index))
    }

    pub fn set_main_image(&mut self, index: usize) -> Result<(), FormError> {
        self.dispatch(FormAction::MainImageSet(index))
    }
}
