//! Declarative field model for community post forms.
//!
//! A [`FieldSpec`] describes one input of a post form. Its [`FieldKind`] is a
//! closed set of nine kinds; constraints that only make sense for some kinds
//! live inside the variant payload (`max_length` on text-like kinds, `options`
//! on selects) so an impossible combination cannot be declared.

use std::collections::BTreeMap;

use serde::Serialize;

use super::uploads::UploadState;

/// Format rule attached to a field: returns an error message for a bad value.
pub type ValidationFn = fn(&str) -> Option<String>;

/// One entry of a select field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    Text {
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    Textarea {
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    Select {
        options: Vec<SelectOption>,
    },
    Email {
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    Tel {
        #[serde(skip_serializing_if = "Option::is_none")]
        max_length: Option<usize>,
    },
    Date,
    Time,
    Number,
    Images,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Text { .. } => "text",
            FieldKind::Textarea { .. } => "textarea",
            FieldKind::Select { .. } => "select",
            FieldKind::Email { .. } => "email",
            FieldKind::Tel { .. } => "tel",
            FieldKind::Date => "date",
            FieldKind::Time => "time",
            FieldKind::Number => "number",
            FieldKind::Images => "images",
        }
    }

    /// Kinds that accept free text and therefore a length limit.
    pub fn is_text_like(&self) -> bool {
        matches!(
            self,
            FieldKind::Text { .. }
                | FieldKind::Textarea { .. }
                | FieldKind::Email { .. }
                | FieldKind::Tel { .. }
        )
    }

    pub fn is_images(&self) -> bool {
        matches!(self, FieldKind::Images)
    }

    pub fn max_length(&self) -> Option<usize> {
        match self {
            FieldKind::Text { max_length }
            | FieldKind::Textarea { max_length }
            | FieldKind::Email { max_length }
            | FieldKind::Tel { max_length } => *max_length,
            _ => None,
        }
    }

    pub fn options(&self) -> Option<&[SelectOption]> {
        match self {
            FieldKind::Select { options } => Some(options),
            _ => None,
        }
    }

    /// Initial value of a freshly mounted form.
    pub fn default_value(&self) -> FieldValue {
        match self {
            FieldKind::Images => FieldValue::Images(Vec::new()),
            FieldKind::Select { options } => FieldValue::Text(
                options
                    .first()
                    .map(|option| option.value.clone())
                    .unwrap_or_default(),
            ),
            _ => FieldValue::Text(String::new()),
        }
    }
}

/// Current value of one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    /// Remote URLs, in selection order.
    Images(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            FieldValue::Images(_) => None,
        }
    }

    pub fn to_json(&self) -> serde_json::Value {
        match self {
            FieldValue::Text(text) => serde_json::Value::String(text.clone()),
            FieldValue::Images(urls) => serde_json::Value::Array(
                urls.iter()
                    .cloned()
                    .map(serde_json::Value::String)
                    .collect(),
            ),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: FieldKind,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip)]
    pub validation: Option<ValidationFn>,
}

impl FieldSpec {
    pub fn new(key: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            kind,
            required: false,
            placeholder: None,
            validation: None,
        }
    }

    pub fn text(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Text { max_length: None })
    }

    pub fn textarea(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Textarea { max_length: None })
    }

    pub fn select(
        key: impl Into<String>,
        label: impl Into<String>,
        options: Vec<SelectOption>,
    ) -> Self {
        Self::new(key, label, FieldKind::Select { options })
    }

    pub fn email(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Email { max_length: None })
    }

    pub fn tel(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Tel { max_length: None })
    }

    pub fn date(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Date)
    }

    pub fn time(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Time)
    }

    pub fn number(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Number)
    }

    pub fn images(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self::new(key, label, FieldKind::Images)
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Limit input length. Ignored for kinds that are not text-like.
    #[must_use]
    pub fn max_length(mut self, limit: usize) -> Self {
        match &mut self.kind {
            FieldKind::Text { max_length }
            | FieldKind::Textarea { max_length }
            | FieldKind::Email { max_length }
            | FieldKind::Tel { max_length } => *max_length = Some(limit),
            _ => {}
        }
        self
    }

    #[must_use]
    pub fn validate(mut self, rule: ValidationFn) -> Self {
        self.validation = Some(rule);
        self
    }

    pub fn default_value(&self) -> FieldValue {
        self.kind.default_value()
    }

    /// Whether the required rule is met. Images are judged by the local
    /// selection, everything else by the trimmed text.
    pub fn required_satisfied(&self, value: Option<&FieldValue>, uploads: &UploadState) -> bool {
        if self.kind.is_images() {
            return !uploads.is_empty();
        }
        value
            .and_then(FieldValue::as_text)
            .is_some_and(|text| !text.trim().is_empty())
    }

    /// Run the custom format rule. Empty values are never checked, so an
    /// optional field may always be left blank.
    pub fn format_error(&self, value: Option<&FieldValue>) -> Option<String> {
        let rule = self.validation?;
        let text = value.and_then(FieldValue::as_text)?;
        if text.trim().is_empty() {
            return None;
        }
        rule(text)
    }

    /// Apply the input-time length limit, counted in characters.
    pub fn clamp_input(&self, value: String) -> String {
        match self.kind.max_length() {
            Some(limit) if value.chars().count() > limit => value.chars().take(limit).collect(),
            _ => value,
        }
    }
}

/// Current values of one form instance, keyed by field key.
///
/// The key set is fixed at construction to the keys of the config's fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct FormValues {
    entries: BTreeMap<String, FieldValue>,
}

impl FormValues {
    pub fn for_fields(fields: &[FieldSpec]) -> Self {
        let entries = fields
            .iter()
            .map(|field| (field.key.clone(), field.default_value()))
            .collect();
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.entries.get(key)
    }

    pub fn text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FieldValue::as_text)
    }

    /// Replace the value of an existing key. Unknown keys are refused so the
    /// key set never drifts from the config.
    pub fn set(&mut self, key: &str, value: FieldValue) -> bool {
        match self.entries.get_mut(key) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
