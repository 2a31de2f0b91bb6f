//! Read-only table of post categories served by the generic form engine.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::domain::{error::DomainError, fields::FieldKind, post_types::PostTypeConfig};

use super::catalog::{BESPOKE_CREATE_ROUTES, builtin_post_types};

static BUILTIN: Lazy<ConfigRegistry> = Lazy::new(|| {
    ConfigRegistry::new(builtin_post_types(), BESPOKE_CREATE_ROUTES)
        .expect("built-in post type table is consistent")
});

/// One row of the category listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryEntry {
    #[serde(rename = "type")]
    pub post_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub common: bool,
    pub create_path: String,
}

#[derive(Debug)]
pub struct ConfigRegistry {
    configs: Vec<PostTypeConfig>,
    index: BTreeMap<String, usize>,
    bespoke: BTreeMap<String, String>,
}

impl ConfigRegistry {
    /// Validate and freeze a table of generic configs plus bespoke routes.
    pub fn new(
        configs: Vec<PostTypeConfig>,
        bespoke: &[(&str, &str)],
    ) -> Result<Self, DomainError> {
        let mut index = BTreeMap::new();
        for (position, config) in configs.iter().enumerate() {
            check_config(config)?;
            if index.insert(config.post_type.clone(), position).is_some() {
                return Err(DomainError::DuplicatePostType {
                    post_type: config.post_type.clone(),
                });
            }
        }

        let mut routes = BTreeMap::new();
        for (post_type, route) in bespoke {
            if index.contains_key(*post_type) {
                return Err(DomainError::ConflictingClassification {
                    post_type: (*post_type).to_string(),
                });
            }
            if routes
                .insert((*post_type).to_string(), (*route).to_string())
                .is_some()
            {
                return Err(DomainError::DuplicatePostType {
                    post_type: (*post_type).to_string(),
                });
            }
        }

        Ok(Self {
            configs,
            index,
            bespoke: routes,
        })
    }

    /// The process-wide registry of built-in categories.
    pub fn builtin() -> &'static ConfigRegistry {
        &BUILTIN
    }

    /// Config for a generic category; `None` for unknown or bespoke keys.
    pub fn get_config(&self, post_type: &str) -> Option<&PostTypeConfig> {
        self.index
            .get(post_type)
            .and_then(|position| self.configs.get(*position))
    }

    pub fn is_common_type(&self, post_type: &str) -> bool {
        self.index.contains_key(post_type)
    }

    pub fn is_bespoke_type(&self, post_type: &str) -> bool {
        self.bespoke.contains_key(post_type)
    }

    /// Route of the create screen. Bespoke categories use their own route;
    /// everything else goes through the generic form.
    pub fn create_path(&self, post_type: &str) -> String {
        match self.bespoke.get(post_type) {
            Some(route) => route.clone(),
            None => format!("/community/{post_type}/create"),
        }
    }

    pub fn configs(&self) -> &[PostTypeConfig] {
        &self.configs
    }

    /// Every known category: generic ones in table order, then bespoke ones.
    pub fn entries(&self) -> Vec<CategoryEntry> {
        let generic = self.configs.iter().map(|config| CategoryEntry {
            post_type: config.post_type.clone(),
            title: Some(config.title.clone()),
            common: true,
            create_path: self.create_path(&config.post_type),
        });
        let bespoke = self.bespoke.iter().map(|(post_type, route)| CategoryEntry {
            post_type: post_type.clone(),
            title: None,
            common: false,
            create_path: route.clone(),
        });
        generic.chain(bespoke).collect()
    }
}

fn check_config(config: &PostTypeConfig) -> Result<(), DomainError> {
    let mut keys = BTreeSet::new();
    let mut images = 0;
    for field in &config.fields {
        if !keys.insert(field.key.as_str()) {
            return Err(DomainError::DuplicateField {
                post_type: config.post_type.clone(),
                key: field.key.clone(),
            });
        }
        match &field.kind {
            FieldKind::Images => images += 1,
            FieldKind::Select { options } if options.is_empty() => {
                return Err(DomainError::EmptyOptions {
                    post_type: config.post_type.clone(),
                    key: field.key.clone(),
                });
            }
            _ => {}
        }
    }
    if images > 1 {
        return Err(DomainError::MultipleImageFields {
            post_type: config.post_type.clone(),
        });
    }
    Ok(())
}
