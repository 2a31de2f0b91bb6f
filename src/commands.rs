//! Handlers behind the `koinonia` subcommands.

use std::{path::Path, sync::Arc};

use bytes::Bytes;
use koinonia::{
    application::{
        error::AppError,
        form::FormInstance,
        registry::ConfigRegistry,
        submission::{SubmissionCoordinator, SubmissionReceipt},
    },
    config::{PostTypeArgs, Settings, SubmitArgs},
    domain::{post_types::PostTypeConfig, uploads::ImageFile},
    infra::{http::HttpApi, navigation::ConsoleNavigator},
};
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
struct SubmitOutput {
    #[serde(flatten)]
    receipt: SubmissionReceipt,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

pub fn run_types(registry: &ConfigRegistry) -> Result<(), AppError> {
    print_json(&registry.entries())
}

pub fn run_describe(registry: &ConfigRegistry, args: &PostTypeArgs) -> Result<(), AppError> {
    let config = generic_config(registry, &args.post_type)?;
    print_json(config)
}

pub fn run_create_path(registry: &ConfigRegistry, args: &PostTypeArgs) -> Result<(), AppError> {
    println!("{}", registry.create_path(&args.post_type));
    Ok(())
}

pub async fn run_submit(
    settings: &Settings,
    registry: &ConfigRegistry,
    args: &SubmitArgs,
) -> Result<(), AppError> {
    let config = generic_config(registry, &args.post_type)?;
    let mut form = FormInstance::mount(config, settings.uploads);

    for (key, value) in &args.fields {
        form.set_field(key, value.clone())?;
    }
    for (key, path) in &args.field_files {
        let value = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| AppError::InputFile {
                path: path.clone(),
                source,
            })?;
        form.set_field(key, value)?;
    }

    if !args.images.is_empty() {
        let mut files = Vec::with_capacity(args.images.len());
        for path in &args.images {
            files.push(read_image(path).await?);
        }
        form.add_files(files)?;
    }

    if let Some(index) = args.main_image {
        let selected = form.state().uploads().len();
        if index >= selected {
            return Err(AppError::invalid_input(format!(
                "--main-image {index} is out of range for {selected} selected images"
            )));
        }
        form.set_main_image(index)?;
    }

    let api = Arc::new(HttpApi::new(&settings.api)?);
    let navigator = Arc::new(ConsoleNavigator::new(settings.api.base_url.clone()));
    let coordinator =
        SubmissionCoordinator::new(api, navigator.clone(), settings.api.upload_path.clone());

    info!(post_type = %config.post_type, form_id = %form.id(), "submitting post");
    let receipt = coordinator.submit(&mut form).await?;

    print_json(&SubmitOutput {
        receipt,
        location: navigator.last_destination(),
    })
}

fn generic_config<'r>(
    registry: &'r ConfigRegistry,
    post_type: &str,
) -> Result<&'r PostTypeConfig, AppError> {
    if let Some(config) = registry.get_config(post_type) {
        return Ok(config);
    }
    if registry.is_bespoke_type(post_type) {
        return Err(AppError::BespokePostType {
            post_type: post_type.to_string(),
            create_path: registry.create_path(post_type),
        });
    }
    Err(AppError::UnknownPostType(post_type.to_string()))
}

async fn read_image(path: &Path) -> Result<ImageFile, AppError> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|source| AppError::InputFile {
            path: path.to_path_buf(),
            source,
        })?;
    let name = path
        .file_name()
        .map_or_else(|| "image".to_string(), |name| name.to_string_lossy().into_owned());
    let content_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(ImageFile::new(name, content_type, Bytes::from(data)))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(value)
        .map_err(|err| AppError::unexpected(format!("failed to render output: {err}")))?;
    println!("{out}");
    Ok(())
}
