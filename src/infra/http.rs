//! reqwest-backed implementation of the backend collaborator.

use async_trait::async_trait;
use koinonia_api_types::{IMAGE_PART_NAME, PostPayload};
use reqwest::{
    Client, RequestBuilder, Response,
    multipart::{Form, Part},
};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::application::ports::{ApiClient, TransportError};
use crate::config::ApiSettings;
use crate::domain::uploads::ImageFile;

use super::error::InfraError;

#[derive(Clone, Debug)]
pub struct HttpApi {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl HttpApi {
    pub fn new(settings: &ApiSettings) -> Result<Self, InfraError> {
        let base = settings
            .base_url
            .clone()
            .ok_or_else(|| InfraError::configuration("api.base_url is required to submit posts"))?;
        Self::with_base(base, settings.token.clone(), settings)
    }

    fn with_base(
        mut base: Url,
        token: Option<String>,
        settings: &ApiSettings,
    ) -> Result<Self, InfraError> {
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(settings.timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;
        Ok(Self {
            client,
            base,
            token,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("koinonia/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Resolve an endpoint below the base URL, keeping any base path prefix.
    pub fn url(&self, endpoint: &str) -> Result<Url, TransportError> {
        self.base
            .join(endpoint.trim_start_matches('/'))
            .map_err(|err| TransportError::Endpoint {
                endpoint: endpoint.to_string(),
                reason: err.to_string(),
            })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.token.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn handle(resp: Response) -> Result<Value, TransportError> {
        let status = resp.status();
        let bytes = resp.bytes().await.map_err(TransportError::request)?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        serde_json::from_slice(&bytes).map_err(|err| TransportError::Decode(err.to_string()))
    }
}

#[async_trait]
impl ApiClient for HttpApi {
    async fn upload_image(
        &self,
        endpoint: &str,
        image: &ImageFile,
    ) -> Result<Value, TransportError> {
        let url = self.url(endpoint)?;
        let part = Part::bytes(image.data.to_vec())
            .file_name(image.name.clone())
            .mime_str(&image.content_type)
            .map_err(TransportError::request)?;
        let form = Form::new().part(IMAGE_PART_NAME, part);

        debug!(%url, filename = %image.name, "sending image");
        let resp = self
            .authorize(self.client.post(url))
            .multipart(form)
            .send()
            .await
            .map_err(TransportError::request)?;
        Self::handle(resp).await
    }

    async fn post_json(
        &self,
        endpoint: &str,
        payload: &PostPayload,
    ) -> Result<Value, TransportError> {
        let url = self.url(endpoint)?;

        debug!(%url, fields = payload.len(), "sending post");
        let resp = self
            .authorize(self.client.post(url))
            .json(payload)
            .send()
            .await
            .map_err(TransportError::request)?;
        Self::handle(resp).await
    }
}
