use bon::Builder;
use lookalike::{HEALTH_PATH, HealthStatus, SearchResponse, fields};
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use crate::{
    intake::SelectedFile,
    models::config::{ClientConfig, ConfigError},
};

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("request failed: {0}")]
    RequestFailed(String),
    #[error("failed to parse response: {0}")]
    ParseFailed(String),
}

/// Everything sent for one search. Built fresh for every submission.
#[derive(Builder, Clone, Debug)]
pub struct SearchRequest {
    pub file: SelectedFile,
    pub garment_type: String,
    pub garment_layer: String,
}

impl SearchRequest {
    fn into_form(self) -> Result<Form, SearchError> {
        let SearchRequest {
            file,
            garment_type,
            garment_layer,
        } = self;
        let part = Part::bytes(file.bytes.clone())
            .file_name(file.file_name.clone())
            .mime_str(&file.media_type)
            .map_err(|err| SearchError::RequestFailed(err.to_string()))?;
        Ok(Form::new()
            .part(fields::FILE, part)
            .text(fields::GARMENT_TYPE, garment_type)
            .text(fields::GARMENT_LAYER, garment_layer))
    }
}

/// Client for the image search backend.
#[derive(Clone)]
pub struct SearchClient {
    base_url: String,
    process_path: String,
    client: reqwest::Client,
}

impl SearchClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let header_map = config.header_map()?;
        let client = reqwest::Client::builder()
            .default_headers(header_map)
            .build()?;
        Ok(Self {
            base_url: config.base_url().to_string(),
            process_path: config.process_path.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Upload the image and its tags, returning the whole response or an
    /// error. There's no retry and no timeout.
    pub async fn submit(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
        let url = format!("{}{}", self.base_url, self.process_path);
        info!(
            url,
            file_name = request.file.file_name,
            garment_type = request.garment_type,
            garment_layer = request.garment_layer,
            "submitting search"
        );
        let form = request.into_form()?;
        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|err| SearchError::RequestFailed(format!("{err:?}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| SearchError::RequestFailed(format!("{err:?}")))?;
        if !status.is_success() {
            return Err(SearchError::RequestFailed(format!(
                "{status} with content {body}"
            )));
        }

        let response = serde_json::from_str::<SearchResponse>(&body)
            .map_err(|err| SearchError::ParseFailed(err.to_string()))?;
        debug!(description = response.data.description, "parsed search response");
        Ok(response)
    }

    /// Ask the backend whether it's up.
    pub async fn health(&self) -> Result<bool, SearchError> {
        let url = format!("{}{}", self.base_url, HEALTH_PATH);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| SearchError::RequestFailed(format!("{err:?}")))?
            .error_for_status()
            .map_err(|err| SearchError::RequestFailed(format!("{err:?}")))?;
        let status = response
            .json::<HealthStatus>()
            .await
            .map_err(|err| SearchError::ParseFailed(err.to_string()))?;
        Ok(status.is_ok())
    }
}
