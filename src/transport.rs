use std::future::Future;

use reqwest::multipart::{Form, Part};

use crate::{error::TransportError, file::SelectedFile, mode::Mode};

/// Base URL of the hosted inference service.
pub const DEFAULT_BASE_URL: &str = "https://prasanta4-my-model-deployment.hf.space";

/// Where the inference service lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    /// URL the mode's path segment is appended to.
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Returns the endpoint URL for the given mode, e.g. `<base>/explain`.
    pub fn endpoint(&self, mode: Mode) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), mode.as_str())
    }
}

/// Trait for delivering an uploaded image to the inference service.
///
/// Implementors perform exactly one request per call and never retry. A
/// non-2xx status must be reported as [`TransportError::Status`]; on success
/// the raw response body is returned for parsing by the caller.
pub trait Transport {
    fn send(
        &self,
        mode: Mode,
        file: &SelectedFile,
    ) -> impl Future<Output = Result<Vec<u8>, TransportError>> + Send;
}

/// [`Transport`] posting a multipart form with a single `file` field.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTransport {
    /// Creates a transport with a default reqwest client.
    pub fn new(config: ClientConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    /// Creates a transport that reuses an existing reqwest client.
    pub fn with_client(client: reqwest::Client, config: ClientConfig) -> Self {
        Self { client, config }
    }
}

impl Transport for HttpTransport {
    async fn send(&self, mode: Mode, file: &SelectedFile) -> Result<Vec<u8>, TransportError> {
        let endpoint = self.config.endpoint(mode);
        log::debug!("Posting {} ({} bytes) to {}", file.name(), file.size(), endpoint);

        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(body.to_vec())
    }
}
