use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use url::Url;

use crate::config::ClientConfig;
use crate::providers::traits::ChatBackend;
use crate::providers::types::{
    BackendError, FileUpload, GenerateRequest, GenerateResponse, UploadReply, UploadResponse,
};

/// Talks to the generation service over HTTP.
///
/// The client keeps a cookie store so the `session_id` cookie set by the
/// service travels with every later request.
pub struct HttpBackend {
    client: Client,
    session_url: Url,
    generate_url: Url,
    upload_url: Url,
}

impl HttpBackend {
    pub fn new(config: &ClientConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| BackendError::Network(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: Client, config: &ClientConfig) -> Result<Self, BackendError> {
        let endpoint = |path: &str| {
            config
                .endpoint(path)
                .map_err(|e| BackendError::InvalidEndpoint(format!("{:#}", e)))
        };
        Ok(Self {
            client,
            session_url: endpoint("/")?,
            generate_url: endpoint(&config.generate_path)?,
            upload_url: endpoint(&config.upload_path)?,
        })
    }

    fn parse_detail(body: &str) -> Option<String> {
        serde_json::from_str::<UploadResponse>(body)
            .ok()
            .and_then(|parsed| parsed.detail)
    }
}

#[async_trait]
impl ChatBackend for HttpBackend {
    async fn open_session(&self) -> Result<(), BackendError> {
        let response = self
            .client
            .get(self.session_url.clone())
            .send()
            .await
            .map_err(|e| {
                BackendError::Network(format!("Failed to connect to {}: {}", self.session_url, e))
            })?;

        if !response.status().is_success() {
            return Err(BackendError::Server {
                status: response.status().as_u16(),
                detail: None,
            });
        }
        Ok(())
    }

    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, BackendError> {
        let response = self
            .client
            .post(self.generate_url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                BackendError::Network(format!("Failed to connect to {}: {}", self.generate_url, e))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Server {
                status,
                detail: Self::parse_detail(&body),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(format!("Failed to read response: {}", e)))?;
        serde_json::from_str::<GenerateResponse>(&body)
            .map_err(|e| BackendError::MalformedResponse(format!("Failed to parse response: {}", e)))
    }

    async fn upload_file(&self, file: FileUpload) -> Result<UploadReply, BackendError> {
        let part = Part::bytes(file.data.to_vec()).file_name(file.file_name.clone());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.upload_url.clone())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                BackendError::Network(format!("Failed to connect to {}: {}", self.upload_url, e))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| BackendError::Network(format!("Failed to read response: {}", e)))?;
        let parsed = serde_json::from_str::<UploadResponse>(&body).map_err(|e| {
            BackendError::MalformedResponse(format!("Failed to parse upload response: {}", e))
        })?;

        Ok(UploadReply {
            success: status.is_success(),
            status: status.as_u16(),
            body: parsed,
        })
    }
}
