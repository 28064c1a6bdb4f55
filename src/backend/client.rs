use super::{AuditBackend, UploadedFile};
use crate::config::BackendConfig;
use crate::error::{AuditError, Result};
use crate::models::{ExtractionResponse, InvoiceExtraction, SubmissionAck, SubmissionPayload};
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

#[derive(Debug, Deserialize)]
struct InvoiceEnvelope {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Option<InvoiceExtraction>,
    #[serde(default)]
    message: Option<String>,
}

/// 基于 HTTP 的抽取/提交后端客户端
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn file_form(file: UploadedFile) -> Form {
        let part = Part::bytes(file.bytes).file_name(file.filename);
        Form::new().part("file", part)
    }

    async fn check_status(resp: Response) -> Result<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(AuditError::BackendRejected {
            status: status.as_u16().to_string(),
            message: body,
        })
    }
}

impl AuditBackend for HttpBackend {
    async fn extract_invoice(&self, file: UploadedFile) -> Result<InvoiceExtraction> {
        let url = self.url("provider/extract-invoice");
        info!("Extracting invoice {} via {}", file.filename, url);

        let resp = self.client.post(&url).multipart(Self::file_form(file)).send().await?;
        let envelope: InvoiceEnvelope = Self::check_status(resp).await?.json().await?;

        if let Some(status) = envelope.status.filter(|s| s != "success") {
            return Err(AuditError::BackendRejected {
                status,
                message: envelope.message.unwrap_or_default(),
            });
        }
        envelope
            .data
            .ok_or_else(|| AuditError::Decode("invoice extraction has no data".to_string()))
    }

    async fn extract_annex(&self, file: UploadedFile) -> Result<ExtractionResponse> {
        let url = self.url("provider/extract-annex");
        info!("Extracting annex {} via {}", file.filename, url);

        let resp = self.client.post(&url).multipart(Self::file_form(file)).send().await?;
        Ok(Self::check_status(resp).await?.json().await?)
    }

    async fn submit_audit(&self, payload: &SubmissionPayload) -> Result<SubmissionAck> {
        let url = self.url("provider/submit-audit");
        info!(
            "Submitting {} with {} annexes to {}",
            payload.session_id,
            payload.annexes_data.len(),
            url
        );

        let resp = self.client.post(&url).json(payload).send().await?;
        let ack: SubmissionAck = Self::check_status(resp).await?.json().await?;
        if ack.status != "success" {
            return Err(AuditError::BackendRejected {
                status: ack.status,
                message: ack.message.unwrap_or_default(),
            });
        }
        Ok(ack)
    }
}
