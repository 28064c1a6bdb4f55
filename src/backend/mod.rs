pub mod client;

pub use client::HttpBackend;

use crate::error::{AuditError, Result};
use crate::models::{ExtractionResponse, InvoiceExtraction, SubmissionAck, SubmissionPayload};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use std::future::Future;

/// 上传的文件内容
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    pub filename: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    #[serde(default)]
    content_base64: String,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
            content_base64: String::new(),
        }
    }

    /// 解码 JSON 上传体中的 base64 内容
    pub fn decoded(mut self) -> Result<Self> {
        if self.filename.trim().is_empty() {
            return Err(AuditError::InvalidUpload("missing filename".to_string()));
        }
        if self.bytes.is_empty() {
            self.bytes = STANDARD
                .decode(self.content_base64.trim())
                .map_err(|e| AuditError::InvalidUpload(format!("{}: {}", self.filename, e)))?;
        }
        self.content_base64.clear();
        if self.bytes.is_empty() {
            return Err(AuditError::InvalidUpload(format!("{} is empty", self.filename)));
        }
        Ok(self)
    }
}

/// 外部抽取/审核后端
pub trait AuditBackend: Send + Sync + 'static {
    fn extract_invoice(
        &self,
        file: UploadedFile,
    ) -> impl Future<Output = Result<InvoiceExtraction>> + Send;

    fn extract_annex(
        &self,
        file: UploadedFile,
    ) -> impl Future<Output = Result<ExtractionResponse>> + Send;

    fn submit_audit(
        &self,
        payload: &SubmissionPayload,
    ) -> impl Future<Output = Result<SubmissionAck>> + Send;
}
