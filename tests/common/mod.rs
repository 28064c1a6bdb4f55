#![allow(dead_code)]

use invoice_audit_rust::models::{
    AnnexShape, ExtractionResponse, InvoiceExtraction, SubmissionAck, SubmissionPayload,
};
use invoice_audit_rust::{AuditBackend, AuditError, Result, UploadedFile};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// 进程内假后端：按文件名返回预置的抽取结果并记录提交
#[derive(Default)]
pub struct FakeBackend {
    pub invoice: Value,
    pub annexes: HashMap<String, ExtractionResponse>,
    pub reject_submissions: AtomicBool,
    pub submitted: Mutex<Vec<SubmissionPayload>>,
    pub extracted: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_invoice(invoice: Value) -> Self {
        Self {
            invoice,
            ..Default::default()
        }
    }

    pub fn flat_annex(mut self, filename: &str, total: &str, items: usize) -> Self {
        let detail: Vec<Value> = (0..items).map(|i| json!({"linea": i})).collect();
        self.annexes.insert(
            filename.to_string(),
            ExtractionResponse {
                status: "success".to_string(),
                mode: AnnexShape::Flat,
                data: Some(json!({"total_items": total, "items_detalle": detail})),
                message: None,
            },
        );
        self
    }

    pub fn hierarchical_annex(mut self, filename: &str, patients: Value) -> Self {
        self.annexes.insert(
            filename.to_string(),
            ExtractionResponse {
                status: "success".to_string(),
                mode: AnnexShape::Hierarchical,
                data: Some(json!({"patients": patients})),
                message: None,
            },
        );
        self
    }

    pub fn submissions(&self) -> Vec<SubmissionPayload> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn extraction_order(&self) -> Vec<String> {
        self.extracted.lock().unwrap().clone()
    }

    pub fn set_reject_submissions(&self, reject: bool) {
        self.reject_submissions.store(reject, Ordering::SeqCst);
    }
}

impl AuditBackend for FakeBackend {
    async fn extract_invoice(&self, _file: UploadedFile) -> Result<InvoiceExtraction> {
        Ok(serde_json::from_value::<InvoiceExtraction>(self.invoice.clone())?)
    }

    async fn extract_annex(&self, file: UploadedFile) -> Result<ExtractionResponse> {
        self.extracted.lock().unwrap().push(file.filename.clone());
        self.annexes
            .get(&file.filename)
            .cloned()
            .ok_or_else(|| AuditError::BackendRejected {
                status: "500".to_string(),
                message: format!("cannot read {}", file.filename),
            })
    }

    async fn submit_audit(&self, payload: &SubmissionPayload) -> Result<SubmissionAck> {
        if self.reject_submissions.load(Ordering::SeqCst) {
            return Err(AuditError::BackendRejected {
                status: "error".to_string(),
                message: "audit queue unavailable".to_string(),
            });
        }
        self.submitted.lock().unwrap().push(payload.clone());
        Ok(SubmissionAck {
            status: "success".to_string(),
            message: None,
        })
    }
}

pub fn upload(filename: &str) -> UploadedFile {
    UploadedFile::new(filename, b"%PDF-1.4".to_vec())
}
