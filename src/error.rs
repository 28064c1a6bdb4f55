use crate::service::wizard::WizardError;
use thiserror::Error;

/// 审核服务统一错误
#[derive(Error, Debug)]
pub enum AuditError {
    #[error("backend request failed: {0}")]
    Backend(#[from] reqwest::Error),

    #[error("backend rejected request ({status}): {message}")]
    BackendRejected { status: String, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot decode extraction payload: {0}")]
    Decode(String),

    #[error("cannot parse amount '{0}'")]
    Amount(String),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error("session {0} not found")]
    SessionNotFound(String),

    #[error("invalid upload: {0}")]
    InvalidUpload(String),

    #[error("report error: {0}")]
    Report(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, AuditError>;
