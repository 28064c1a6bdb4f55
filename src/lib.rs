pub mod api;
pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod service;

pub use api::{router, AppState};
pub use backend::{AuditBackend, HttpBackend, UploadedFile};
pub use config::AppConfig;
pub use error::{AuditError, Result};
pub use service::{WizardSession, WizardState};
