pub mod handlers;
pub mod store;

pub use handlers::*;
pub use store::SessionStore;

use crate::backend::AuditBackend;
use crate::config::DEFAULT_MAX_UPLOAD_BYTES;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// 共享状态：会话表与后端客户端
pub struct AppState<B> {
    pub sessions: Arc<SessionStore>,
    pub backend: Arc<B>,
    pub max_upload_bytes: usize,
}

impl<B> AppState<B> {
    pub fn new(backend: B) -> Self {
        Self {
            sessions: Arc::new(SessionStore::new()),
            backend: Arc::new(backend),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn with_upload_limit(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }
}

impl<B> Clone for AppState<B> {
    fn clone(&self) -> Self {
        Self {
            sessions: Arc::clone(&self.sessions),
            backend: Arc::clone(&self.backend),
            max_upload_bytes: self.max_upload_bytes,
        }
    }
}

/// 构建路由
pub fn router<B: AuditBackend>(state: AppState<B>) -> Router {
    // 文件以 base64 放在 JSON 中上传，axum 默认 2 MB 上限不够
    let body_limit = DefaultBodyLimit::max(state.max_upload_bytes);
    let session_routes = Router::new()
        .route("/api/sessions", post(create_session::<B>))
        .route(
            "/api/sessions/:id",
            get(get_session::<B>).delete(delete_session::<B>),
        )
        .route(
            "/api/sessions/:id/invoice",
            post(upload_invoice::<B>).put(correct_invoice::<B>),
        )
        .route("/api/sessions/:id/confirm", post(confirm_invoice::<B>))
        .route("/api/sessions/:id/annexes", post(upload_annexes::<B>))
        .route("/api/sessions/:id/annexes/:index", delete(remove_annex::<B>))
        .route("/api/sessions/:id/reconciliation", get(reconciliation::<B>))
        .route("/api/sessions/:id/report.csv", get(reconciliation_report::<B>))
        .route("/api/sessions/:id/submit", post(submit::<B>))
        .with_state(state);

    Router::new()
        .route("/health", get(health_check))
        .merge(session_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(body_limit),
        )
}
