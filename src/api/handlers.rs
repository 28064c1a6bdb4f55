use super::AppState;
use crate::backend::{AuditBackend, UploadedFile};
use crate::error::{AuditError, Result};
use crate::models::{InvoiceRecord, ProviderIdentity, ReconciliationOutcome, Routing};
use crate::service::{aggregate_batch, report, AnnexFailure, WizardError, WizardSession};
use axum::{
    extract::{Json, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

/// 通用响应体
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    fn ok(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }
}

/// 会话快照
#[derive(Debug, Serialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    #[serde(flatten)]
    pub session: WizardSession,
    pub reconciliation: Option<ReconciliationOutcome>,
}

impl SessionSnapshot {
    fn of(id: &str, session: &WizardSession) -> Self {
        Self {
            session_id: id.to_string(),
            session: session.clone(),
            reconciliation: session.reconciliation().ok(),
        }
    }
}

/// 附件批量上传请求体
#[derive(Debug, Deserialize)]
pub struct AnnexUploadRequest {
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Serialize)]
pub struct AnnexBatchResponse {
    pub added: usize,
    pub failures: Vec<AnnexFailure>,
    pub session: SessionSnapshot,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub session_id: String,
    pub routing: Routing,
    pub manual_review: bool,
}

impl IntoResponse for AuditError {
    fn into_response(self) -> Response {
        let status = match &self {
            AuditError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            AuditError::Wizard(WizardError::AnnexIndexOutOfRange { .. }) => StatusCode::BAD_REQUEST,
            AuditError::Wizard(_) => StatusCode::CONFLICT,
            AuditError::InvalidUpload(_) | AuditError::Amount(_) => StatusCode::BAD_REQUEST,
            AuditError::Backend(_)
            | AuditError::BackendRejected { .. }
            | AuditError::Decode(_)
            | AuditError::Json(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ApiResponse::<()> {
            success: false,
            message: format!("Error: {}", self),
            data: None,
        };
        (status, Json(body)).into_response()
    }
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn create_session<B: AuditBackend>(
    State(state): State<AppState<B>>,
    Json(provider): Json<ProviderIdentity>,
) -> Result<Json<ApiResponse<SessionSnapshot>>> {
    let id = state.sessions.create(provider);
    info!("Session {} created ({} active)", id, state.sessions.len());
    let snapshot = state.sessions.with_session(&id, |s| SessionSnapshot::of(&id, s))?;
    Ok(ApiResponse::ok("Session created", snapshot))
}

pub async fn get_session<B: AuditBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionSnapshot>>> {
    let snapshot = state.sessions.with_session(&id, |s| SessionSnapshot::of(&id, s))?;
    Ok(ApiResponse::ok("OK", snapshot))
}

pub async fn delete_session<B: AuditBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    state.sessions.remove(&id)?;
    info!("Session {} discarded", id);
    Ok(ApiResponse::ok("Session discarded", ()))
}

/// 上传发票：调用抽取服务，映射并校验
pub async fn upload_invoice<B: AuditBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    Json(file): Json<UploadedFile>,
) -> Result<Json<ApiResponse<SessionSnapshot>>> {
    let provider = state.sessions.with_session(&id, |s| {
        s.can_load_invoice().map(|_| s.provider.clone())
    })??;
    let file = file.decoded()?;

    info!("Session {}: analyzing invoice {}", id, file.filename);
    let extraction = state.backend.extract_invoice(file).await?;
    let record = extraction.into_record(&provider);

    let snapshot = state.sessions.with_session_mut(&id, |s| {
        s.load_invoice(record)?;
        Ok::<_, WizardError>(SessionSnapshot::of(&id, s))
    })??;
    let findings = snapshot.session.validation().len();
    info!("Session {}: invoice loaded with {} validation findings", id, findings);
    Ok(ApiResponse::ok(
        format!("Invoice extracted, {} validation findings", findings),
        snapshot,
    ))
}

/// 手工修正发票数据
pub async fn correct_invoice<B: AuditBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    Json(invoice): Json<InvoiceRecord>,
) -> Result<Json<ApiResponse<SessionSnapshot>>> {
    let snapshot = state.sessions.with_session_mut(&id, |s| {
        s.correct_invoice(invoice)?;
        Ok::<_, WizardError>(SessionSnapshot::of(&id, s))
    })??;
    Ok(ApiResponse::ok("Invoice updated", snapshot))
}

pub async fn confirm_invoice<B: AuditBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SessionSnapshot>>> {
    let snapshot = state.sessions.with_session_mut(&id, |s| {
        s.confirm_invoice().map(|_| SessionSnapshot::of(&id, s))
    })??;
    Ok(ApiResponse::ok("Invoice confirmed", snapshot))
}

/// 批量上传附件：逐个文件顺序抽取，单个失败不影响其余文件
pub async fn upload_annexes<B: AuditBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
    Json(req): Json<AnnexUploadRequest>,
) -> Result<Json<ApiResponse<AnnexBatchResponse>>> {
    state.sessions.with_session(&id, |s| s.can_add_annexes())??;
    if req.files.is_empty() {
        return Err(AuditError::InvalidUpload("no files in batch".to_string()));
    }

    let total = req.files.len();
    let mut responses = Vec::with_capacity(total);
    for (idx, file) in req.files.into_iter().enumerate() {
        let filename = file.filename.clone();
        info!("Session {}: analyzing annex {} ({}/{})", id, filename, idx + 1, total);
        let response = match file.decoded() {
            Ok(file) => state.backend.extract_annex(file).await,
            Err(e) => Err(e),
        };
        responses.push((filename, response));
    }

    let batch = aggregate_batch(responses);
    let added = batch.added.len();
    let session = state.sessions.with_session_mut(&id, |s| {
        for record in batch.added {
            s.add_annex(record)?;
        }
        Ok::<_, WizardError>(SessionSnapshot::of(&id, s))
    })??;

    info!(
        "Session {}: annex batch done, added: {}, failed: {}",
        id,
        added,
        batch.failures.len()
    );
    Ok(ApiResponse::ok(
        format!("{} of {} annexes added", added, total),
        AnnexBatchResponse {
            added,
            failures: batch.failures,
            session,
        },
    ))
}

pub async fn remove_annex<B: AuditBackend>(
    State(state): State<AppState<B>>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<ApiResponse<SessionSnapshot>>> {
    let snapshot = state.sessions.with_session_mut(&id, |s| {
        s.remove_annex(index).map(|removed| (removed.filename, SessionSnapshot::of(&id, s)))
    })??;
    Ok(ApiResponse::ok(format!("Annex {} removed", snapshot.0), snapshot.1))
}

pub async fn reconciliation<B: AuditBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<ReconciliationOutcome>>> {
    let outcome = state.sessions.with_session(&id, |s| s.reconciliation())??;
    let message = match outcome.routing() {
        Routing::Balanced => "Balanced, ready to submit",
        Routing::ManualReview => "Difference detected, will be sent to manual review",
    };
    Ok(ApiResponse::ok(message, outcome))
}

/// 导出对账报告 CSV
pub async fn reconciliation_report<B: AuditBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Response> {
    let csv = state.sessions.with_session(&id, |s| -> Result<Vec<u8>> {
        let outcome = s.reconciliation()?;
        report::reconciliation_csv(s.annexes(), &outcome)
    })??;
    Ok(([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], csv).into_response())
}

/// 组装并提交；失败时会话保持不变，可手动重试
pub async fn submit<B: AuditBackend>(
    State(state): State<AppState<B>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SubmitResponse>>> {
    let payload = state.sessions.with_session(&id, |s| s.build_submission())??;

    if let Err(e) = state.backend.submit_audit(&payload).await {
        error!("Session {}: submission {} failed: {}", id, payload.session_id, e);
        return Err(e);
    }

    // 后端已受理：不论会话当前状态如何都结束会话
    state.sessions.finish(&id);

    let routing = if payload.manual_review {
        Routing::ManualReview
    } else {
        Routing::Balanced
    };
    info!(
        "Session {}: submitted as {} ({:?})",
        id, payload.session_id, routing
    );
    Ok(ApiResponse::ok(
        "Submission accepted",
        SubmitResponse {
            session_id: payload.session_id,
            routing,
            manual_review: payload.manual_review,
        },
    ))
}
