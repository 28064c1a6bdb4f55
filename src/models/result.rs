use super::amount;
use super::invoice::InvoiceRecord;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 校验结果：按规则顺序排列的差异提示，空表示无问题
pub type ValidationResult = Vec<String>;

/// 对账后的流转方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Routing {
    Balanced,
    ManualReview,
}

/// 发票与附件对账结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciliationOutcome {
    #[serde(with = "amount")]
    pub invoice_total: BigDecimal,
    #[serde(with = "amount")]
    pub annex_total: BigDecimal,
    /// invoice_total - annex_total
    #[serde(with = "amount")]
    pub difference: BigDecimal,
    pub within_tolerance: bool,
}

impl ReconciliationOutcome {
    pub fn routing(&self) -> Routing {
        if self.within_tolerance {
            Routing::Balanced
        } else {
            Routing::ManualReview
        }
    }
}

/// 最终提交给后端的报文
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionPayload {
    pub session_id: String,
    pub provider_cuit: String,
    pub invoice_data: InvoiceRecord,
    pub annexes_data: Vec<Value>,
    #[serde(with = "amount")]
    pub total_reconciled: BigDecimal,
    pub manual_review: bool,
}

/// 后端提交响应
#[derive(Debug, Clone, Deserialize)]
pub struct SubmissionAck {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}
