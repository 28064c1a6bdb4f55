use crate::models::{AnnexRecord, InvoiceRecord, ReconciliationOutcome, SubmissionPayload};
use chrono::{DateTime, Utc};

/// 生成基于时间戳的提交编号
pub fn session_id_at(now: DateTime<Utc>) -> String {
    format!("PORTAL-{}", now.timestamp_millis())
}

/// 组装提交报文；附件使用抽取原始数据而不是展示用合计
pub fn assemble_at(
    provider_tax_id: &str,
    invoice: &InvoiceRecord,
    annexes: &[AnnexRecord],
    outcome: &ReconciliationOutcome,
    now: DateTime<Utc>,
) -> SubmissionPayload {
    SubmissionPayload {
        session_id: session_id_at(now),
        provider_cuit: provider_tax_id.to_string(),
        invoice_data: invoice.clone(),
        annexes_data: annexes.iter().map(|a| a.raw.clone()).collect(),
        total_reconciled: outcome.annex_total.clone(),
        manual_review: !outcome.within_tolerance,
    }
}

pub fn assemble(
    provider_tax_id: &str,
    invoice: &InvoiceRecord,
    annexes: &[AnnexRecord],
    outcome: &ReconciliationOutcome,
) -> SubmissionPayload {
    assemble_at(provider_tax_id, invoice, annexes, outcome, Utc::now())
}
