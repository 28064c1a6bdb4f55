use crate::error::{AuditError, Result};
use crate::models::{AnnexRecord, ReconciliationOutcome, Routing};
use crate::service::currency::format_fixed2;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    filename: &'a str,
    shape: &'a str,
    items: String,
    total: String,
}

/// 导出对账报告 CSV：逐个附件一行，随后是汇总行
pub fn reconciliation_csv(annexes: &[AnnexRecord], outcome: &ReconciliationOutcome) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for annex in annexes {
        writer.serialize(ReportRow {
            filename: &annex.filename,
            shape: annex.shape.as_str(),
            items: annex.item_count.to_string(),
            total: format_fixed2(&annex.total),
        })?;
    }

    let status = match outcome.routing() {
        Routing::Balanced => "BALANCED",
        Routing::ManualReview => "MANUAL_REVIEW",
    };
    let summary = [
        ("INVOICE_TOTAL", format_fixed2(&outcome.invoice_total)),
        ("ANNEX_TOTAL", format_fixed2(&outcome.annex_total)),
        ("DIFFERENCE", format_fixed2(&outcome.difference)),
        (status, String::new()),
    ];
    for (label, value) in summary {
        writer.serialize(ReportRow {
            filename: label,
            shape: "",
            items: String::new(),
            total: value,
        })?;
    }

    writer
        .into_inner()
        .map_err(|e| AuditError::Report(e.to_string()))
}
