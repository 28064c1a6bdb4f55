use crate::error::{AuditError, Result};
use crate::models::{AnnexPayload, AnnexRecord, ExtractionResponse};
use crate::service::currency::parse_lenient;
use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;

/// 单个附件抽取失败的记录
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnexFailure {
    pub filename: String,
    pub reason: String,
}

/// 一批附件的处理结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub added: Vec<AnnexRecord>,
    pub failures: Vec<AnnexFailure>,
}

/// 计算附件合计与明细数量
pub fn summarize(payload: &AnnexPayload) -> (BigDecimal, usize) {
    match payload {
        AnnexPayload::Flat(flat) => (
            parse_lenient(flat.total_items.as_ref()),
            flat.items_detalle.len(),
        ),
        AnnexPayload::Hierarchical(tree) => {
            let total: BigDecimal = tree
                .patients
                .iter()
                .map(|p| parse_lenient(p.level1.patient_total.as_ref()))
                .sum();
            let items: usize = tree.patients.iter().map(|p| p.level2.items.len()).sum();
            (total, items)
        }
    }
}

/// 把一次抽取响应转成附件记录
pub fn ingest(filename: &str, response: &ExtractionResponse) -> Result<AnnexRecord> {
    if !response.is_success() {
        return Err(AuditError::BackendRejected {
            status: response.status.clone(),
            message: response
                .message
                .clone()
                .unwrap_or_else(|| "extraction failed".to_string()),
        });
    }
    let data = response
        .data
        .as_ref()
        .ok_or_else(|| AuditError::Decode("extraction response has no data".to_string()))?;

    let payload = AnnexPayload::decode(response.mode, data)?;
    let (mut total, item_count) = summarize(&payload);
    if total < BigDecimal::zero() {
        tracing::warn!("Annex {} has negative total {}, clamping to zero", filename, total);
        total = BigDecimal::zero();
    }

    Ok(AnnexRecord {
        filename: filename.to_string(),
        shape: payload.shape(),
        total,
        item_count,
        raw: data.clone(),
    })
}

/// 按顺序处理一批抽取结果；单个文件失败只记录，不影响其余文件
pub fn aggregate_batch<I>(responses: I) -> BatchOutcome
where
    I: IntoIterator<Item = (String, Result<ExtractionResponse>)>,
{
    let mut outcome = BatchOutcome::default();
    for (filename, response) in responses {
        match response.and_then(|r| ingest(&filename, &r)) {
            Ok(record) => {
                tracing::info!(
                    "Annex {} added: {} items, total {}",
                    filename, record.item_count, record.total
                );
                outcome.added.push(record);
            }
            Err(e) => {
                tracing::warn!("Annex {} skipped: {}", filename, e);
                outcome.failures.push(AnnexFailure {
                    filename,
                    reason: e.to_string(),
                });
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnnexShape;
    use serde_json::json;
    use std::str::FromStr;

    fn response(mode: AnnexShape, data: serde_json::Value) -> ExtractionResponse {
        ExtractionResponse {
            status: "success".to_string(),
            mode,
            data: Some(data),
            message: None,
        }
    }

    #[test]
    fn flat_annex_total_and_count() {
        let resp = response(
            AnnexShape::Flat,
            json!({"total_items": "6.000,00", "items_detalle": [{"a": 1}, {"a": 2}, {"a": 3}]}),
        );
        let record = ingest("anexo1.pdf", &resp).unwrap();
        assert_eq!(record.shape, AnnexShape::Flat);
        assert_eq!(record.total, BigDecimal::from(6000));
        assert_eq!(record.item_count, 3);
        assert_eq!(record.raw, resp.data.unwrap());
    }

    #[test]
    fn hierarchical_annex_sums_patients() {
        let resp = response(
            AnnexShape::Hierarchical,
            json!({"patients": [
                {"level1": {"patientTotal": "500,00"}, "level2": {"items": [1, 2]}},
                {"level1": {"patientTotal": "300,50"}, "level2": {"items": [3, 4, 5]}}
            ]}),
        );
        let record = ingest("anexo2.pdf", &resp).unwrap();
        assert_eq!(record.shape, AnnexShape::Hierarchical);
        assert_eq!(record.total, BigDecimal::from_str("800.50").unwrap());
        assert_eq!(record.item_count, 5);
    }

    #[test]
    fn hierarchical_accepts_backend_keys() {
        let resp = response(
            AnnexShape::Hierarchical,
            json!({"pacientes": [
                {"nivel_1": {"total_paciente": 120}, "nivel_2": {"items": [1]}},
                {"nivel_1": {}}
            ]}),
        );
        let record = ingest("anexo3.pdf", &resp).unwrap();
        assert_eq!(record.total, BigDecimal::from(120));
        assert_eq!(record.item_count, 1);
    }

    #[test]
    fn negative_total_is_clamped() {
        let resp = response(AnnexShape::Flat, json!({"total_items": "-50,00"}));
        let record = ingest("nota_credito.pdf", &resp).unwrap();
        assert_eq!(record.total, BigDecimal::zero());
    }

    #[test]
    fn failed_status_is_rejected() {
        let resp = ExtractionResponse {
            status: "error".to_string(),
            mode: AnnexShape::Flat,
            data: None,
            message: Some("unreadable scan".to_string()),
        };
        let err = ingest("x.pdf", &resp).unwrap_err();
        assert!(err.to_string().contains("unreadable scan"));
    }

    #[test]
    fn batch_continues_after_failure() {
        let outcome = aggregate_batch(vec![
            (
                "a.pdf".to_string(),
                Ok(response(AnnexShape::Flat, json!({"total_items": "1.000,00"}))),
            ),
            (
                "b.pdf".to_string(),
                Err(AuditError::Decode("timeout".to_string())),
            ),
            (
                "c.pdf".to_string(),
                Ok(response(AnnexShape::Hierarchical, json!({"total_items": 3}))),
            ),
            (
                "d.pdf".to_string(),
                Ok(response(AnnexShape::Flat, json!({"total_items": 250}))),
            ),
        ]);

        let added: Vec<_> = outcome.added.iter().map(|r| r.filename.as_str()).collect();
        assert_eq!(added, vec!["a.pdf", "d.pdf"]);
        let failed: Vec<_> = outcome.failures.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(failed, vec!["b.pdf", "c.pdf"]);
    }
}
