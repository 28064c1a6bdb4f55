use crate::models::{
    AnnexRecord, InvoiceRecord, ProviderIdentity, ReconciliationOutcome, SubmissionPayload,
    ValidationResult,
};
use crate::service::{assembler, reconciler, validator};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

/// 向导状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardState {
    AwaitingInvoice,
    InvoiceExtracted,
    AwaitingAnnexes,
    ReadyToSubmit,
    Submitted,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    #[error("cannot {action} while session is {state:?}")]
    InvalidTransition {
        state: WizardState,
        action: &'static str,
    },
    #[error("no invoice loaded")]
    MissingInvoice,
    #[error("annex index {index} out of range ({len} annexes)")]
    AnnexIndexOutOfRange { index: usize, len: usize },
}

/// 一次提供方提交会话：持有发票、校验结果与附件列表
#[derive(Debug, Clone, Serialize)]
pub struct WizardSession {
    pub provider: ProviderIdentity,
    state: WizardState,
    invoice: Option<InvoiceRecord>,
    validation: ValidationResult,
    annexes: Vec<AnnexRecord>,
}

impl WizardSession {
    pub fn new(provider: ProviderIdentity) -> Self {
        Self {
            provider,
            state: WizardState::AwaitingInvoice,
            invoice: None,
            validation: Vec::new(),
            annexes: Vec::new(),
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    pub fn invoice(&self) -> Option<&InvoiceRecord> {
        self.invoice.as_ref()
    }

    pub fn validation(&self) -> &ValidationResult {
        &self.validation
    }

    pub fn annexes(&self) -> &[AnnexRecord] {
        &self.annexes
    }

    fn ensure(&self, allowed: &[WizardState], action: &'static str) -> Result<(), WizardError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(WizardError::InvalidTransition {
                state: self.state,
                action,
            })
        }
    }

    pub fn can_load_invoice(&self) -> Result<(), WizardError> {
        self.ensure(
            &[WizardState::AwaitingInvoice, WizardState::InvoiceExtracted],
            "load an invoice",
        )
    }

    pub fn can_add_annexes(&self) -> Result<(), WizardError> {
        self.ensure(
            &[WizardState::AwaitingAnnexes, WizardState::ReadyToSubmit],
            "add annexes",
        )
    }

    /// 载入抽取到的发票并执行校验
    pub fn load_invoice_on(
        &mut self,
        invoice: InvoiceRecord,
        today: NaiveDate,
    ) -> Result<&ValidationResult, WizardError> {
        self.can_load_invoice()?;
        self.validation = validator::validate_invoice_on(&invoice, today);
        self.invoice = Some(invoice);
        self.state = WizardState::InvoiceExtracted;
        Ok(&self.validation)
    }

    pub fn load_invoice(&mut self, invoice: InvoiceRecord) -> Result<&ValidationResult, WizardError> {
        self.load_invoice_on(invoice, chrono::Local::now().date_naive())
    }

    /// 用户手工修正发票，重新校验；状态不变
    pub fn correct_invoice_on(
        &mut self,
        invoice: InvoiceRecord,
        today: NaiveDate,
    ) -> Result<&ValidationResult, WizardError> {
        self.ensure(
            &[
                WizardState::InvoiceExtracted,
                WizardState::AwaitingAnnexes,
                WizardState::ReadyToSubmit,
            ],
            "correct the invoice",
        )?;
        self.validation = validator::validate_invoice_on(&invoice, today);
        self.invoice = Some(invoice);
        Ok(&self.validation)
    }

    pub fn correct_invoice(&mut self, invoice: InvoiceRecord) -> Result<&ValidationResult, WizardError> {
        self.correct_invoice_on(invoice, chrono::Local::now().date_naive())
    }

    /// 用户确认发票数据；校验结果仅作提示，不阻止流转
    pub fn confirm_invoice(&mut self) -> Result<(), WizardError> {
        self.ensure(&[WizardState::InvoiceExtracted], "confirm the invoice")?;
        self.state = WizardState::AwaitingAnnexes;
        Ok(())
    }

    pub fn add_annex(&mut self, annex: AnnexRecord) -> Result<(), WizardError> {
        self.can_add_annexes()?;
        self.annexes.push(annex);
        self.state = WizardState::ReadyToSubmit;
        Ok(())
    }

    pub fn remove_annex(&mut self, index: usize) -> Result<AnnexRecord, WizardError> {
        self.ensure(
            &[WizardState::AwaitingAnnexes, WizardState::ReadyToSubmit],
            "remove an annex",
        )?;
        if index >= self.annexes.len() {
            return Err(WizardError::AnnexIndexOutOfRange {
                index,
                len: self.annexes.len(),
            });
        }
        let removed = self.annexes.remove(index);
        if self.annexes.is_empty() {
            self.state = WizardState::AwaitingAnnexes;
        }
        Ok(removed)
    }

    pub fn reconciliation(&self) -> Result<ReconciliationOutcome, WizardError> {
        let invoice = self.invoice.as_ref().ok_or(WizardError::MissingInvoice)?;
        Ok(reconciler::reconcile(&invoice.total, &self.annexes))
    }

    pub fn build_submission_at(&self, now: DateTime<Utc>) -> Result<SubmissionPayload, WizardError> {
        self.ensure(&[WizardState::ReadyToSubmit], "submit")?;
        let invoice = self.invoice.as_ref().ok_or(WizardError::MissingInvoice)?;
        let outcome = reconciler::reconcile(&invoice.total, &self.annexes);
        Ok(assembler::assemble_at(
            &self.provider.tax_id,
            invoice,
            &self.annexes,
            &outcome,
            now,
        ))
    }

    pub fn build_submission(&self) -> Result<SubmissionPayload, WizardError> {
        self.build_submission_at(Utc::now())
    }

    pub fn mark_submitted(&mut self) -> Result<(), WizardError> {
        self.ensure(&[WizardState::ReadyToSubmit], "mark as submitted")?;
        self.state = WizardState::Submitted;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AnnexShape;
    use bigdecimal::BigDecimal;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }

    fn session() -> WizardSession {
        WizardSession::new(ProviderIdentity {
            name: "Sanatorio Sur".to_string(),
            tax_id: "30-22222222-7".to_string(),
        })
    }

    fn invoice(total: i32) -> InvoiceRecord {
        InvoiceRecord {
            issue_date: "01/05/2025".to_string(),
            period: Some("2025-04".to_string()),
            subtotal: BigDecimal::from(total),
            total: BigDecimal::from(total),
            ..Default::default()
        }
    }

    fn annex(name: &str, total: i32) -> AnnexRecord {
        AnnexRecord {
            filename: name.to_string(),
            shape: AnnexShape::Flat,
            total: BigDecimal::from(total),
            item_count: 1,
            raw: json!({"total_items": total}),
        }
    }

    #[test]
    fn happy_path_walks_every_state() {
        let mut s = session();
        assert_eq!(s.state(), WizardState::AwaitingInvoice);

        assert!(s.load_invoice_on(invoice(1000), today()).unwrap().is_empty());
        assert_eq!(s.state(), WizardState::InvoiceExtracted);

        s.confirm_invoice().unwrap();
        assert_eq!(s.state(), WizardState::AwaitingAnnexes);

        s.add_annex(annex("a.pdf", 1000)).unwrap();
        assert_eq!(s.state(), WizardState::ReadyToSubmit);
        assert!(s.reconciliation().unwrap().within_tolerance);

        let payload = s.build_submission().unwrap();
        assert_eq!(payload.provider_cuit, "30-22222222-7");
        s.mark_submitted().unwrap();
        assert_eq!(s.state(), WizardState::Submitted);
    }

    #[test]
    fn validation_findings_do_not_block_confirmation() {
        let mut s = session();
        let mut bad = invoice(1000);
        bad.total = BigDecimal::from(10);
        bad.period = None;
        assert_eq!(s.load_invoice_on(bad, today()).unwrap().len(), 2);
        s.confirm_invoice().unwrap();
        assert_eq!(s.state(), WizardState::AwaitingAnnexes);
    }

    #[test]
    fn correction_revalidates_without_changing_state() {
        let mut s = session();
        let mut bad = invoice(1000);
        bad.period = None;
        s.load_invoice_on(bad, today()).unwrap();
        s.confirm_invoice().unwrap();
        assert_eq!(s.validation().len(), 1);

        s.correct_invoice_on(invoice(1000), today()).unwrap();
        assert!(s.validation().is_empty());
        assert_eq!(s.state(), WizardState::AwaitingAnnexes);
    }

    #[test]
    fn invalid_transitions_leave_session_untouched() {
        let mut s = session();
        let err = s.add_annex(annex("a.pdf", 1)).unwrap_err();
        assert!(matches!(err, WizardError::InvalidTransition { .. }));
        assert!(s.annexes().is_empty());
        assert_eq!(s.confirm_invoice().unwrap_err(), WizardError::InvalidTransition {
            state: WizardState::AwaitingInvoice,
            action: "confirm the invoice",
        });
        assert_eq!(s.reconciliation().unwrap_err(), WizardError::MissingInvoice);
        assert!(s.build_submission().is_err());

        s.load_invoice_on(invoice(10), today()).unwrap();
        s.confirm_invoice().unwrap();
        assert!(s.load_invoice_on(invoice(20), today()).is_err());
        assert_eq!(s.invoice().unwrap().total, BigDecimal::from(10));
        assert!(s.build_submission().is_err());
    }

    #[test]
    fn removing_last_annex_returns_to_awaiting() {
        let mut s = session();
        s.load_invoice_on(invoice(500), today()).unwrap();
        s.confirm_invoice().unwrap();
        s.add_annex(annex("a.pdf", 200)).unwrap();
        s.add_annex(annex("b.pdf", 300)).unwrap();

        assert_eq!(
            s.remove_annex(5).unwrap_err(),
            WizardError::AnnexIndexOutOfRange { index: 5, len: 2 }
        );
        assert_eq!(s.remove_annex(0).unwrap().filename, "a.pdf");
        assert_eq!(s.state(), WizardState::ReadyToSubmit);
        assert_eq!(s.reconciliation().unwrap().annex_total, BigDecimal::from(300));

        s.remove_annex(0).unwrap();
        assert_eq!(s.state(), WizardState::AwaitingAnnexes);
        assert!(s.build_submission().is_err());
    }

    #[test]
    fn reupload_replaces_invoice_before_confirmation() {
        let mut s = session();
        s.load_invoice_on(invoice(100), today()).unwrap();
        s.load_invoice_on(invoice(200), today()).unwrap();
        assert_eq!(s.invoice().unwrap().total, BigDecimal::from(200));
    }
}
