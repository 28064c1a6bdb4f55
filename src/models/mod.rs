pub mod amount;
pub mod annex;
pub mod invoice;
pub mod result;

pub use amount::RawAmount;
pub use annex::{
    AnnexPayload, AnnexRecord, AnnexShape, ExtractionResponse, FlatAnnex, HierarchicalAnnex,
    Patient, PatientDetail, PatientSummary,
};
pub use invoice::{InvoiceExtraction, InvoiceRecord, LineItem, ProviderIdentity, NOT_DETECTED};
pub use result::{ReconciliationOutcome, Routing, SubmissionAck, SubmissionPayload, ValidationResult};
