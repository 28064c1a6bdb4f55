pub mod aggregator;
pub mod assembler;
pub mod currency;
pub mod reconciler;
pub mod report;
pub mod validator;
pub mod wizard;

pub use aggregator::{aggregate_batch, ingest, AnnexFailure, BatchOutcome};
pub use assembler::assemble;
pub use currency::{parse_lenient, parse_strict};
pub use reconciler::reconcile;
pub use validator::{validate_invoice, TOLERANCE};
pub use wizard::{WizardError, WizardSession, WizardState};
