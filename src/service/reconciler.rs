use crate::models::{AnnexRecord, ReconciliationOutcome};
use crate::service::validator::tolerance;
use bigdecimal::BigDecimal;

/// 发票总额与附件合计对账 (每次全量重算，不做缓存)
pub fn reconcile_totals<'a, I>(invoice_total: &BigDecimal, annex_totals: I) -> ReconciliationOutcome
where
    I: IntoIterator<Item = &'a BigDecimal>,
{
    let annex_total: BigDecimal = annex_totals.into_iter().sum();
    let difference = invoice_total - &annex_total;
    let within_tolerance = difference.abs() <= tolerance();

    ReconciliationOutcome {
        invoice_total: invoice_total.clone(),
        annex_total,
        difference,
        within_tolerance,
    }
}

pub fn reconcile(invoice_total: &BigDecimal, annexes: &[AnnexRecord]) -> ReconciliationOutcome {
    reconcile_totals(invoice_total, annexes.iter().map(|a| &a.total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Routing;
    use bigdecimal::Zero;

    fn totals(values: &[i32]) -> Vec<BigDecimal> {
        values.iter().map(|v| BigDecimal::from(*v)).collect()
    }

    #[test]
    fn boundary_difference_is_within_tolerance() {
        let outcome = reconcile_totals(&BigDecimal::from(5000), &totals(&[3000, 1900]));
        assert_eq!(outcome.annex_total, BigDecimal::from(4900));
        assert_eq!(outcome.difference, BigDecimal::from(100));
        assert!(outcome.within_tolerance);
        assert_eq!(outcome.routing(), Routing::Balanced);
    }

    #[test]
    fn larger_difference_goes_to_manual_review() {
        let outcome = reconcile_totals(&BigDecimal::from(5000), &totals(&[3000, 1800]));
        assert_eq!(outcome.difference, BigDecimal::from(200));
        assert!(!outcome.within_tolerance);
        assert_eq!(outcome.routing(), Routing::ManualReview);
    }

    #[test]
    fn overshoot_yields_negative_difference() {
        let outcome = reconcile_totals(&BigDecimal::from(10000), &totals(&[6000, 4050]));
        assert_eq!(outcome.difference, BigDecimal::from(-50));
        assert!(outcome.within_tolerance);

        let far = reconcile_totals(&BigDecimal::from(100), &totals(&[500]));
        assert_eq!(far.difference, BigDecimal::from(-400));
        assert!(!far.within_tolerance);
    }

    #[test]
    fn no_annexes_compares_against_zero() {
        let outcome = reconcile(&BigDecimal::from(80), &[]);
        assert_eq!(outcome.annex_total, BigDecimal::zero());
        assert!(outcome.within_tolerance);
    }

    #[test]
    fn reconciliation_is_repeatable() {
        let values = totals(&[1, 2, 3]);
        let first = reconcile_totals(&BigDecimal::from(700), &values);
        let second = reconcile_totals(&BigDecimal::from(700), &values);
        assert_eq!(first, second);
    }
}
