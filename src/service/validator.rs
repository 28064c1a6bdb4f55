use crate::models::{InvoiceRecord, ValidationResult, NOT_DETECTED};
use crate::service::currency::{format_fixed2, format_locale};
use bigdecimal::BigDecimal;
use chrono::{Local, NaiveDate};

/// 金额比较容差 (发票币种单位)
pub const TOLERANCE: i32 = 100;

pub const FUTURE_DATE_MESSAGE: &str = "Issue date cannot be in the future.";
pub const MISSING_PERIOD_MESSAGE: &str = "Billing period was not detected; please enter it.";

pub fn tolerance() -> BigDecimal {
    BigDecimal::from(TOLERANCE)
}

/// 按 日/月/年 解析开票日期，分隔符为 `-` 或 `/`
pub fn parse_issue_date(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.trim().split(['-', '/']).collect();
    let [day, month, year] = parts.as_slice() else {
        return None;
    };
    NaiveDate::from_ymd_opt(
        year.trim().parse().ok()?,
        month.trim().parse().ok()?,
        day.trim().parse().ok()?,
    )
}

fn check_issue_date(invoice: &InvoiceRecord, today: NaiveDate) -> Option<String> {
    match parse_issue_date(&invoice.issue_date) {
        Some(date) if date > today => Some(FUTURE_DATE_MESSAGE.to_string()),
        _ => None,
    }
}

/// 毛额 - 共付额 应等于 总额
fn check_net_amount(invoice: &InvoiceRecord) -> Option<String> {
    let copay = invoice.copay_or_zero();
    let difference = &(&invoice.subtotal - &copay) - &invoice.total;
    if difference.abs() > tolerance() {
        return Some(format!(
            "Math error: subtotal (${}) - copay (${}) != total (${}). Difference: ${}",
            invoice.subtotal,
            copay,
            invoice.total,
            format_fixed2(&difference)
        ));
    }
    None
}

/// 明细合计应等于毛额
fn check_line_items(invoice: &InvoiceRecord) -> Option<String> {
    if invoice.line_items.is_empty() {
        return None;
    }
    let items_sum: BigDecimal = invoice.line_items.iter().map(|i| i.effective_amount()).sum();
    if (&items_sum - &invoice.subtotal).abs() > tolerance() {
        return Some(format!(
            "Line item discrepancy: items sum (${}) does not match gross subtotal (${}).",
            format_locale(&items_sum),
            format_locale(&invoice.subtotal)
        ));
    }
    None
}

fn check_period(invoice: &InvoiceRecord) -> Option<String> {
    let missing = match invoice.period.as_deref().map(str::trim) {
        None | Some("") => true,
        Some(p) => p.eq_ignore_ascii_case(NOT_DETECTED) || p.eq_ignore_ascii_case("not detected"),
    };
    missing.then(|| MISSING_PERIOD_MESSAGE.to_string())
}

/// 以给定日期为"今天"执行全部规则；规则互不短路，结果按 日期、金额、明细、期间 排列
pub fn validate_invoice_on(invoice: &InvoiceRecord, today: NaiveDate) -> ValidationResult {
    [
        check_issue_date(invoice, today),
        check_net_amount(invoice),
        check_line_items(invoice),
        check_period(invoice),
    ]
    .into_iter()
    .flatten()
    .collect()
}

pub fn validate_invoice(invoice: &InvoiceRecord) -> ValidationResult {
    validate_invoice_on(invoice, Local::now().date_naive())
}
