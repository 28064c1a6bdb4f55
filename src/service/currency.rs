//! 本地格式金额解析与显示
//!
//! 输入格式以 `.` 为千分位、`,` 为小数点 (`"1.234,56"`)。
//! 宽松解析永不失败，异常输入得到 0；严格解析在格式错误时返回错误。

use crate::error::{AuditError, Result};
use crate::models::RawAmount;
use bigdecimal::{BigDecimal, Zero};
use std::str::FromStr;

/// 去掉千分位点并把第一个逗号换成小数点
fn normalize(text: &str) -> String {
    text.replace('.', "").replacen(',', ".", 1)
}

/// 取开头可解析的数字部分 (与浏览器 parseFloat 的行为一致)
fn numeric_prefix(text: &str) -> Option<String> {
    let mut chars = text.trim_start().chars().peekable();
    let mut out = String::new();

    match chars.peek() {
        Some('-') => {
            out.push('-');
            chars.next();
        }
        Some('+') => {
            chars.next();
        }
        _ => {}
    }

    let mut int_digits = String::new();
    while let Some(c) = chars.peek().copied().filter(|c| c.is_ascii_digit()) {
        int_digits.push(c);
        chars.next();
    }

    let mut frac_digits = String::new();
    if chars.peek() == Some(&'.') {
        chars.next();
        while let Some(c) = chars.peek().copied().filter(|c| c.is_ascii_digit()) {
            frac_digits.push(c);
            chars.next();
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return None;
    }
    out.push_str(if int_digits.is_empty() { "0" } else { &int_digits });
    if !frac_digits.is_empty() {
        out.push('.');
        out.push_str(&frac_digits);
    }
    Some(out)
}

fn number_to_decimal(number: &serde_json::Number) -> Option<BigDecimal> {
    BigDecimal::from_str(&number.to_string()).ok()
}

/// 宽松解析：数字原样返回，空值或无法解析时为 0
pub fn parse_lenient(value: Option<&RawAmount>) -> BigDecimal {
    match value {
        Some(RawAmount::Number(n)) => number_to_decimal(n).unwrap_or_else(BigDecimal::zero),
        Some(RawAmount::Text(text)) => parse_lenient_str(text),
        None => BigDecimal::zero(),
    }
}

pub fn parse_lenient_str(text: &str) -> BigDecimal {
    numeric_prefix(&normalize(text))
        .and_then(|digits| BigDecimal::from_str(&digits).ok())
        .unwrap_or_else(BigDecimal::zero)
}

/// 严格解析：整串必须是合法的本地格式金额
pub fn parse_strict(text: &str) -> Result<BigDecimal> {
    let normalized = normalize(text.trim());
    let unsigned = normalized.trim_start_matches(['-', '+']);
    numeric_prefix(&normalized)
        .filter(|digits| {
            let expected = digits.trim_start_matches('-');
            unsigned == expected || format!("0{}", unsigned) == expected
        })
        .and_then(|digits| BigDecimal::from_str(&digits).ok())
        .ok_or_else(|| AuditError::Amount(text.to_string()))
}

/// 本地显示格式：`.` 千分位、`,` 小数，最多两位小数且去掉末尾的 0
pub fn format_locale(value: &BigDecimal) -> String {
    let rounded = value.round(2);
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, f.trim_end_matches('0')),
        None => (text.as_str(), ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (idx, c) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }

    let sign = if rounded < BigDecimal::zero() { "-" } else { "" };
    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{},{}", sign, grouped, frac_part)
    }
}

/// 固定两位小数
pub fn format_fixed2(value: &BigDecimal) -> String {
    format!("{:.2}", value.round(2))
}
