//! 金额字段的序列化辅助
//!
//! 抽取服务返回的金额既可能是 JSON 数字，也可能是本地格式字符串 (`"1.234,56"`)。
//! 反序列化一律走宽松解析，序列化一律输出 JSON 数字。

use crate::service::currency;
use bigdecimal::{BigDecimal, ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 原始金额：数字或字符串
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    Number(serde_json::Number),
    Text(String),
}

impl From<&str> for RawAmount {
    fn from(value: &str) -> Self {
        RawAmount::Text(value.to_string())
    }
}

impl From<i64> for RawAmount {
    fn from(value: i64) -> Self {
        RawAmount::Number(value.into())
    }
}

pub(crate) struct AsNumber<'a>(pub &'a BigDecimal);

impl Serialize for AsNumber<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0.to_i64() {
            Some(n) if self.0.is_integer() => serializer.serialize_i64(n),
            _ => serializer.serialize_f64(self.0.to_string().parse().unwrap_or_default()),
        }
    }
}

pub fn serialize<S: Serializer>(value: &BigDecimal, serializer: S) -> Result<S::Ok, S::Error> {
    AsNumber(value).serialize(serializer)
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigDecimal, D::Error> {
    let raw = Option::<RawAmount>::deserialize(deserializer)?;
    Ok(currency::parse_lenient(raw.as_ref()))
}

/// 可缺省金额 (`coseguros`、明细金额)
pub mod option {
    use super::{AsNumber, RawAmount};
    use crate::service::currency;
    use bigdecimal::BigDecimal;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<BigDecimal>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(v) => serializer.serialize_some(&AsNumber(v)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<BigDecimal>, D::Error> {
        let raw = Option::<RawAmount>::deserialize(deserializer)?;
        Ok(raw.map(|r| currency::parse_lenient(Some(&r))))
    }
}
