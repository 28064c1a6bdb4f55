use super::amount;
use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};

/// 抽取服务未识别字段时使用的占位值
pub const NOT_DETECTED: &str = "No detectado";

/// 当前登录的服务提供方
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderIdentity {
    #[serde(rename = "provider_name")]
    pub name: String,
    #[serde(rename = "provider_cuit")]
    pub tax_id: String,
}

/// 发票明细行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "descripcion", default)]
    pub description: String,
    #[serde(default, with = "amount::option", skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<BigDecimal>,
    #[serde(
        rename = "importe",
        alias = "amount",
        default,
        with = "amount::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub amount: Option<BigDecimal>,
}

impl LineItem {
    /// 明细金额：优先 subtotal，其次 importe，均缺省 (或为零) 时为 0
    pub fn effective_amount(&self) -> BigDecimal {
        self.subtotal
            .iter()
            .chain(self.amount.iter())
            .find(|v| !v.is_zero())
            .cloned()
            .unwrap_or_else(BigDecimal::zero)
    }
}

/// 发票记录 (键名与后端一致)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    #[serde(rename = "emisor", default)]
    pub issuer_name: String,
    #[serde(rename = "cuit", default)]
    pub issuer_tax_id: String,
    #[serde(rename = "nro_factura", default)]
    pub invoice_number: String,
    /// 开票日期，日/月/年
    #[serde(rename = "fecha", default)]
    pub issue_date: String,
    #[serde(default)]
    pub cae: String,
    #[serde(default)]
    pub vto_cae: String,
    #[serde(default)]
    pub punto_venta: String,
    #[serde(rename = "periodo", default, skip_serializing_if = "Option::is_none")]
    pub period: Option<String>,
    #[serde(default, with = "amount")]
    pub subtotal: BigDecimal,
    /// 共付额扣减
    #[serde(
        rename = "coseguros",
        default,
        with = "amount::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub copay: Option<BigDecimal>,
    #[serde(default, with = "amount")]
    pub total: BigDecimal,
    #[serde(rename = "items_factura", default)]
    pub line_items: Vec<LineItem>,
}

impl InvoiceRecord {
    pub fn copay_or_zero(&self) -> BigDecimal {
        self.copay.clone().unwrap_or_else(BigDecimal::zero)
    }
}

/// 发票抽取结果 (抽取服务原始键名)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InvoiceExtraction {
    pub emisor_nombre: Option<String>,
    pub cuit_emisor: Option<String>,
    pub nro_factura: Option<String>,
    pub fecha_emision: Option<String>,
    pub cae: Option<String>,
    pub vto_cae: Option<String>,
    pub punto_venta: Option<String>,
    #[serde(default, with = "amount::option")]
    pub total_factura: Option<BigDecimal>,
    #[serde(default, with = "amount::option")]
    pub total_importe_bruto: Option<BigDecimal>,
    pub periodo_facturado: Option<String>,
    #[serde(default)]
    pub items_factura: Vec<LineItem>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl InvoiceExtraction {
    /// 映射为发票记录；缺失的开票方信息回落到当前登录的提供方
    pub fn into_record(self, provider: &ProviderIdentity) -> InvoiceRecord {
        let total = self.total_factura.unwrap_or_else(BigDecimal::zero);
        let subtotal = self
            .total_importe_bruto
            .filter(|v| !v.is_zero())
            .unwrap_or_else(|| total.clone());

        InvoiceRecord {
            issuer_name: non_empty(self.emisor_nombre).unwrap_or_else(|| provider.name.clone()),
            issuer_tax_id: non_empty(self.cuit_emisor).unwrap_or_else(|| provider.tax_id.clone()),
            invoice_number: non_empty(self.nro_factura).unwrap_or_else(|| NOT_DETECTED.to_string()),
            issue_date: self.fecha_emision.unwrap_or_default(),
            cae: non_empty(self.cae).unwrap_or_else(|| NOT_DETECTED.to_string()),
            vto_cae: self.vto_cae.unwrap_or_default(),
            punto_venta: self.punto_venta.unwrap_or_default(),
            period: Some(non_empty(self.periodo_facturado).unwrap_or_else(|| NOT_DETECTED.to_string())),
            subtotal,
            copay: None,
            total,
            line_items: self.items_factura,
        }
    }
}
