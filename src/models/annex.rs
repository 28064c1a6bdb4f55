use super::amount::{self, RawAmount};
use crate::error::{AuditError, Result};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 附件数据形态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnnexShape {
    #[default]
    Flat,
    Hierarchical,
}

impl AnnexShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnexShape::Flat => "flat",
            AnnexShape::Hierarchical => "hierarchical",
        }
    }
}

/// 抽取服务对单个附件的响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResponse {
    pub status: String,
    #[serde(default)]
    pub mode: AnnexShape,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ExtractionResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// 平铺附件：一组明细，无分组
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FlatAnnex {
    #[serde(alias = "totalItems", default)]
    pub total_items: Option<RawAmount>,
    #[serde(alias = "itemDetail", alias = "item_detail", default)]
    pub items_detalle: Vec<Value>,
}

/// 患者层级汇总
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PatientSummary {
    #[serde(rename = "patientTotal", alias = "total_paciente", default)]
    pub patient_total: Option<RawAmount>,
}

/// 患者明细
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct PatientDetail {
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Patient {
    #[serde(alias = "nivel_1", default)]
    pub level1: PatientSummary,
    #[serde(alias = "nivel_2", default)]
    pub level2: PatientDetail,
}

/// 层级附件：按患者分组
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HierarchicalAnnex {
    #[serde(alias = "pacientes")]
    pub patients: Vec<Patient>,
}

/// 按形态解码后的附件数据
#[derive(Debug, Clone, PartialEq)]
pub enum AnnexPayload {
    Flat(FlatAnnex),
    Hierarchical(HierarchicalAnnex),
}

impl AnnexPayload {
    pub fn decode(shape: AnnexShape, data: &Value) -> Result<Self> {
        let decoded = match shape {
            AnnexShape::Flat => serde_json::from_value(data.clone()).map(AnnexPayload::Flat),
            AnnexShape::Hierarchical => {
                serde_json::from_value(data.clone()).map(AnnexPayload::Hierarchical)
            }
        };
        decoded.map_err(|e| AuditError::Decode(format!("{} annex: {}", shape.as_str(), e)))
    }

    pub fn shape(&self) -> AnnexShape {
        match self {
            AnnexPayload::Flat(_) => AnnexShape::Flat,
            AnnexPayload::Hierarchical(_) => AnnexShape::Hierarchical,
        }
    }
}

/// 附件记录：会话内只追加或整体移除，不做原地修改
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnexRecord {
    pub filename: String,
    pub shape: AnnexShape,
    #[serde(with = "amount")]
    pub total: BigDecimal,
    pub item_count: usize,
    /// 抽取原始数据，提交时原样转发
    pub raw: Value,
}
