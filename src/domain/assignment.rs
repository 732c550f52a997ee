// ==========================================
// 多工厂产能分配系统 - 分配结果领域模型
// ==========================================
// 红线: Assignment 仅由 Result Extractor 创建, 创建后不可变;
//       只保留严格正数量的行
// ==========================================

use crate::domain::types::{InfeasibilityClass, ModelKey};
use crate::solver::SolveStatus;
use serde::{Deserialize, Serialize};

// ==========================================
// Assignment - 分配行 (仅输出)
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub order_id: String,
    pub item_id: String,
    pub plant_id: String,
    pub quantity_allocated: i64,
    /// 该生产项 (跨全部工厂) 是否全额满足
    pub fulfilled: bool,
}

// ==========================================
// ItemFulfillment - 单项满足度
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFulfillment {
    pub item_id: String,
    pub required: i64,
    pub allocated: i64,
    pub ratio: f64,
}

// ==========================================
// UnproducibleItem - 无厂可产的生产项
// ==========================================
// 非致命: 不进硬约束, 诊断中报永久未满足
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnproducibleItem {
    pub item_id: String,
    pub order_id: String,
    pub model: ModelKey,
    pub quantity: i64,
    pub reason: String,
}

// ==========================================
// RunSummary - 运行汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub total_unmet_quantity: i64,
    pub unproducible_quantity: i64,
    pub objective_value: Option<i64>,
    pub status: SolveStatus,
    pub timed_out: bool,
}

// ==========================================
// 不可行诊断结构
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsatisfiableModel {
    pub model_name: String,
    pub demand: i64,
    pub capacity: i64,
    pub shortfall: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverloadedPlant {
    pub plant_id: String,
    pub capacity: i64,
    pub demand_pressure: i64,
    pub shortfall: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfeasibilityDiagnostics {
    pub classification: InfeasibilityClass,
    /// 松弛重解 (仅硬约束) 的状态
    pub relaxed_status: SolveStatus,
    pub unsatisfiable_models: Vec<UnsatisfiableModel>,
    pub overloaded_plants: Vec<OverloadedPlant>,
}

// ==========================================
// AllocationReport - 结果文档
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationReport {
    pub assignments: Vec<Assignment>,
    pub fulfillment: Vec<ItemFulfillment>,
    pub unproducible: Vec<UnproducibleItem>,
    pub summary: RunSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<InfeasibilityDiagnostics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_serialization_keys() {
        let report = AllocationReport {
            assignments: vec![Assignment {
                order_id: "O1".to_string(),
                item_id: "O1-001".to_string(),
                plant_id: "P1".to_string(),
                quantity_allocated: 8,
                fulfilled: true,
            }],
            fulfillment: vec![],
            unproducible: vec![],
            summary: RunSummary {
                total_unmet_quantity: 0,
                unproducible_quantity: 0,
                objective_value: Some(0),
                status: SolveStatus::Optimal,
                timed_out: false,
            },
            diagnostics: None,
        };
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"quantityAllocated\":8"));
        assert!(json.contains("\"status\":\"OPTIMAL\""));
        assert!(json.contains("\"totalUnmetQuantity\":0"));
        // 无诊断时不输出 diagnostics 字段
        assert!(!json.contains("\"diagnostics\""));
    }
}
