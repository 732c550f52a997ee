// ==========================================
// 多工厂产能分配系统 - 领域类型定义
// ==========================================
// 职责: 定义分配策略、不可行分类、型号键等核心类型
// 红线: 求解状态是一等结果, 不以异常表达
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 分配策略 (Allocation Policy)
// ==========================================
// 业务口径: 部分满足是否可接受
// AllowPartial: 未满足量以松弛变量表达并计罚 (默认)
// RequireFull:  需求必须全额满足, 不可满足时得到 INFEASIBLE
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AllocationPolicy {
    AllowPartial, // 罚而不禁
    RequireFull,  // 硬性满足
}

impl Default for AllocationPolicy {
    fn default() -> Self {
        AllocationPolicy::AllowPartial
    }
}

impl fmt::Display for AllocationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocationPolicy::AllowPartial => write!(f, "ALLOW_PARTIAL"),
            AllocationPolicy::RequireFull => write!(f, "REQUIRE_FULL"),
        }
    }
}

// ==========================================
// 不可行分类 (Infeasibility Class)
// ==========================================
// Structural: 有需求型号无任何工厂可产 (与时间无关)
// Capacity:   可产但聚合产能不足
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InfeasibilityClass {
    Structural,
    Capacity,
}

impl fmt::Display for InfeasibilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InfeasibilityClass::Structural => write!(f, "STRUCTURAL"),
            InfeasibilityClass::Capacity => write!(f, "CAPACITY"),
        }
    }
}

// ==========================================
// ModelKey - 型号键
// ==========================================
// (modelFamily, modelName, submodel) 三元组, 全系统唯一标识一种型号
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelKey {
    pub model_family: String,
    pub model_name: String,
    pub submodel: String,
}

impl ModelKey {
    pub fn new(
        model_family: impl Into<String>,
        model_name: impl Into<String>,
        submodel: impl Into<String>,
    ) -> Self {
        Self {
            model_family: model_family.into(),
            model_name: model_name.into(),
            submodel: submodel.into(),
        }
    }
}

impl fmt::Display for ModelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.model_family, self.model_name, self.submodel)
    }
}
