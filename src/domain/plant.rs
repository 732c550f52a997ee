// ==========================================
// 多工厂产能分配系统 - 工厂领域模型
// ==========================================
// 红线: 产能与可产性是硬约束, 优先于一切软目标
// 用途: 产能查询, 可产性判定 (三元组直配 / family 通配)
// ==========================================

use crate::domain::types::ModelKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// PlantCapacity - 工厂产能
// ==========================================
// 两种口径:
// - Total:    全厂共享的总产能 (无型号区分)
// - PerModel: 按 modelName 区分的产能表
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlantCapacity {
    Total(i64),
    PerModel(BTreeMap<String, i64>),
}

impl PlantCapacity {
    /// 某型号可用产能
    ///
    /// PerModel 口径下缺项视为产能 0 (该 (工厂, 型号) 对不会实例化变量)
    pub fn for_model(&self, model_name: &str) -> i64 {
        match self {
            PlantCapacity::Total(total) => *total,
            PlantCapacity::PerModel(by_model) => {
                by_model.get(model_name).copied().unwrap_or(0)
            }
        }
    }

    /// 是否按型号区分
    pub fn is_per_model(&self) -> bool {
        matches!(self, PlantCapacity::PerModel(_))
    }

    /// 产能上界 (诊断用: Total 取总量, PerModel 取各项之和)
    pub fn upper_bound(&self) -> i64 {
        match self {
            PlantCapacity::Total(total) => *total,
            PlantCapacity::PerModel(by_model) => by_model.values().sum(),
        }
    }
}

// ==========================================
// ProducibleSpec - 可产项声明
// ==========================================
// Model:  精确三元组
// Family: family 级通配, 覆盖该 family 下所有型号
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProducibleSpec {
    #[serde(rename_all = "camelCase")]
    Model {
        model_family: String,
        model_name: String,
        submodel: String,
    },
    Family { family: String },
}

impl ProducibleSpec {
    /// 判定声明是否覆盖给定型号
    pub fn matches(&self, key: &ModelKey) -> bool {
        match self {
            ProducibleSpec::Model {
                model_family,
                model_name,
                submodel,
            } => {
                model_family == &key.model_family
                    && model_name == &key.model_name
                    && submodel == &key.submodel
            }
            ProducibleSpec::Family { family } => family == &key.model_family,
        }
    }
}

// ==========================================
// Plant - 工厂
// ==========================================
// 装载校验后不可变
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plant {
    pub id: String,
    pub capacity: PlantCapacity,
    pub producible_items: Vec<ProducibleSpec>,
    pub family_group: String,
}

impl Plant {
    /// 可产性判定: 三元组直配或 family 通配命中即可产
    pub fn can_produce(&self, key: &ModelKey) -> bool {
        self.producible_items.iter().any(|spec| spec.matches(key))
    }

    /// 该型号在本厂的可用产能
    pub fn capacity_for_model(&self, model_name: &str) -> i64 {
        self.capacity.for_model(model_name)
    }
}
