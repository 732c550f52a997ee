// ==========================================
// 多工厂产能分配系统 - 外部文档结构
// ==========================================
// 职责: 工厂/订单文档的边界记录形态与领域转换
// 红线: 未知字段在装载时拒绝, 下游从不 ad hoc 取字段
// ==========================================

use crate::domain::order::{Order, OrderItem};
use crate::domain::plant::{Plant, PlantCapacity, ProducibleSpec};
use crate::importer::error::ImportError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// 工厂文档
// ==========================================

/// 可产项声明 (边界形态)
///
/// 三元组: {"modelFamily": "F1", "modelName": "A", "submodel": "S1"}
/// 通配:   {"family": "F1"}
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProducibleRecord {
    #[serde(rename_all = "camelCase")]
    Model {
        model_family: String,
        model_name: String,
        submodel: String,
    },
    Family { family: String },
}

impl From<ProducibleRecord> for ProducibleSpec {
    fn from(record: ProducibleRecord) -> Self {
        match record {
            ProducibleRecord::Model {
                model_family,
                model_name,
                submodel,
            } => ProducibleSpec::Model {
                model_family,
                model_name,
                submodel,
            },
            ProducibleRecord::Family { family } => ProducibleSpec::Family { family },
        }
    }
}

/// 工厂记录 (产能二选一在转换时强制)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PlantRecord {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_capacity: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity_by_model: Option<BTreeMap<String, i64>>,
    pub producible_items: Vec<ProducibleRecord>,
    pub family_group: String,
}

impl PlantRecord {
    pub fn into_plant(self) -> Result<Plant, ImportError> {
        let capacity = match (self.total_capacity, self.capacity_by_model) {
            (Some(total), None) => PlantCapacity::Total(total),
            (None, Some(by_model)) => PlantCapacity::PerModel(by_model),
            _ => {
                return Err(ImportError::AmbiguousCapacity {
                    plant_id: self.id,
                })
            }
        };
        Ok(Plant {
            id: self.id,
            capacity,
            producible_items: self
                .producible_items
                .into_iter()
                .map(ProducibleSpec::from)
                .collect(),
            family_group: self.family_group,
        })
    }
}

// ==========================================
// 订单文档
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ItemRecord {
    pub model_family: String,
    pub model_name: String,
    pub submodel: String,
    pub quantity: i64,
    /// yyyy-MM-dd, 转换时校验格式
    pub due_date: String,
}

impl ItemRecord {
    fn into_item(self, order_id: &str) -> Result<OrderItem, ImportError> {
        let due_date = NaiveDate::parse_from_str(&self.due_date, "%Y-%m-%d").map_err(|_| {
            ImportError::InvalidDueDate {
                order_id: order_id.to_string(),
                value: self.due_date.clone(),
            }
        })?;
        Ok(OrderItem {
            model_family: self.model_family,
            model_name: self.model_name,
            submodel: self.submodel,
            quantity: self.quantity,
            due_date,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderRecord {
    pub id: String,
    pub items: Vec<ItemRecord>,
}

impl OrderRecord {
    pub fn into_order(self) -> Result<Order, ImportError> {
        let order_id = self.id;
        let items = self
            .items
            .into_iter()
            .map(|item| item.into_item(&order_id))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Order {
            id: order_id,
            items,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrdersDocument {
    pub orders: Vec<OrderRecord>,
}

// ==========================================
// CSV 订单行 (扁平表格形态)
// ==========================================
// 表头: orderId,modelFamily,modelName,submodel,quantity,dueDate
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvOrderRow {
    pub order_id: String,
    pub model_family: String,
    pub model_name: String,
    pub submodel: String,
    pub quantity: i64,
    pub due_date: String,
}
