// ==========================================
// 多工厂产能分配系统 - 订单领域模型
// ==========================================
// Order 仅承担分组语义, 约束全部落在其 items 上
// ==========================================

use crate::domain::types::ModelKey;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// OrderItem - 订单行 (装载边界形态)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderItem {
    pub model_family: String,
    pub model_name: String,
    pub submodel: String,
    pub quantity: i64,
    pub due_date: NaiveDate,
}

// ==========================================
// Order - 订单
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub items: Vec<OrderItem>,
}

// ==========================================
// PlanningItem - 校验后的生产项 (快照形态)
// ==========================================
// 交期已相对参考时钟归一化为 days_until_due (夹在 [-horizon, horizon])
// item_id 在装载时生成: "{order_id}-{序号:03}"
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningItem {
    pub item_id: String,
    pub order_id: String,
    pub model: ModelKey,
    pub quantity: i64,
    pub due_date: NaiveDate,
    pub days_until_due: i64,
}
