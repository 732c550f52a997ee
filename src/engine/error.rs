// ==========================================
// 多工厂产能分配系统 - 引擎层错误类型
// ==========================================
// 红线: 结构性/输入错误 fail fast, 消息点名字段与记录;
//       求解状态 (INFEASIBLE/TIMEOUT) 不在此列, 它们是一等结果
// ==========================================

use thiserror::Error;

/// 装载校验错误
///
/// 在任何约束发布之前中止, 消息点名违规字段与记录
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("工厂 id 不能为空")]
    EmptyPlantId,

    #[error("工厂 {plant_id} 重复定义")]
    DuplicatePlant { plant_id: String },

    #[error("工厂 {plant_id} 产能必须为正: 字段 {field} = {value}")]
    NonPositiveCapacity {
        plant_id: String,
        field: String,
        value: i64,
    },

    #[error("工厂 {plant_id} 的 capacityByModel 不能为空表")]
    EmptyCapacityMap { plant_id: String },

    #[error("工厂 {plant_id} 的 producibleItems 不能为空")]
    EmptyProducibleSet { plant_id: String },

    #[error("工厂 {plant_id} 的 familyGroup 不能为空")]
    EmptyFamilyGroup { plant_id: String },

    #[error("工厂 {plant_id} 引用了未知的 family \"{family}\": 字段 producibleItems")]
    DanglingFamilyReference { plant_id: String, family: String },

    #[error("订单 id 不能为空")]
    EmptyOrderId,

    #[error("订单 {order_id} 重复定义")]
    DuplicateOrder { order_id: String },

    #[error("订单 {order_id} 第 {index} 项数量必须为正: 字段 quantity = {value}")]
    NonPositiveQuantity {
        order_id: String,
        index: usize,
        value: i64,
    },

    #[error("订单 {order_id} 第 {index} 项字段 {field} 不能为空")]
    EmptyItemField {
        order_id: String,
        index: usize,
        field: String,
    },
}

/// 引擎层统一错误 (编排器出口)
#[derive(Error, Debug)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Compose(#[from] crate::engine::objective::ComposeError),
}
