// ==========================================
// 多工厂产能分配系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、业务规则接口
// 红线: 不含求解逻辑, 不含文件访问逻辑
// ==========================================

pub mod assignment;
pub mod order;
pub mod plant;
pub mod types;

// 重导出核心类型
pub use assignment::{
    AllocationReport, Assignment, InfeasibilityDiagnostics, ItemFulfillment, OverloadedPlant,
    RunSummary, UnproducibleItem, UnsatisfiableModel,
};
pub use order::{Order, OrderItem, PlanningItem};
pub use plant::{Plant, PlantCapacity, ProducibleSpec};
pub use types::{AllocationPolicy, InfeasibilityClass, ModelKey};
