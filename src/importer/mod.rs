// ==========================================
// 多工厂产能分配系统 - 导入层
// ==========================================
// 职责: 外部文档 -> 边界记录 -> 领域实体
// ==========================================

pub mod document;
pub mod error;
pub mod loader;

// 重导出核心类型
pub use document::{ItemRecord, OrderRecord, OrdersDocument, PlantRecord, ProducibleRecord};
pub use error::ImportError;
pub use loader::{load_orders, load_plants};
