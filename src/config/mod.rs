// ==========================================
// 多工厂产能分配系统 - 配置层
// ==========================================
// 职责: 运行参数管理 (默认值 + JSON 覆写)
// ==========================================

pub mod allocation_config;

// 重导出核心配置
pub use allocation_config::{AllocationConfig, ConfigError};
