// ==========================================
// 多工厂产能分配系统 - API 层
// ==========================================
// 职责: 对外业务接口 (文件入口 / 记录入口 / 结果导出)
// ==========================================

pub mod allocation_api;
pub mod error;

// 重导出核心类型
pub use allocation_api::AllocationApi;
pub use error::{ApiError, ApiResult};
