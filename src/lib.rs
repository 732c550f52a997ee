// ==========================================
// 多工厂产能分配系统 - 核心库
// ==========================================
// 系统定位: 决策支持系统 (约束建模 + 多目标合成 + 不可行诊断)
// 数据流: Validator -> Encoder -> Composer -> Adapter.solve() -> Extractor
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 建模与提取规则
pub mod engine;

// 求解层 - 适配接口与默认后端
pub mod solver;

// 导入层 - 外部文档
pub mod importer;

// 配置层 - 运行参数
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AllocationPolicy, AllocationReport, Assignment, InfeasibilityClass,
    InfeasibilityDiagnostics, ItemFulfillment, ModelKey, Order, OrderItem, Plant,
    PlantCapacity, PlanningItem, ProducibleSpec, RunSummary, UnproducibleItem,
};

// 引擎
pub use engine::{
    AllocationOrchestrator, ConstraintEncoder, DomainModel, DomainValidator,
    InfeasibilityDiagnoser, ObjectiveComposer, ResultExtractor,
};

// 求解层
pub use solver::{BranchBoundSolver, SolveStatus, SolverBackend};

// API
pub use api::{AllocationApi, ApiError, ApiResult};

// 配置
pub use config::AllocationConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "多工厂产能分配系统";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
