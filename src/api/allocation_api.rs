// ==========================================
// 多工厂产能分配系统 - 分配 API
// ==========================================
// 职责: 文件/记录入口 -> 编排器 -> 结果文档导出
// 红线: 每次调用独立运行, 无跨调用状态
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::AllocationConfig;
use crate::domain::order::Order;
use crate::domain::plant::Plant;
use crate::domain::AllocationReport;
use crate::engine::orchestrator::AllocationOrchestrator;
use crate::importer::loader;
use chrono::NaiveDate;
use std::path::Path;
use tracing::instrument;

// ==========================================
// AllocationApi - 分配接口
// ==========================================
pub struct AllocationApi {
    config: AllocationConfig,
}

impl AllocationApi {
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 文件入口: 装载工厂/订单文档并执行分配
    #[instrument(skip(self), fields(
        plants_path = %plants_path.display(),
        orders_path = %orders_path.display(),
        reference_date = %reference_date
    ))]
    pub fn run_files(
        &self,
        plants_path: &Path,
        orders_path: &Path,
        reference_date: NaiveDate,
    ) -> ApiResult<AllocationReport> {
        let plants = loader::load_plants(plants_path)?;
        let orders = loader::load_orders(orders_path)?;
        self.run_records(plants, orders, reference_date)
    }

    /// 记录入口: 已解析的类型化记录直接进核心
    pub fn run_records(
        &self,
        plants: Vec<Plant>,
        orders: Vec<Order>,
        reference_date: NaiveDate,
    ) -> ApiResult<AllocationReport> {
        let orchestrator = AllocationOrchestrator::new(self.config.clone());
        Ok(orchestrator.run(plants, orders, reference_date)?)
    }

    // ==========================================
    // 结果导出
    // ==========================================

    /// 序列化结果文档 (字段顺序固定, 相同报告产生相同字节)
    pub fn report_to_json(report: &AllocationReport) -> ApiResult<String> {
        serde_json::to_string_pretty(report)
            .map_err(|err| ApiError::Export(err.to_string()))
    }

    /// 写出结果文档
    pub fn write_report(report: &AllocationReport, path: &Path) -> ApiResult<()> {
        let json = Self::report_to_json(report)?;
        std::fs::write(path, json).map_err(|err| ApiError::Export(err.to_string()))
    }
}
