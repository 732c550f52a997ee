// ==========================================
// 多工厂产能分配系统 - 引擎编排器
// ==========================================
// 用途: 协调 Validator -> Encoder -> Composer -> Adapter -> Extractor
// 红线: 每次运行自建后端与编码实例, 无进程级共享状态;
//       INFEASIBLE 的诊断重解是显式且单独打日志的操作
// ==========================================

use crate::config::AllocationConfig;
use crate::domain::order::Order;
use crate::domain::plant::Plant;
use crate::domain::AllocationReport;
use crate::engine::diagnostics::InfeasibilityDiagnoser;
use crate::engine::encoder::ConstraintEncoder;
use crate::engine::error::EngineError;
use crate::engine::extractor::ResultExtractor;
use crate::engine::objective::ObjectiveComposer;
use crate::engine::validator::DomainValidator;
use crate::solver::{BranchBoundSolver, Direction, SolveStatus, SolverBackend};
use chrono::NaiveDate;
use tracing::{info, instrument};
use uuid::Uuid;

// ==========================================
// AllocationOrchestrator - 引擎编排器
// ==========================================
pub struct AllocationOrchestrator {
    config: AllocationConfig,
}

impl AllocationOrchestrator {
    pub fn new(config: AllocationConfig) -> Self {
        Self { config }
    }

    /// 执行完整分配流程 (单次运行, 同步端到端)
    ///
    /// # 参数
    /// - `plants`: 工厂记录
    /// - `orders`: 订单记录
    /// - `reference_date`: 交期归一化参考时钟 (纯函数性: 由调用方显式给定)
    ///
    /// # 返回
    /// 分配报告; 结构性输入错误以 EngineError fail fast,
    /// INFEASIBLE/TIMEOUT 以 summary.status 表达
    #[instrument(skip(self, plants, orders), fields(
        run_id = %Uuid::new_v4(),
        plants_count = plants.len(),
        orders_count = orders.len(),
        policy = %self.config.policy
    ))]
    pub fn run(
        &self,
        plants: Vec<Plant>,
        orders: Vec<Order>,
        reference_date: NaiveDate,
    ) -> Result<AllocationReport, EngineError> {
        info!("开始执行分配流程");

        // ==========================================
        // 步骤1: Validator - 装载为不可变快照
        // ==========================================
        let validator = DomainValidator::new(self.config.horizon_days);
        let model = validator.load(plants, orders, reference_date)?;
        info!(
            items = model.items.len(),
            unproducible = model.unproducible.len(),
            "领域校验完成"
        );

        // ==========================================
        // 步骤2: Encoder - 变量与硬约束
        // ==========================================
        let mut backend = BranchBoundSolver::new();
        let encoder = ConstraintEncoder::new(self.config.policy);
        let encoded = encoder.encode(&model, &mut backend);

        // ==========================================
        // 步骤3: Composer - 词典序目标
        // ==========================================
        let composer = ObjectiveComposer::new(
            self.config.primary_scale,
            self.config.horizon_days,
            self.config.preferred_plant.clone(),
        );
        let composed = composer.compose(&model, &encoded, &mut backend)?;
        backend.set_objective(composed.expr.clone(), Direction::Minimise);

        // ==========================================
        // 步骤4: Adapter - 有界时间求解
        // ==========================================
        let outcome = backend.solve(self.config.time_limit(), self.config.num_workers);
        info!(status = %outcome.status, objective = ?outcome.objective_value, "求解完成");

        // ==========================================
        // 步骤5: Extractor - 映射回领域语言
        // ==========================================
        let extractor = ResultExtractor::new();
        let mut report = extractor.extract(&model, &encoded, &outcome);

        // ==========================================
        // 步骤6: 不可行诊断 (显式、可配置)
        // ==========================================
        if outcome.status == SolveStatus::Infeasible && self.config.diagnose_infeasible {
            let diagnoser = InfeasibilityDiagnoser::new();
            report.diagnostics = Some(diagnoser.diagnose(
                &model,
                self.config.policy,
                self.config.time_limit(),
                self.config.num_workers,
            ));
        }

        info!(
            status = %report.summary.status,
            total_unmet = report.summary.total_unmet_quantity,
            assignments = report.assignments.len(),
            "分配流程结束"
        );
        Ok(report)
    }
}
