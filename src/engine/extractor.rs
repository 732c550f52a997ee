// ==========================================
// 多工厂产能分配系统 - 结果提取引擎
// ==========================================
// 职责: 把求解器赋值映射回领域语言
// 红线: 只保留严格正数量的分配行; 无解时不臆造任何行
// ==========================================

use crate::domain::{AllocationReport, Assignment, ItemFulfillment, RunSummary};
use crate::engine::encoder::EncodedModel;
use crate::engine::validator::DomainModel;
use crate::solver::{SolveOutcome, SolveStatus};
use tracing::{debug, instrument};

// ==========================================
// ResultExtractor - 结果提取引擎
// ==========================================
pub struct ResultExtractor {
    // 无状态引擎, 不需要注入依赖
}

impl ResultExtractor {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 提取分配报告 (诊断部分由上层按需追加)
    #[instrument(skip(self, model, encoded, outcome), fields(status = %outcome.status))]
    pub fn extract(
        &self,
        model: &DomainModel,
        encoded: &EncodedModel,
        outcome: &SolveOutcome,
    ) -> AllocationReport {
        let unproducible_quantity: i64 =
            model.unproducible.iter().map(|item| item.quantity).sum();

        if !outcome.status.has_solution() {
            // INFEASIBLE / TIMEOUT: 无可用解
            let fulfillment = model
                .items
                .iter()
                .map(|item| ItemFulfillment {
                    item_id: item.item_id.clone(),
                    required: item.quantity,
                    allocated: 0,
                    ratio: 0.0,
                })
                .collect();
            let total_required: i64 = model.items.iter().map(|item| item.quantity).sum();
            return AllocationReport {
                assignments: Vec::new(),
                fulfillment,
                unproducible: model.unproducible.clone(),
                summary: RunSummary {
                    total_unmet_quantity: total_required,
                    unproducible_quantity,
                    objective_value: outcome.objective_value,
                    status: outcome.status,
                    timed_out: outcome.status == SolveStatus::Timeout,
                },
                diagnostics: None,
            };
        }

        // 每项分配总量
        let mut allocated = vec![0i64; model.items.len()];
        for entry in &encoded.assign_vars {
            allocated[entry.item_index] += outcome.value_of(entry.var);
        }

        // 分配行: 变量创建序, 只留正数量
        let mut assignments = Vec::new();
        for entry in &encoded.assign_vars {
            let quantity = outcome.value_of(entry.var);
            if quantity <= 0 {
                continue;
            }
            let item = &model.items[entry.item_index];
            let plant = &model.plants[entry.plant_index];
            assignments.push(Assignment {
                order_id: item.order_id.clone(),
                item_id: item.item_id.clone(),
                plant_id: plant.id.clone(),
                quantity_allocated: quantity,
                fulfilled: allocated[entry.item_index] == item.quantity,
            });
        }

        // 每项满足度
        let fulfillment: Vec<ItemFulfillment> = model
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| ItemFulfillment {
                item_id: item.item_id.clone(),
                required: item.quantity,
                allocated: allocated[index],
                ratio: allocated[index] as f64 / item.quantity as f64,
            })
            .collect();

        let total_unmet_quantity: i64 = encoded
            .unmet_vars
            .iter()
            .map(|entry| outcome.value_of(entry.var))
            .sum();

        debug!(
            assignments = assignments.len(),
            total_unmet_quantity, "结果提取完成"
        );

        AllocationReport {
            assignments,
            fulfillment,
            unproducible: model.unproducible.clone(),
            summary: RunSummary {
                total_unmet_quantity,
                unproducible_quantity,
                objective_value: outcome.objective_value,
                status: outcome.status,
                timed_out: outcome.status == SolveStatus::Feasible,
            },
            diagnostics: None,
        }
    }
}

impl Default for ResultExtractor {
    fn default() -> Self {
        Self::new()
    }
}
