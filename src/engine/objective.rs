// ==========================================
// 多工厂产能分配系统 - 目标合成引擎
// ==========================================
// 职责: 把交期优先 + 型号多样性合成为单一整数最小化目标
// 词典序经 big-M 加权表达:
//   主项  Σ unmet_i * c(d_i) * M     (早交期单位罚更高)
//   次项  - Σ y_t                    (偏好工厂中每个非零分配的型号三元组奖励 1)
// 分离不变量: M = 三元组数 + 1, 主项系数全为 M 的倍数
//   => 任意两个不同主项总值差 >= M > 次项最大幅度
//   => 次项只能在主项平局内起作用
// 红线: 全整数权重, 不用浮点
// ==========================================

use crate::engine::encoder::EncodedModel;
use crate::engine::validator::DomainModel;
use crate::solver::{LinearExpr, Relation, SolverBackend, VarId};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::types::ModelKey;

// ==========================================
// 错误类型
// ==========================================
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComposeError {
    #[error("交期系数碰撞: d={d_earlier} 与 d={d_later} 的系数均为 {coefficient}, 请增大 primary_scale")]
    CoefficientCollision {
        d_earlier: i64,
        d_later: i64,
        coefficient: i64,
    },

    #[error("目标函数量级超出 i64 安全范围: {magnitude}")]
    ObjectiveOverflow { magnitude: i128 },
}

// ==========================================
// 合成产物
// ==========================================

/// 偏好工厂中一个型号三元组的多样性指示变量 (y_t ∈ [0,1])
#[derive(Debug, Clone)]
pub struct DiversityVariable {
    pub var: VarId,
    pub model: ModelKey,
}

#[derive(Debug, Clone)]
pub struct ComposedObjective {
    /// 交给 Adapter 最小化的完整表达式
    pub expr: LinearExpr,
    /// 主项乘数 M (任意两个不同主项总值的最小间距)
    pub primary_multiplier: i64,
    /// 次项最大幅度 (= 三元组数)
    pub secondary_budget: i64,
    /// 每个快照项的未缩放交期系数 c(d_i), 与 model.items 同序
    pub coefficients: Vec<i64>,
    pub diversity_vars: Vec<DiversityVariable>,
}

impl ComposedObjective {
    /// 分离不变量: 最小主项间距 > 次项最大幅度
    pub fn separation_holds(&self) -> bool {
        self.primary_multiplier > self.secondary_budget
    }
}

// ==========================================
// ObjectiveComposer - 目标合成引擎
// ==========================================
pub struct ObjectiveComposer {
    primary_scale: i64,
    horizon_days: i64,
    preferred_plant: Option<String>,
}

impl ObjectiveComposer {
    /// # 参数
    /// - `primary_scale`: 交期系数基准 (d=0 时的单位罚)
    /// - `horizon_days`: 归一化视野 (与 Validator 一致)
    /// - `preferred_plant`: 多样性奖励的指定偏好工厂, None 禁用次项
    pub fn new(primary_scale: i64, horizon_days: i64, preferred_plant: Option<String>) -> Self {
        Self {
            primary_scale,
            horizon_days,
            preferred_plant,
        }
    }

    // ==========================================
    // 系数
    // ==========================================

    /// 交期系数 c(d), 对 daysUntilDue 严格递减
    ///
    /// d >= 0: primary_scale / (1 + d)
    /// d <  0: primary_scale + |d| * overdue_step  (逾期越久罚越高)
    pub fn coefficient(&self, days_until_due: i64) -> i64 {
        let d = days_until_due.clamp(-self.horizon_days, self.horizon_days);
        if d >= 0 {
            self.primary_scale / (1 + d)
        } else {
            self.primary_scale + (-d) * self.overdue_step()
        }
    }

    fn overdue_step(&self) -> i64 {
        (self.primary_scale / (1 + self.horizon_days)).max(1)
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 合成目标表达式
    ///
    /// 多样性指示变量在此创建 (它们是目标的私有管道, 不属于硬约束):
    ///   y_t ∈ [0,1], y_t <= Σ x(偏好工厂, 三元组 t)
    #[instrument(skip(self, model, encoded, backend), fields(
        items = model.items.len(),
        preferred_plant = self.preferred_plant.as_deref().unwrap_or("-")
    ))]
    pub fn compose(
        &self,
        model: &DomainModel,
        encoded: &EncodedModel,
        backend: &mut dyn SolverBackend,
    ) -> Result<ComposedObjective, ComposeError> {
        // ===== 系数严格递减防线 =====
        let mut distinct_days: Vec<i64> = model
            .items
            .iter()
            .map(|item| item.days_until_due.clamp(-self.horizon_days, self.horizon_days))
            .collect();
        distinct_days.sort_unstable();
        distinct_days.dedup();
        for window in distinct_days.windows(2) {
            let (earlier, later) = (window[0], window[1]);
            if self.coefficient(earlier) <= self.coefficient(later) {
                return Err(ComposeError::CoefficientCollision {
                    d_earlier: earlier,
                    d_later: later,
                    coefficient: self.coefficient(later),
                });
            }
        }

        // ===== 偏好工厂的多样性三元组 =====
        let preferred_index = self
            .preferred_plant
            .as_deref()
            .and_then(|id| model.plants.iter().position(|plant| plant.id == id));
        // BTreeMap<三元组, 该三元组在偏好工厂的分配变量> -- 确定性枚举顺序
        let mut preferred_triples: BTreeMap<ModelKey, Vec<VarId>> = BTreeMap::new();
        if let Some(plant_index) = preferred_index {
            for entry in encoded
                .assign_vars
                .iter()
                .filter(|entry| entry.plant_index == plant_index)
            {
                preferred_triples
                    .entry(model.items[entry.item_index].model.clone())
                    .or_default()
                    .push(entry.var);
            }
        }

        let secondary_budget = preferred_triples.len() as i64;
        let primary_multiplier = secondary_budget + 1;

        // ===== 主项: Σ unmet_i * c(d_i) * M =====
        let mut expr = LinearExpr::new();
        let mut coefficients = Vec::with_capacity(model.items.len());
        let mut magnitude: i128 = secondary_budget as i128;
        for (item_index, item) in model.items.iter().enumerate() {
            let base = self.coefficient(item.days_until_due);
            coefficients.push(base);
            let scaled = base
                .checked_mul(primary_multiplier)
                .ok_or(ComposeError::ObjectiveOverflow {
                    magnitude: base as i128 * primary_multiplier as i128,
                })?;
            magnitude += scaled as i128 * item.quantity as i128;
            expr.add_term(scaled, encoded.unmet_var_for_item(item_index));
        }
        if magnitude > (i64::MAX / 4) as i128 {
            return Err(ComposeError::ObjectiveOverflow { magnitude });
        }

        // ===== 次项: 每个三元组奖励 1 =====
        let mut diversity_vars = Vec::new();
        for (model_key, vars) in preferred_triples {
            let indicator = backend.add_int_var(0, 1);
            // y_t <= Σ x  (仅当偏好工厂拿到非零分配时 y_t 才可为 1)
            let mut link = LinearExpr::new().term(1, indicator);
            for var in &vars {
                link.add_term(-1, *var);
            }
            backend.add_linear_constraint(link, Relation::LessOrEqual, 0);
            expr.add_term(-1, indicator);
            diversity_vars.push(DiversityVariable {
                var: indicator,
                model: model_key,
            });
        }

        let composed = ComposedObjective {
            expr,
            primary_multiplier,
            secondary_budget,
            coefficients,
            diversity_vars,
        };
        debug_assert!(composed.separation_holds());
        debug!(
            primary_multiplier,
            secondary_budget,
            terms = composed.expr.terms.len(),
            "目标合成完成"
        );
        Ok(composed)
    }
}

impl Default for ObjectiveComposer {
    fn default() -> Self {
        Self::new(1_000_000, 30, None)
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{Order, OrderItem};
    use crate::domain::plant::{Plant, PlantCapacity, ProducibleSpec};
    use crate::domain::types::AllocationPolicy;
    use crate::engine::encoder::ConstraintEncoder;
    use crate::engine::validator::DomainValidator;
    use crate::solver::BranchBoundSolver;
    use chrono::NaiveDate;

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn triple_spec(family: &str, model: &str, submodel: &str) -> ProducibleSpec {
        ProducibleSpec::Model {
            model_family: family.to_string(),
            model_name: model.to_string(),
            submodel: submodel.to_string(),
        }
    }

    fn snapshot_two_items() -> DomainModel {
        let plants = vec![Plant {
            id: "P1".to_string(),
            capacity: PlantCapacity::Total(20),
            producible_items: vec![triple_spec("F1", "A", "S1"), triple_spec("F1", "B", "S1")],
            family_group: "F1".to_string(),
        }];
        let orders = vec![Order {
            id: "O1".to_string(),
            items: vec![
                OrderItem {
                    model_family: "F1".to_string(),
                    model_name: "A".to_string(),
                    submodel: "S1".to_string(),
                    quantity: 5,
                    due_date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
                },
                OrderItem {
                    model_family: "F1".to_string(),
                    model_name: "B".to_string(),
                    submodel: "S1".to_string(),
                    quantity: 5,
                    due_date: NaiveDate::from_ymd_opt(2026, 3, 11).unwrap(),
                },
            ],
        }];
        DomainValidator::new(30)
            .load(plants, orders, reference_date())
            .unwrap()
    }

    #[test]
    fn test_coefficient_strictly_decreasing() {
        let composer = ObjectiveComposer::new(1_000_000, 30, None);
        for d in -30..30 {
            assert!(
                composer.coefficient(d) > composer.coefficient(d + 1),
                "c({}) 必须大于 c({})",
                d,
                d + 1
            );
        }
    }

    #[test]
    fn test_coefficient_clamped_outside_horizon() {
        let composer = ObjectiveComposer::new(1_000_000, 30, None);
        assert_eq!(composer.coefficient(31), composer.coefficient(30));
        assert_eq!(composer.coefficient(-31), composer.coefficient(-30));
    }

    #[test]
    fn test_overdue_penalized_above_base() {
        let composer = ObjectiveComposer::new(1_000_000, 30, None);
        assert!(composer.coefficient(-1) > composer.coefficient(0));
        assert!(composer.coefficient(-5) > composer.coefficient(-1));
    }

    #[test]
    fn test_separation_invariant_holds() {
        let snapshot = snapshot_two_items();
        let mut backend = BranchBoundSolver::new();
        let encoded =
            ConstraintEncoder::new(AllocationPolicy::AllowPartial).encode(&snapshot, &mut backend);
        let composer = ObjectiveComposer::new(1_000_000, 30, Some("P1".to_string()));

        let composed = composer.compose(&snapshot, &encoded, &mut backend).unwrap();
        // 2 个三元组 => M = 3
        assert_eq!(composed.secondary_budget, 2);
        assert_eq!(composed.primary_multiplier, 3);
        assert!(composed.separation_holds());
        // 主项系数全为 M 的倍数
        for (coef, _) in composed
            .expr
            .terms
            .iter()
            .filter(|(coef, _)| *coef > 0)
        {
            assert_eq!(coef % composed.primary_multiplier, 0);
        }
    }

    #[test]
    fn test_no_preferred_plant_disables_secondary() {
        let snapshot = snapshot_two_items();
        let mut backend = BranchBoundSolver::new();
        let encoded =
            ConstraintEncoder::new(AllocationPolicy::AllowPartial).encode(&snapshot, &mut backend);
        let composer = ObjectiveComposer::new(1_000_000, 30, None);

        let composed = composer.compose(&snapshot, &encoded, &mut backend).unwrap();
        assert_eq!(composed.secondary_budget, 0);
        assert_eq!(composed.primary_multiplier, 1);
        assert!(composed.diversity_vars.is_empty());
        // 仅松弛变量进目标
        assert_eq!(composed.expr.terms.len(), 2);
    }

    #[test]
    fn test_coefficient_collision_detected() {
        // primary_scale 过小: 远端交期的整数除法系数塌缩
        let composer = ObjectiveComposer::new(10, 30, None);
        let plants = vec![Plant {
            id: "P1".to_string(),
            capacity: PlantCapacity::Total(50),
            producible_items: vec![triple_spec("F1", "A", "S1")],
            family_group: "F1".to_string(),
        }];
        let orders = vec![Order {
            id: "O1".to_string(),
            items: vec![
                OrderItem {
                    model_family: "F1".to_string(),
                    model_name: "A".to_string(),
                    submodel: "S1".to_string(),
                    quantity: 1,
                    due_date: NaiveDate::from_ymd_opt(2026, 3, 21).unwrap(), // d=20 => 10/21=0
                },
                OrderItem {
                    model_family: "F1".to_string(),
                    model_name: "A".to_string(),
                    submodel: "S1".to_string(),
                    quantity: 1,
                    due_date: NaiveDate::from_ymd_opt(2026, 3, 26).unwrap(), // d=25 => 10/26=0
                },
            ],
        }];
        let snapshot = DomainValidator::new(30)
            .load(plants, orders, reference_date())
            .unwrap();
        let mut backend = BranchBoundSolver::new();
        let encoded =
            ConstraintEncoder::new(AllocationPolicy::AllowPartial).encode(&snapshot, &mut backend);

        let err = composer
            .compose(&snapshot, &encoded, &mut backend)
            .unwrap_err();
        assert!(matches!(err, ComposeError::CoefficientCollision { .. }));
    }
}
