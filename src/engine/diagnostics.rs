// ==========================================
// 多工厂产能分配系统 - 不可行诊断引擎
// ==========================================
// 职责: INFEASIBLE 后的松弛重解与失败分类
// 松弛重解: 只保留硬性产能/可产性/需求约束, 去掉交期与多样性目标
// 分类口径:
//   Structural -- 有需求型号无任何工厂可产 (产能计 0 的也算不可产)
//   Capacity   -- 可产, 但聚合产能不足 (点名型号缺口或超压工厂)
// 红线: 这是单独打日志的显式操作, 不是隐藏重试
// ==========================================

use crate::domain::types::{AllocationPolicy, InfeasibilityClass};
use crate::domain::{InfeasibilityDiagnostics, OverloadedPlant, UnsatisfiableModel};
use crate::engine::encoder::ConstraintEncoder;
use crate::engine::validator::DomainModel;
use crate::solver::{BranchBoundSolver, SolverBackend};
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{info, instrument};

// ==========================================
// InfeasibilityDiagnoser - 不可行诊断引擎
// ==========================================
pub struct InfeasibilityDiagnoser {
    // 无状态引擎, 不需要注入依赖
}

impl InfeasibilityDiagnoser {
    pub fn new() -> Self {
        Self {}
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 松弛重解 + 失败分类
    #[instrument(skip(self, model), fields(
        items = model.items.len(),
        plants = model.plants.len(),
        policy = %policy
    ))]
    pub fn diagnose(
        &self,
        model: &DomainModel,
        policy: AllocationPolicy,
        time_limit: Duration,
        num_workers: usize,
    ) -> InfeasibilityDiagnostics {
        info!("执行不可行诊断: 仅硬约束的松弛重解");

        // ===== 松弛重解 (无目标, 可行性求解) =====
        let mut backend = BranchBoundSolver::new();
        let _ = ConstraintEncoder::new(policy).encode(model, &mut backend);
        let relaxed = backend.solve(time_limit, num_workers);
        info!(relaxed_status = %relaxed.status, "松弛重解完成");

        // ===== 按 modelName 聚合需求与产能 =====
        // 需求含无厂可产项 (它们是结构性证据)
        let mut demand_by_model: BTreeMap<&str, i64> = BTreeMap::new();
        let mut keys_by_model: BTreeMap<&str, Vec<&crate::domain::types::ModelKey>> =
            BTreeMap::new();
        for item in &model.items {
            *demand_by_model.entry(item.model.model_name.as_str()).or_insert(0) +=
                item.quantity;
            keys_by_model
                .entry(item.model.model_name.as_str())
                .or_default()
                .push(&item.model);
        }
        for item in &model.unproducible {
            *demand_by_model.entry(item.model.model_name.as_str()).or_insert(0) +=
                item.quantity;
            keys_by_model
                .entry(item.model.model_name.as_str())
                .or_default()
                .push(&item.model);
        }

        let mut unsatisfiable_models = Vec::new();
        let mut structural = false;
        for (model_name, demand) in &demand_by_model {
            let keys = &keys_by_model[model_name];
            // 可产该型号 (任一需求三元组) 且产能为正的工厂
            let capacity: i64 = model
                .plants
                .iter()
                .filter(|plant| keys.iter().any(|key| plant.can_produce(key)))
                .map(|plant| plant.capacity_for_model(model_name))
                .filter(|capacity| *capacity > 0)
                .sum();
            if capacity == 0 {
                structural = true;
                unsatisfiable_models.push(UnsatisfiableModel {
                    model_name: model_name.to_string(),
                    demand: *demand,
                    capacity: 0,
                    shortfall: *demand,
                });
            } else if demand > &capacity {
                unsatisfiable_models.push(UnsatisfiableModel {
                    model_name: model_name.to_string(),
                    demand: *demand,
                    capacity,
                    shortfall: demand - capacity,
                });
            }
        }

        // ===== 超压工厂: 兼容需求总量超过产能上界 =====
        let mut overloaded_plants = Vec::new();
        for plant in &model.plants {
            let pressure: i64 = model
                .items
                .iter()
                .filter(|item| {
                    plant.can_produce(&item.model)
                        && plant.capacity_for_model(&item.model.model_name) > 0
                })
                .map(|item| item.quantity)
                .sum();
            let capacity = plant.capacity.upper_bound();
            if pressure > capacity {
                overloaded_plants.push(OverloadedPlant {
                    plant_id: plant.id.clone(),
                    capacity,
                    demand_pressure: pressure,
                    shortfall: pressure - capacity,
                });
            }
        }

        let classification = if structural {
            InfeasibilityClass::Structural
        } else {
            InfeasibilityClass::Capacity
        };
        info!(
            classification = %classification,
            unsatisfiable_models = unsatisfiable_models.len(),
            overloaded_plants = overloaded_plants.len(),
            "不可行分类完成"
        );

        InfeasibilityDiagnostics {
            classification,
            relaxed_status: relaxed.status,
            unsatisfiable_models,
            overloaded_plants,
        }
    }
}

impl Default for InfeasibilityDiagnoser {
    fn default() -> Self {
        Self::new()
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
    use crate::engine::validator::DomainValidator;
    use crate::solver::SolveStatus;
    use chrono::NaiveDate;
    use std::collections::BTreeMap;

    const LIMIT: Duration = Duration::from_secs(5);

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn item(family: &str, model: &str, qty: i64) -> OrderItem {
        OrderItem {
            model_family: family.to_string(),
            model_name: model.to_string(),
            submodel: "S1".to_string(),
            quantity: qty,
            due_date: NaiveDate::from_ymd_opt(2026, 3, 10).unwrap(),
        }
    }

    fn per_model_plant(id: &str, model: &str, capacity: i64) -> Plant {
        let mut by_model = BTreeMap::new();
        by_model.insert(model.to_string(), capacity);
        Plant {
            id: id.to_string(),
            capacity: PlantCapacity::PerModel(by_model),
            producible_items: vec![ProducibleSpec::Family {
                family: "F1".to_string(),
            }],
            family_group: "F1".to_string(),
        }
    }

    #[test]
    fn test_capacity_shortfall_classified_and_quantified() {
        // 需求 20, 全体可产工厂产能 15 => Capacity, 缺口 5
        let plants = vec![per_model_plant("P1", "A", 10), per_model_plant("P2", "A", 5)];
        let orders = vec![Order {
            id: "O1".to_string(),
            items: vec![item("F1", "A", 12), item("F1", "A", 8)],
        }];
        let model = DomainValidator::new(30)
            .load(plants, orders, reference_date())
            .unwrap();

        let diagnostics = InfeasibilityDiagnoser::new().diagnose(
            &model,
            AllocationPolicy::RequireFull,
            LIMIT,
            1,
        );

        assert_eq!(diagnostics.classification, InfeasibilityClass::Capacity);
        assert_eq!(diagnostics.relaxed_status, SolveStatus::Infeasible);
        assert_eq!(diagnostics.unsatisfiable_models.len(), 1);
        let entry = &diagnostics.unsatisfiable_models[0];
        assert_eq!(entry.model_name, "A");
        assert_eq!(entry.demand, 20);
        assert_eq!(entry.capacity, 15);
        assert_eq!(entry.shortfall, 5);
    }

    #[test]
    fn test_zero_capacity_producers_classified_structural() {
        // 工厂经 family 通配可产 B, 但产能表只有 A => B 结构性不可满足
        let plants = vec![per_model_plant("P1", "A", 10)];
        let orders = vec![Order {
            id: "O1".to_string(),
            items: vec![item("F1", "A", 4), item("F1", "B", 6)],
        }];
        let model = DomainValidator::new(30)
            .load(plants, orders, reference_date())
            .unwrap();

        let diagnostics = InfeasibilityDiagnoser::new().diagnose(
            &model,
            AllocationPolicy::RequireFull,
            LIMIT,
            1,
        );

        assert_eq!(diagnostics.classification, InfeasibilityClass::Structural);
        let entry = diagnostics
            .unsatisfiable_models
            .iter()
            .find(|entry| entry.model_name == "B")
            .expect("应点名型号 B");
        assert_eq!(entry.capacity, 0);
        assert_eq!(entry.shortfall, 6);
    }

    #[test]
    fn test_overloaded_plants_reported() {
        let plants = vec![per_model_plant("P1", "A", 10)];
        let orders = vec![Order {
            id: "O1".to_string(),
            items: vec![item("F1", "A", 25)],
        }];
        let model = DomainValidator::new(30)
            .load(plants, orders, reference_date())
            .unwrap();

        let diagnostics = InfeasibilityDiagnoser::new().diagnose(
            &model,
            AllocationPolicy::RequireFull,
            LIMIT,
            1,
        );

        assert_eq!(diagnostics.overloaded_plants.len(), 1);
        assert_eq!(diagnostics.overloaded_plants[0].plant_id, "P1");
        assert_eq!(diagnostics.overloaded_plants[0].demand_pressure, 25);
        assert_eq!(diagnostics.overloaded_plants[0].shortfall, 15);
    }
}
