// ==========================================
// 多工厂产能分配系统 - 约束编码引擎
// ==========================================
// 职责: 把领域快照翻译为求解器变量与线性约束
// 红线: family 不兼容的 (item, plant) 对从不实例化 (省略而非取反);
//       变量与约束按快照排序序创建, 两次相同输入产生相同序列
// ==========================================

use crate::domain::plant::PlantCapacity;
use crate::domain::types::AllocationPolicy;
use crate::engine::validator::DomainModel;
use crate::solver::{LinearExpr, Relation, SolverBackend, VarId};
use std::collections::BTreeMap;
use tracing::{debug, instrument};

// ==========================================
// 编码产物
// ==========================================

/// 一个可产 (item, plant) 对的分配变量
#[derive(Debug, Clone, Copy)]
pub struct AssignVariable {
    pub var: VarId,
    pub item_index: usize,
    pub plant_index: usize,
}

/// 一个生产项的未满足松弛变量
#[derive(Debug, Clone, Copy)]
pub struct UnmetVariable {
    pub var: VarId,
    pub item_index: usize,
}

/// 变量映射表 (Extractor 与 Composer 的共同输入)
#[derive(Debug, Clone, Default)]
pub struct EncodedModel {
    /// 按创建顺序: item 外层 (快照序), plant 内层 (id 序)
    pub assign_vars: Vec<AssignVariable>,
    /// 每个快照项一个, 与 model.items 同序
    pub unmet_vars: Vec<UnmetVariable>,
}

impl EncodedModel {
    pub fn assign_vars_for_item(
        &self,
        item_index: usize,
    ) -> impl Iterator<Item = &AssignVariable> {
        self.assign_vars
            .iter()
            .filter(move |entry| entry.item_index == item_index)
    }

    pub fn unmet_var_for_item(&self, item_index: usize) -> VarId {
        self.unmet_vars[item_index].var
    }
}

// ==========================================
// ConstraintEncoder - 约束编码引擎
// ==========================================
pub struct ConstraintEncoder {
    policy: AllocationPolicy,
}

impl ConstraintEncoder {
    pub fn new(policy: AllocationPolicy) -> Self {
        Self { policy }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 编码快照
    ///
    /// 规则:
    /// 1) 每个可产 (item, plant) 对建一个非负整数变量,
    ///    上界 min(quantity, 该厂该型号产能); 产能 0 的对不建
    /// 2) 每项需求约束: Σ assigned + unmet == quantity
    ///    (AllowPartial: unmet ∈ [0, quantity]; RequireFull: unmet == 0)
    /// 3) 每厂产能约束: PerModel 按 (plant, model) 分行,
    ///    Total 全厂一行
    #[instrument(skip(self, model, backend), fields(
        items = model.items.len(),
        plants = model.plants.len(),
        policy = %self.policy
    ))]
    pub fn encode(&self, model: &DomainModel, backend: &mut dyn SolverBackend) -> EncodedModel {
        let mut encoded = EncodedModel::default();

        // 1) 决策变量 (item 外层, plant 内层, 均为快照序)
        for (item_index, item) in model.items.iter().enumerate() {
            for (plant_index, plant) in model.plants.iter().enumerate() {
                if !plant.can_produce(&item.model) {
                    continue; // 省略而非取反
                }
                let capacity = plant.capacity_for_model(&item.model.model_name);
                if capacity <= 0 {
                    continue;
                }
                let upper = item.quantity.min(capacity);
                encoded.assign_vars.push(AssignVariable {
                    var: backend.add_int_var(0, upper),
                    item_index,
                    plant_index,
                });
            }

            let unmet_upper = match self.policy {
                AllocationPolicy::AllowPartial => item.quantity,
                AllocationPolicy::RequireFull => 0,
            };
            encoded.unmet_vars.push(UnmetVariable {
                var: backend.add_int_var(0, unmet_upper),
                item_index,
            });
        }

        // 2) 需求约束: Σ assigned + unmet == quantity
        for (item_index, item) in model.items.iter().enumerate() {
            let mut expr = LinearExpr::new();
            for entry in encoded.assign_vars_for_item(item_index) {
                expr.add_term(1, entry.var);
            }
            expr.add_term(1, encoded.unmet_var_for_item(item_index));
            backend.add_linear_constraint(expr, Relation::Equal, item.quantity);
        }

        // 3) 产能约束
        for (plant_index, plant) in model.plants.iter().enumerate() {
            match &plant.capacity {
                PlantCapacity::Total(total) => {
                    let mut expr = LinearExpr::new();
                    for entry in encoded
                        .assign_vars
                        .iter()
                        .filter(|entry| entry.plant_index == plant_index)
                    {
                        expr.add_term(1, entry.var);
                    }
                    if !expr.terms.is_empty() {
                        backend.add_linear_constraint(expr, Relation::LessOrEqual, *total);
                    }
                }
                PlantCapacity::PerModel(by_model) => {
                    // 按型号分组 (BTreeMap 保证确定性发布顺序)
                    let mut grouped: BTreeMap<&str, LinearExpr> = BTreeMap::new();
                    for entry in encoded
                        .assign_vars
                        .iter()
                        .filter(|entry| entry.plant_index == plant_index)
                    {
                        let model_name =
                            model.items[entry.item_index].model.model_name.as_str();
                        grouped
                            .entry(model_name)
                            .or_insert_with(LinearExpr::new)
                            .add_term(1, entry.var);
                    }
                    for (model_name, expr) in grouped {
                        let capacity = by_model.get(model_name).copied().unwrap_or(0);
                        backend.add_linear_constraint(expr, Relation::LessOrEqual, capacity);
                    }
                }
            }
        }

        debug!(
            assign_vars = encoded.assign_vars.len(),
            unmet_vars = encoded.unmet_vars.len(),
            "约束编码完成"
        );
        encoded
    }
}

impl Default for ConstraintEncoder {
    fn default() -> Self {
        Self::new(AllocationPolicy::AllowPartial)
    }
}
