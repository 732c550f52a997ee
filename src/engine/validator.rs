// ==========================================
// 多工厂产能分配系统 - 领域模型校验引擎
// ==========================================
// 职责: 将边界记录一次性校验为不可变领域快照
// 输入: 工厂列表 + 订单列表 + 参考时钟
// 输出: DomainModel (items 按固定排序键排列)
// 红线: 下游从不 ad hoc 取字段, 非法输入在此 fail fast
// ==========================================

use crate::domain::order::{Order, PlanningItem};
use crate::domain::plant::{Plant, PlantCapacity, ProducibleSpec};
use crate::domain::types::ModelKey;
use crate::domain::UnproducibleItem;
use crate::engine::error::ValidationError;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use tracing::{instrument, warn};

/// 无厂可产的标记原因
pub const REASON_NO_COMPATIBLE_PLANT: &str = "NO_COMPATIBLE_PLANT";

// ==========================================
// DomainModel - 校验后的不可变快照
// ==========================================
// 每次优化运行独占一份快照; 运行之间互不可见
#[derive(Debug, Clone)]
pub struct DomainModel {
    /// 按 id 升序
    pub plants: Vec<Plant>,
    /// 可产项, 按 (order_id, due_date, item_id) 升序
    pub items: Vec<PlanningItem>,
    /// 无厂可产项 (从硬约束剔除, 保留用于诊断)
    pub unproducible: Vec<UnproducibleItem>,
    pub reference_date: NaiveDate,
}

impl DomainModel {
    /// 全部需求 (含无厂可产项) 的型号键集合
    pub fn demanded_models(&self) -> BTreeSet<ModelKey> {
        self.items
            .iter()
            .map(|item| item.model.clone())
            .chain(self.unproducible.iter().map(|item| item.model.clone()))
            .collect()
    }
}

// ==========================================
// DomainValidator - 校验引擎
// ==========================================
pub struct DomainValidator {
    horizon_days: i64,
}

impl DomainValidator {
    /// # 参数
    /// - `horizon_days`: 交期归一化视野, days_until_due 夹在 [-h, h]
    pub fn new(horizon_days: i64) -> Self {
        Self { horizon_days }
    }

    // ==========================================
    // 核心方法
    // ==========================================

    /// 装载并校验为领域快照
    ///
    /// 校验规则:
    /// 1) 工厂: id 非空且唯一, 产能为正, producibleItems 非空,
    ///    familyGroup 非空, family 通配不得悬空
    /// 2) 订单: id 非空且唯一, 每项数量为正, 型号字段非空
    /// 3) 无厂可产项标记 unproducible (非致命), 其余进入快照
    #[instrument(skip(self, plants, orders), fields(
        plants_count = plants.len(),
        orders_count = orders.len(),
        reference_date = %reference_date
    ))]
    pub fn load(
        &self,
        plants: Vec<Plant>,
        orders: Vec<Order>,
        reference_date: NaiveDate,
    ) -> Result<DomainModel, ValidationError> {
        let mut plants = plants;
        plants.sort_by(|a, b| a.id.cmp(&b.id));

        // ===== 工厂校验 =====
        let mut seen_plants: BTreeSet<&str> = BTreeSet::new();
        for plant in &plants {
            if plant.id.trim().is_empty() {
                return Err(ValidationError::EmptyPlantId);
            }
            if !seen_plants.insert(plant.id.as_str()) {
                return Err(ValidationError::DuplicatePlant {
                    plant_id: plant.id.clone(),
                });
            }
            if plant.family_group.trim().is_empty() {
                return Err(ValidationError::EmptyFamilyGroup {
                    plant_id: plant.id.clone(),
                });
            }
            if plant.producible_items.is_empty() {
                return Err(ValidationError::EmptyProducibleSet {
                    plant_id: plant.id.clone(),
                });
            }
            match &plant.capacity {
                PlantCapacity::Total(total) => {
                    if *total <= 0 {
                        return Err(ValidationError::NonPositiveCapacity {
                            plant_id: plant.id.clone(),
                            field: "totalCapacity".to_string(),
                            value: *total,
                        });
                    }
                }
                PlantCapacity::PerModel(by_model) => {
                    if by_model.is_empty() {
                        return Err(ValidationError::EmptyCapacityMap {
                            plant_id: plant.id.clone(),
                        });
                    }
                    for (model_name, capacity) in by_model {
                        if *capacity <= 0 {
                            return Err(ValidationError::NonPositiveCapacity {
                                plant_id: plant.id.clone(),
                                field: format!("capacityByModel[{}]", model_name),
                                value: *capacity,
                            });
                        }
                    }
                }
            }
        }

        // ===== 订单校验与展开 =====
        let mut seen_orders: BTreeSet<&str> = BTreeSet::new();
        for order in &orders {
            if order.id.trim().is_empty() {
                return Err(ValidationError::EmptyOrderId);
            }
            if !seen_orders.insert(order.id.as_str()) {
                return Err(ValidationError::DuplicateOrder {
                    order_id: order.id.clone(),
                });
            }
        }

        let mut expanded: Vec<PlanningItem> = Vec::new();
        for order in &orders {
            for (index, line) in order.items.iter().enumerate() {
                let ordinal = index + 1;
                for (field, value) in [
                    ("modelFamily", &line.model_family),
                    ("modelName", &line.model_name),
                    ("submodel", &line.submodel),
                ] {
                    if value.trim().is_empty() {
                        return Err(ValidationError::EmptyItemField {
                            order_id: order.id.clone(),
                            index: ordinal,
                            field: field.to_string(),
                        });
                    }
                }
                if line.quantity <= 0 {
                    return Err(ValidationError::NonPositiveQuantity {
                        order_id: order.id.clone(),
                        index: ordinal,
                        value: line.quantity,
                    });
                }

                // 交期归一化到参考时钟
                let days_until_due = (line.due_date - reference_date)
                    .num_days()
                    .clamp(-self.horizon_days, self.horizon_days);

                expanded.push(PlanningItem {
                    item_id: format!("{}-{:03}", order.id, ordinal),
                    order_id: order.id.clone(),
                    model: ModelKey::new(
                        line.model_family.clone(),
                        line.model_name.clone(),
                        line.submodel.clone(),
                    ),
                    quantity: line.quantity,
                    due_date: line.due_date,
                    days_until_due,
                });
            }
        }

        // ===== 悬空 family 引用 =====
        // 已知 family = 工厂 familyGroup ∪ 生产项 modelFamily
        let mut known_families: BTreeSet<&str> = BTreeSet::new();
        for plant in &plants {
            known_families.insert(plant.family_group.as_str());
        }
        for item in &expanded {
            known_families.insert(item.model.model_family.as_str());
        }
        for plant in &plants {
            for spec in &plant.producible_items {
                if let ProducibleSpec::Family { family } = spec {
                    if !known_families.contains(family.as_str()) {
                        return Err(ValidationError::DanglingFamilyReference {
                            plant_id: plant.id.clone(),
                            family: family.clone(),
                        });
                    }
                }
            }
        }

        // ===== 无厂可产标记 =====
        let mut items = Vec::new();
        let mut unproducible = Vec::new();
        for item in expanded {
            let producible = plants.iter().any(|plant| plant.can_produce(&item.model));
            if producible {
                items.push(item);
            } else {
                warn!(
                    item_id = %item.item_id,
                    model = %item.model,
                    quantity = item.quantity,
                    "生产项无厂可产, 从硬约束剔除"
                );
                unproducible.push(UnproducibleItem {
                    item_id: item.item_id,
                    order_id: item.order_id,
                    model: item.model,
                    quantity: item.quantity,
                    reason: REASON_NO_COMPATIBLE_PLANT.to_string(),
                });
            }
        }

        // 固定排序键: (order_id, due_date, item_id)
        // 变量/约束创建顺序由此决定, 与任何 map 迭代顺序无关
        items.sort_by(|a, b| {
            (&a.order_id, a.due_date, &a.item_id).cmp(&(&b.order_id, b.due_date, &b.item_id))
        });

        Ok(DomainModel {
            plants,
            items,
            unproducible,
            reference_date,
        })
    }
}

impl Default for DomainValidator {
    fn default() -> Self {
        Self::new(30)
    }
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::OrderItem;
    use std::collections::BTreeMap;

    fn reference_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    fn plant_total(id: &str, family_group: &str, total: i64, specs: Vec<ProducibleSpec>) -> Plant {
        Plant {
            id: id.to_string(),
            capacity: PlantCapacity::Total(total),
            producible_items: specs,
            family_group: family_group.to_string(),
        }
    }

    fn model_spec(family: &str, model: &str, submodel: &str) -> ProducibleSpec {
        ProducibleSpec::Model {
            model_family: family.to_string(),
            model_name: model.to_string(),
            submodel: submodel.to_string(),
        }
    }

    fn order_with_item(order_id: &str, family: &str, model: &str, qty: i64, due: NaiveDate) -> Order {
        Order {
            id: order_id.to_string(),
            items: vec![OrderItem {
                model_family: family.to_string(),
                model_name: model.to_string(),
                submodel: "S1".to_string(),
                quantity: qty,
                due_date: due,
            }],
        }
    }

    #[test]
    fn test_load_normalizes_due_dates() {
        let validator = DomainValidator::new(30);
        let plants = vec![plant_total(
            "P1",
            "F1",
            10,
            vec![model_spec("F1", "A", "S1")],
        )];
        let due = NaiveDate::from_ymd_opt(2026, 3, 6).unwrap();
        let orders = vec![order_with_item("O1", "F1", "A", 5, due)];

        let model = validator.load(plants, orders, reference_date()).unwrap();
        assert_eq!(model.items.len(), 1);
        assert_eq!(model.items[0].days_until_due, 5);
        assert_eq!(model.items[0].item_id, "O1-001");
    }

    #[test]
    fn test_days_until_due_clamped_to_horizon() {
        let validator = DomainValidator::new(30);
        let plants = vec![plant_total("P1", "F1", 10, vec![model_spec("F1", "A", "S1")])];
        let far_due = NaiveDate::from_ymd_opt(2027, 3, 1).unwrap();
        let overdue = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let orders = vec![
            order_with_item("O1", "F1", "A", 5, far_due),
            order_with_item("O2", "F1", "A", 5, overdue),
        ];

        let model = validator.load(plants, orders, reference_date()).unwrap();
        assert_eq!(model.items[0].days_until_due, 30);
        assert_eq!(model.items[1].days_until_due, -30);
    }

    #[test]
    fn test_rejects_non_positive_quantity() {
        let validator = DomainValidator::new(30);
        let plants = vec![plant_total("P1", "F1", 10, vec![model_spec("F1", "A", "S1")])];
        let orders = vec![order_with_item("O1", "F1", "A", 0, reference_date())];

        let err = validator.load(plants, orders, reference_date()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::NonPositiveQuantity {
                order_id: "O1".to_string(),
                index: 1,
                value: 0,
            }
        );
    }

    #[test]
    fn test_rejects_non_positive_capacity_naming_field() {
        let validator = DomainValidator::new(30);
        let mut by_model = BTreeMap::new();
        by_model.insert("A".to_string(), 0i64);
        let plants = vec![Plant {
            id: "P1".to_string(),
            capacity: PlantCapacity::PerModel(by_model),
            producible_items: vec![model_spec("F1", "A", "S1")],
            family_group: "F1".to_string(),
        }];
        let orders = vec![order_with_item("O1", "F1", "A", 5, reference_date())];

        let err = validator.load(plants, orders, reference_date()).unwrap_err();
        match err {
            ValidationError::NonPositiveCapacity { plant_id, field, value } => {
                assert_eq!(plant_id, "P1");
                assert_eq!(field, "capacityByModel[A]");
                assert_eq!(value, 0);
            }
            other => panic!("期望 NonPositiveCapacity, 实得 {other:?}"),
        }
    }

    #[test]
    fn test_rejects_dangling_family_reference() {
        let validator = DomainValidator::new(30);
        let plants = vec![plant_total(
            "P1",
            "F1",
            10,
            vec![ProducibleSpec::Family {
                family: "GHOST".to_string(),
            }],
        )];
        let orders = vec![order_with_item("O1", "F1", "A", 5, reference_date())];

        let err = validator.load(plants, orders, reference_date()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::DanglingFamilyReference {
                plant_id: "P1".to_string(),
                family: "GHOST".to_string(),
            }
        );
    }

    #[test]
    fn test_family_reference_resolved_by_item_family() {
        // 通配 family 只要被任一生产项的 modelFamily 命中即不悬空
        let validator = DomainValidator::new(30);
        let plants = vec![plant_total(
            "P1",
            "F1",
            10,
            vec![ProducibleSpec::Family {
                family: "F2".to_string(),
            }],
        )];
        let orders = vec![order_with_item("O1", "F2", "A", 5, reference_date())];

        let model = validator.load(plants, orders, reference_date()).unwrap();
        assert_eq!(model.items.len(), 1);
        assert!(model.unproducible.is_empty());
    }

    #[test]
    fn test_unproducible_item_marked_not_rejected() {
        let validator = DomainValidator::new(30);
        let plants = vec![plant_total("P1", "F1", 10, vec![model_spec("F1", "A", "S1")])];
        let orders = vec![
            order_with_item("O1", "F1", "A", 5, reference_date()),
            order_with_item("O2", "F9", "Z", 3, reference_date()),
        ];

        let model = validator.load(plants, orders, reference_date()).unwrap();
        assert_eq!(model.items.len(), 1);
        assert_eq!(model.unproducible.len(), 1);
        assert_eq!(model.unproducible[0].item_id, "O2-001");
        assert_eq!(model.unproducible[0].reason, REASON_NO_COMPATIBLE_PLANT);
        assert_eq!(model.unproducible[0].quantity, 3);
    }

    #[test]
    fn test_duplicate_plant_rejected() {
        let validator = DomainValidator::new(30);
        let plants = vec![
            plant_total("P1", "F1", 10, vec![model_spec("F1", "A", "S1")]),
            plant_total("P1", "F1", 20, vec![model_spec("F1", "A", "S1")]),
        ];
        let err = validator
            .load(plants, vec![], reference_date())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::DuplicatePlant {
                plant_id: "P1".to_string()
            }
        );
    }

    #[test]
    fn test_items_sorted_by_order_due_item() {
        let validator = DomainValidator::new(30);
        let plants = vec![plant_total("P1", "F1", 100, vec![model_spec("F1", "A", "S1")])];
        let d1 = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        let d2 = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
        let orders = vec![
            Order {
                id: "O2".to_string(),
                items: vec![
                    OrderItem {
                        model_family: "F1".to_string(),
                        model_name: "A".to_string(),
                        submodel: "S1".to_string(),
                        quantity: 1,
                        due_date: d2,
                    },
                    OrderItem {
                        model_family: "F1".to_string(),
                        model_name: "A".to_string(),
                        submodel: "S1".to_string(),
                        quantity: 1,
                        due_date: d1,
                    },
                ],
            },
            order_with_item("O1", "F1", "A", 1, d2),
        ];

        let model = validator.load(plants, orders, reference_date()).unwrap();
        let ids: Vec<&str> = model.items.iter().map(|i| i.item_id.as_str()).collect();
        // O1 在前; O2 内部早交期在前
        assert_eq!(ids, vec!["O1-001", "O2-002", "O2-001"]);
    }
}
