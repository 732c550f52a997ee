// ==========================================
// 多工厂产能分配系统 - 文档装载器
// ==========================================
// 支持: 工厂 JSON; 订单 JSON / CSV (按扩展名分派)
// 红线: 文件/格式问题在此 fail fast, 不进引擎
// ==========================================

use crate::domain::order::{Order, OrderItem};
use crate::domain::plant::Plant;
use crate::importer::document::{CsvOrderRow, OrdersDocument, PlantRecord};
use crate::importer::error::ImportError;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::{info, instrument};

/// 装载工厂文档 (JSON)
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_plants(path: &Path) -> Result<Vec<Plant>, ImportError> {
    if !path.is_file() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let content = std::fs::read_to_string(path)?;
    let records: Vec<PlantRecord> = serde_json::from_str(&content)?;
    let plants = records
        .into_iter()
        .map(PlantRecord::into_plant)
        .collect::<Result<Vec<_>, _>>()?;
    info!(plants = plants.len(), "工厂文档装载完成");
    Ok(plants)
}

/// 装载订单文档 (JSON 或 CSV, 按扩展名分派)
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_orders(path: &Path) -> Result<Vec<Order>, ImportError> {
    if !path.is_file() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let orders = match extension.as_str() {
        "json" => load_orders_json(path)?,
        "csv" => load_orders_csv(path)?,
        other => return Err(ImportError::UnsupportedFormat(other.to_string())),
    };
    info!(orders = orders.len(), "订单文档装载完成");
    Ok(orders)
}

fn load_orders_json(path: &Path) -> Result<Vec<Order>, ImportError> {
    let content = std::fs::read_to_string(path)?;
    let document: OrdersDocument = serde_json::from_str(&content)?;
    document
        .orders
        .into_iter()
        .map(|record| record.into_order())
        .collect()
}

/// CSV 扁平行按 orderId 重组为订单 (保持首现顺序)
fn load_orders_csv(path: &Path) -> Result<Vec<Order>, ImportError> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut orders: Vec<Order> = Vec::new();
    let mut index_by_id: HashMap<String, usize> = HashMap::new();
    for row in reader.deserialize() {
        let row: CsvOrderRow = row?;
        let due_date =
            NaiveDate::parse_from_str(&row.due_date, "%Y-%m-%d").map_err(|_| {
                ImportError::InvalidDueDate {
                    order_id: row.order_id.clone(),
                    value: row.due_date.clone(),
                }
            })?;
        let item = OrderItem {
            model_family: row.model_family,
            model_name: row.model_name,
            submodel: row.submodel,
            quantity: row.quantity,
            due_date,
        };
        match index_by_id.get(&row.order_id) {
            Some(&index) => orders[index].items.push(item),
            None => {
                index_by_id.insert(row.order_id.clone(), orders.len());
                orders.push(Order {
                    id: row.order_id,
                    items: vec![item],
                });
            }
        }
    }
    Ok(orders)
}

// ==========================================
// 测试模块
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_plants_json() {
        let file = write_temp(
            ".json",
            r#"[
                {"id": "P1", "totalCapacity": 10,
                 "producibleItems": [{"family": "F1"}], "familyGroup": "F1"},
                {"id": "P2", "capacityByModel": {"A": 5},
                 "producibleItems": [
                    {"modelFamily": "F1", "modelName": "A", "submodel": "S1"}
                 ],
                 "familyGroup": "F1"}
            ]"#,
        );
        let plants = load_plants(file.path()).unwrap();
        assert_eq!(plants.len(), 2);
        assert_eq!(plants[1].capacity_for_model("A"), 5);
    }

    #[test]
    fn test_load_orders_json() {
        let file = write_temp(
            ".json",
            r#"{"orders": [
                {"id": "O1", "items": [
                    {"modelFamily": "F1", "modelName": "A", "submodel": "S1",
                     "quantity": 8, "dueDate": "2026-03-02"}
                ]}
            ]}"#,
        );
        let orders = load_orders(file.path()).unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].items.len(), 1);
    }

    #[test]
    fn test_load_orders_csv_groups_by_order() {
        let file = write_temp(
            ".csv",
            "orderId,modelFamily,modelName,submodel,quantity,dueDate\n\
             O1,F1,A,S1,8,2026-03-02\n\
             O2,F1,A,S2,3,2026-03-06\n\
             O1,F1,B,S1,4,2026-03-04\n",
        );
        let orders = load_orders(file.path()).unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].id, "O1");
        assert_eq!(orders[0].items.len(), 2);
        assert_eq!(orders[1].id, "O2");
    }

    #[test]
    fn test_missing_file_reported() {
        let err = load_plants(Path::new("/no/such/plants.json")).unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        let file = write_temp(".xlsx", "whatever");
        let err = load_orders(file.path()).unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_csv_bad_due_date_reported() {
        let file = write_temp(
            ".csv",
            "orderId,modelFamily,modelName,submodel,quantity,dueDate\n\
             O1,F1,A,S1,8,tomorrow\n",
        );
        let err = load_orders(file.path()).unwrap_err();
        match err {
            ImportError::InvalidDueDate { order_id, value } => {
                assert_eq!(order_id, "O1");
                assert_eq!(value, "tomorrow");
            }
            other => panic!("期望 InvalidDueDate, 实得 {other:?}"),
        }
    }
}
