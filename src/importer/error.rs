// ==========================================
// 多工厂产能分配系统 - 导入层错误类型
// ==========================================
// 红线: 装载阶段 fail fast, 消息点名文件/记录/字段
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("不支持的文件格式: {0}")]
    UnsupportedFormat(String),

    #[error("读取文件失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 解析失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV 解析失败: {0}")]
    Csv(#[from] csv::Error),

    #[error("工厂 {plant_id} 必须且只能给出 totalCapacity 或 capacityByModel 之一")]
    AmbiguousCapacity { plant_id: String },

    #[error("订单 {order_id} 的 dueDate 必须为 yyyy-MM-dd 格式: 实得 \"{value}\"")]
    InvalidDueDate { order_id: String, value: String },
}
