// ==========================================
// 多工厂产能分配系统 - 运行配置
// ==========================================
// 职责: 单次优化运行的全部可调参数
// 默认值即可用; 支持从 JSON 文件覆写
// ==========================================

use crate::domain::types::AllocationPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ==========================================
// 错误类型
// ==========================================
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置文件解析失败: {0}")]
    Json(#[from] serde_json::Error),

    #[error("配置项非法: {field} = {value}")]
    InvalidValue { field: String, value: String },
}

// ==========================================
// AllocationConfig - 运行配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationConfig {
    /// 求解时限 (毫秒)
    pub time_limit_ms: u64,

    /// 后端并行度提示 (当前后端顺序执行, 仅记录)
    pub num_workers: usize,

    /// 交期归一化视野 (天), daysUntilDue 夹在 [-h, h]
    pub horizon_days: i64,

    /// 交期系数基准 (d=0 的单位罚)
    pub primary_scale: i64,

    /// 部分满足口径
    pub policy: AllocationPolicy,

    /// 多样性奖励的偏好工厂 (None 禁用次目标)
    pub preferred_plant: Option<String>,

    /// INFEASIBLE 后是否自动执行诊断重解
    pub diagnose_infeasible: bool,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            time_limit_ms: 10_000,
            num_workers: 1,
            horizon_days: 30,
            primary_scale: 1_000_000,
            policy: AllocationPolicy::AllowPartial,
            preferred_plant: None,
            diagnose_infeasible: true,
        }
    }
}

impl AllocationConfig {
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }

    /// 从 JSON 文件装载 (缺省字段取默认值)
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AllocationConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// 配置自检
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.time_limit_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "time_limit_ms".to_string(),
                value: self.time_limit_ms.to_string(),
            });
        }
        if self.horizon_days < 0 {
            return Err(ConfigError::InvalidValue {
                field: "horizon_days".to_string(),
                value: self.horizon_days.to_string(),
            });
        }
        if self.primary_scale <= 0 {
            return Err(ConfigError::InvalidValue {
                field: "primary_scale".to_string(),
                value: self.primary_scale.to_string(),
            });
        }
        if self.num_workers == 0 {
            return Err(ConfigError::InvalidValue {
                field: "num_workers".to_string(),
                value: self.num_workers.to_string(),
            });
        }
        Ok(())
    }
}
