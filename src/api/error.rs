// ==========================================
// 多工厂产能分配系统 - API层错误类型
// ==========================================
// 职责: 聚合各层错误为用户可读消息
// 红线: 所有错误信息必须包含显式原因 (可解释性);
//       INFEASIBLE/TIMEOUT 不是错误, 以 summary.status 表达
// ==========================================

use crate::config::ConfigError;
use crate::engine::error::{EngineError, ValidationError};
use crate::engine::objective::ComposeError;
use crate::importer::error::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("文件导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("数据验证失败: {0}")]
    Validation(#[from] ValidationError),

    #[error("目标合成失败: {0}")]
    Compose(#[from] ComposeError),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("结果导出失败: {0}")]
    Export(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 EngineError 转换
// ==========================================
impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Validation(inner) => ApiError::Validation(inner),
            EngineError::Compose(inner) => ApiError::Compose(inner),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
