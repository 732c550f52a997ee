// ==========================================
// 多工厂产能分配系统 - 引擎层
// ==========================================
// 职责: 实现约束建模与多目标合成的业务规则
// 红线: Encoder/Composer/Extractor 只经由 SolverBackend 接口
//       与求解后端交互; 所有拒绝都必须点名字段与记录
// ==========================================

pub mod diagnostics;
pub mod encoder;
pub mod error;
pub mod extractor;
pub mod objective;
pub mod orchestrator;
pub mod validator;

// 重导出核心引擎
pub use diagnostics::InfeasibilityDiagnoser;
pub use encoder::{ConstraintEncoder, EncodedModel};
pub use error::{EngineError, ValidationError};
pub use extractor::ResultExtractor;
pub use objective::{ComposeError, ComposedObjective, ObjectiveComposer};
pub use orchestrator::AllocationOrchestrator;
pub use validator::{DomainModel, DomainValidator};
