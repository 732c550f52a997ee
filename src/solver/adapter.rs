// ==========================================
// 多工厂产能分配系统 - 求解适配层
// ==========================================
// 职责: 以变量/线性约束/目标三类原语抽象通用组合求解后端
// 红线: Encoder/Composer/Extractor 只经由本接口与后端交互,
//       后端可整体替换而不触碰建模逻辑
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

// ==========================================
// VarId - 变量句柄
// ==========================================
// 由后端按创建顺序编号, 仅在创建它的后端实例内有效
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

// ==========================================
// LinearExpr - 线性表达式
// ==========================================
// Σ coef_k * var_k + constant
#[derive(Debug, Clone, Default)]
pub struct LinearExpr {
    pub terms: Vec<(i64, VarId)>,
    pub constant: i64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一项 (builder 形态)
    pub fn term(mut self, coef: i64, var: VarId) -> Self {
        self.terms.push((coef, var));
        self
    }

    pub fn add_term(&mut self, coef: i64, var: VarId) {
        self.terms.push((coef, var));
    }

    pub fn add_constant(&mut self, value: i64) {
        self.constant += value;
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.constant == 0
    }

    /// 按赋值求值 (内部走 i128, 系数量级由 Composer 预先防线)
    pub fn evaluate(&self, values: &[i64]) -> i64 {
        let mut sum: i128 = self.constant as i128;
        for (coef, var) in &self.terms {
            let value = values.get(var.0).copied().unwrap_or(0);
            sum += *coef as i128 * value as i128;
        }
        sum as i64
    }
}

// ==========================================
// Relation / Direction
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessOrEqual,
    GreaterOrEqual,
    Equal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimise,
    Maximise,
}

// ==========================================
// SolveStatus - 求解状态
// ==========================================
// Optimal:    已证最优
// Feasible:   超时返回的现任最优 (未证最优)
// Infeasible: 无解 (一等结果, 触发诊断路径)
// Timeout:    超时且无任何现任解
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,
    Feasible,
    Infeasible,
    Timeout,
}

impl SolveStatus {
    /// 是否携带可用解
    pub fn has_solution(&self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Feasible)
    }
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "OPTIMAL"),
            SolveStatus::Feasible => write!(f, "FEASIBLE"),
            SolveStatus::Infeasible => write!(f, "INFEASIBLE"),
            SolveStatus::Timeout => write!(f, "TIMEOUT"),
        }
    }
}

// ==========================================
// SolveOutcome - 求解结果
// ==========================================
#[derive(Debug, Clone)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    /// 按 VarId 编号的赋值 (无解时为空)
    pub values: Vec<i64>,
    pub objective_value: Option<i64>,
}

impl SolveOutcome {
    pub fn value_of(&self, var: VarId) -> i64 {
        self.values.get(var.0).copied().unwrap_or(0)
    }
}

// ==========================================
// Trait: SolverBackend
// ==========================================
// 约定:
// - 相同的建模顺序产生可复现的结果
// - 超过 time_limit 返回现任最优 (Feasible) 或 Timeout, 绝不阻塞或报错
// - num_workers 是提示参数, 后端可以忽略
pub trait SolverBackend {
    /// 创建有界整数变量
    fn add_int_var(&mut self, lower: i64, upper: i64) -> VarId;

    /// 发布线性约束 expr REL bound
    fn add_linear_constraint(&mut self, expr: LinearExpr, relation: Relation, bound: i64);

    /// 设置目标函数 (未设置则为可行性求解)
    fn set_objective(&mut self, expr: LinearExpr, direction: Direction);

    /// 有界时间搜索
    fn solve(&mut self, time_limit: Duration, num_workers: usize) -> SolveOutcome;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_expr_evaluate() {
        let expr = LinearExpr::new()
            .term(3, VarId(0))
            .term(-2, VarId(1));
        assert_eq!(expr.evaluate(&[4, 5]), 2); // 12 - 10
    }

    #[test]
    fn test_linear_expr_constant() {
        let mut expr = LinearExpr::new().term(1, VarId(0));
        expr.add_constant(7);
        assert_eq!(expr.evaluate(&[10]), 17);
    }

    #[test]
    fn test_status_has_solution() {
        assert!(SolveStatus::Optimal.has_solution());
        assert!(SolveStatus::Feasible.has_solution());
        assert!(!SolveStatus::Infeasible.has_solution());
        assert!(!SolveStatus::Timeout.has_solution());
    }

    #[test]
    fn test_status_serialization_is_screaming_snake() {
        let json = serde_json::to_string(&SolveStatus::Infeasible).unwrap();
        assert_eq!(json, "\"INFEASIBLE\"");
    }
}
