// ==========================================
// 多工厂产能分配系统 - 默认求解后端
// ==========================================
// 算法: 边界传播 + 分支定界, 外层线性 SAT-UNSAT 收紧
//   1) 搜一个可行解作为现任
//   2) 追加割 objective <= incumbent - 1 重搜
//   3) 重搜无解 => 现任即最优; 超时 => 返回现任
// 红线: 确定性 -- 无随机源, 变量选择与分支顺序只由建模顺序
//       和目标系数决定, 相同输入必然产生相同结果
// ==========================================

use crate::solver::adapter::{
    Direction, LinearExpr, Relation, SolveOutcome, SolveStatus, SolverBackend, VarId,
};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

// ==========================================
// 内部表示
// ==========================================

/// 归一化约束行: Σ coef * x <= ub
#[derive(Debug, Clone)]
struct Row {
    terms: Vec<(i64, usize)>,
    ub: i64,
}

/// 归一化目标: 最小化 Σ min_terms * x (常数项与方向只参与回报)
#[derive(Debug, Clone)]
struct Objective {
    min_terms: Vec<(i64, usize)>,
    constant: i64,
    direction: Direction,
}

/// 单次搜索的出口
enum Search {
    Found(Vec<i64>),
    Exhausted,
    TimedOut,
}

// ==========================================
// BranchBoundSolver
// ==========================================
#[derive(Debug, Default)]
pub struct BranchBoundSolver {
    lowers: Vec<i64>,
    uppers: Vec<i64>,
    rows: Vec<Row>,
    objective: Option<Objective>,
}

impl BranchBoundSolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// 合并同变量项, 丢弃零系数 (确定性: 按变量编号排序)
    fn normalize_terms(terms: &[(i64, VarId)]) -> Vec<(i64, usize)> {
        let mut merged: BTreeMap<usize, i64> = BTreeMap::new();
        for (coef, var) in terms {
            *merged.entry(var.0).or_insert(0) += *coef;
        }
        merged
            .into_iter()
            .filter(|(_, coef)| *coef != 0)
            .map(|(var, coef)| (coef, var))
            .collect()
    }

    /// 边界传播至不动点
    ///
    /// 对每行 Σ a_j x_j <= b:
    /// - 最小活动量超过 b => 冲突
    /// - 否则按剩余松弛收紧各变量上下界
    ///
    /// 返回 false 表示冲突 (某域为空或某行必然违反)
    fn propagate(&self, lowers: &mut [i64], uppers: &mut [i64], cut: Option<&Row>) -> bool {
        loop {
            let mut changed = false;
            for row in self.rows.iter().chain(cut) {
                let mut min_act: i128 = 0;
                for (coef, var) in &row.terms {
                    let bound = if *coef > 0 { lowers[*var] } else { uppers[*var] };
                    min_act += *coef as i128 * bound as i128;
                }
                if min_act > row.ub as i128 {
                    return false;
                }
                for (coef, var) in &row.terms {
                    let c = *coef as i128;
                    let contrib = if *coef > 0 {
                        c * lowers[*var] as i128
                    } else {
                        c * uppers[*var] as i128
                    };
                    let slack = row.ub as i128 - (min_act - contrib);
                    if *coef > 0 {
                        let max_value = div_floor(slack, c);
                        if max_value < uppers[*var] as i128 {
                            if max_value < lowers[*var] as i128 {
                                return false;
                            }
                            uppers[*var] = max_value as i64;
                            changed = true;
                        }
                    } else {
                        let min_value = div_ceil(slack, c);
                        if min_value > lowers[*var] as i128 {
                            if min_value > uppers[*var] as i128 {
                                return false;
                            }
                            lowers[*var] = min_value as i64;
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                return true;
            }
        }
    }

    /// 深度优先搜索一个可行解
    ///
    /// 变量选择: |目标系数| 大者优先 (平局按创建序) -- 由 order 预排
    /// 分支方向: 系数为正先取低半区, 为负先取高半区,
    ///           零系数先取高半区 (偏向多分配)
    fn dfs(
        &self,
        mut lowers: Vec<i64>,
        mut uppers: Vec<i64>,
        order: &[usize],
        obj_coef: &[i64],
        cut: Option<&Row>,
        deadline: Instant,
        nodes: &mut u64,
    ) -> Search {
        if Instant::now() >= deadline {
            return Search::TimedOut;
        }
        *nodes += 1;

        if !self.propagate(&mut lowers, &mut uppers, cut) {
            return Search::Exhausted;
        }

        let branch_var = order.iter().copied().find(|&j| lowers[j] < uppers[j]);
        let Some(j) = branch_var else {
            // 全部固定: 传播已保证所有行的精确活动量 <= ub
            return Search::Found(lowers);
        };

        let lb = lowers[j];
        let ub = uppers[j];
        let mid = lb + (ub - lb) / 2;
        let halves = if obj_coef[j] > 0 {
            [(lb, mid), (mid + 1, ub)]
        } else {
            [(mid + 1, ub), (lb, mid)]
        };

        for (half_lb, half_ub) in halves {
            let mut next_lowers = lowers.clone();
            let mut next_uppers = uppers.clone();
            next_lowers[j] = half_lb;
            next_uppers[j] = half_ub;
            match self.dfs(next_lowers, next_uppers, order, obj_coef, cut, deadline, nodes) {
                Search::Found(values) => return Search::Found(values),
                Search::TimedOut => return Search::TimedOut,
                Search::Exhausted => {}
            }
        }
        Search::Exhausted
    }

    /// 现任解的归一化目标值 (最小化口径)
    fn minimised_value(&self, values: &[i64]) -> i64 {
        let Some(objective) = &self.objective else {
            return 0;
        };
        let mut sum: i128 = 0;
        for (coef, var) in &objective.min_terms {
            sum += *coef as i128 * values[*var] as i128;
        }
        sum as i64
    }

    /// 将归一化目标值换算回调用方口径
    fn reported_value(&self, minimised: i64) -> Option<i64> {
        self.objective.as_ref().map(|objective| match objective.direction {
            Direction::Minimise => minimised + objective.constant,
            Direction::Maximise => -minimised + objective.constant,
        })
    }
}

impl SolverBackend for BranchBoundSolver {
    fn add_int_var(&mut self, lower: i64, upper: i64) -> VarId {
        debug_assert!(lower <= upper, "变量域为空: [{lower}, {upper}]");
        self.lowers.push(lower);
        self.uppers.push(upper);
        VarId(self.lowers.len() - 1)
    }

    fn add_linear_constraint(&mut self, expr: LinearExpr, relation: Relation, bound: i64) {
        let terms = Self::normalize_terms(&expr.terms);
        let rhs = bound - expr.constant;
        match relation {
            Relation::LessOrEqual => self.rows.push(Row { terms, ub: rhs }),
            Relation::GreaterOrEqual => {
                let negated = terms.iter().map(|&(c, v)| (-c, v)).collect();
                self.rows.push(Row {
                    terms: negated,
                    ub: -rhs,
                });
            }
            Relation::Equal => {
                let negated = terms.iter().map(|&(c, v)| (-c, v)).collect();
                self.rows.push(Row {
                    terms: terms.clone(),
                    ub: rhs,
                });
                self.rows.push(Row {
                    terms: negated,
                    ub: -rhs,
                });
            }
        }
    }

    fn set_objective(&mut self, expr: LinearExpr, direction: Direction) {
        let terms = Self::normalize_terms(&expr.terms);
        let min_terms = match direction {
            Direction::Minimise => terms,
            Direction::Maximise => terms.iter().map(|&(c, v)| (-c, v)).collect(),
        };
        self.objective = Some(Objective {
            min_terms,
            constant: expr.constant,
            direction,
        });
    }

    #[instrument(skip_all, fields(
        vars = self.lowers.len(),
        rows = self.rows.len(),
        time_limit_ms = time_limit.as_millis() as u64,
        num_workers = num_workers
    ))]
    fn solve(&mut self, time_limit: Duration, num_workers: usize) -> SolveOutcome {
        // num_workers 是提示参数: 当前后端顺序执行
        let deadline = Instant::now() + time_limit;
        let var_count = self.lowers.len();

        let mut obj_coef = vec![0i64; var_count];
        if let Some(objective) = &self.objective {
            for (coef, var) in &objective.min_terms {
                obj_coef[*var] += *coef;
            }
        }
        let mut order: Vec<usize> = (0..var_count).collect();
        order.sort_by_key(|&j| (std::cmp::Reverse(obj_coef[j].unsigned_abs()), j));

        let mut nodes: u64 = 0;
        let mut incumbent: Option<(Vec<i64>, i64)> = None;
        let mut timed_out = false;

        loop {
            let cut = match (&incumbent, &self.objective) {
                (Some((_, best)), Some(objective)) => Some(Row {
                    terms: objective.min_terms.clone(),
                    ub: best - 1,
                }),
                _ => None,
            };
            let search = self.dfs(
                self.lowers.clone(),
                self.uppers.clone(),
                &order,
                &obj_coef,
                cut.as_ref(),
                deadline,
                &mut nodes,
            );
            match search {
                Search::Found(values) => {
                    let minimised = self.minimised_value(&values);
                    incumbent = Some((values, minimised));
                    if self.objective.is_none() {
                        break; // 可行性求解: 首解即止
                    }
                }
                Search::Exhausted => break,
                Search::TimedOut => {
                    timed_out = true;
                    break;
                }
            }
        }

        debug!(nodes, timed_out, "搜索结束");

        match (incumbent, timed_out) {
            (Some((values, minimised)), false) => SolveOutcome {
                status: SolveStatus::Optimal,
                objective_value: self.reported_value(minimised),
                values,
            },
            (Some((values, minimised)), true) => SolveOutcome {
                status: SolveStatus::Feasible,
                objective_value: self.reported_value(minimised),
                values,
            },
            (None, false) => SolveOutcome {
                status: SolveStatus::Infeasible,
                values: Vec::new(),
                objective_value: None,
            },
            (None, true) => SolveOutcome {
                status: SolveStatus::Timeout,
                values: Vec::new(),
                objective_value: None,
            },
        }
    }
}

// ==========================================
// 整数除法辅助 (向下 / 向上取整, 除数可为负)
// ==========================================
fn div_floor(a: i128, b: i128) -> i128 {
    let quotient = a / b;
    let remainder = a % b;
    if remainder != 0 && ((remainder < 0) != (b < 0)) {
        quotient - 1
    } else {
        quotient
    }
}

fn div_ceil(a: i128, b: i128) -> i128 {
    let quotient = a / b;
    let remainder = a % b;
    if remainder != 0 && ((remainder < 0) == (b < 0)) {
        quotient + 1
    } else {
        quotient
    }
}
