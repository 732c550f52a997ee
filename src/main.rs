// ==========================================
// 多工厂产能分配系统 - CLI 主入口
// ==========================================
// 用法:
//   plant-allocation-aps <plants.json> <orders.{json,csv}> [选项]
// 退出码:
//   0 - OPTIMAL / FEASIBLE
//   1 - 装载/校验/配置错误
//   2 - INFEASIBLE / TIMEOUT
// ==========================================

use chrono::{NaiveDate, Utc};
use clap::{Parser, ValueEnum};
use plant_allocation_aps::config::AllocationConfig;
use plant_allocation_aps::domain::AllocationPolicy;
use plant_allocation_aps::solver::SolveStatus;
use plant_allocation_aps::{logging, AllocationApi};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PolicyArg {
    /// 部分满足可接受 (罚而不禁)
    AllowPartial,
    /// 需求必须全额满足
    RequireFull,
}

impl From<PolicyArg> for AllocationPolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::AllowPartial => AllocationPolicy::AllowPartial,
            PolicyArg::RequireFull => AllocationPolicy::RequireFull,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "plant-allocation-aps", about = "多工厂产能分配系统 - 决策支持系统", version)]
struct Cli {
    /// 工厂文档 (JSON)
    plants: PathBuf,

    /// 订单文档 (JSON 或 CSV)
    orders: PathBuf,

    /// 结果文档输出路径 (缺省打印到标准输出)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 配置文件 (JSON, 缺省用内置默认值)
    #[arg(long)]
    config: Option<PathBuf>,

    /// 求解时限 (秒)
    #[arg(long)]
    time_limit_s: Option<u64>,

    /// 后端并行度提示
    #[arg(long)]
    workers: Option<usize>,

    /// 部分满足口径
    #[arg(long, value_enum)]
    policy: Option<PolicyArg>,

    /// 交期归一化参考日期 (yyyy-MM-dd, 缺省取当天)
    #[arg(long)]
    reference_date: Option<NaiveDate>,

    /// 多样性奖励的偏好工厂
    #[arg(long)]
    preferred_plant: Option<String>,

    /// 交期归一化视野 (天)
    #[arg(long)]
    horizon_days: Option<i64>,
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(err) => {
            error!("{err:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    info!("==================================================");
    info!("{} v{}", plant_allocation_aps::APP_NAME, plant_allocation_aps::VERSION);
    info!("==================================================");

    // 配置: 文件 -> 命令行覆写
    let mut config = match &cli.config {
        Some(path) => AllocationConfig::load_from_file(path)?,
        None => AllocationConfig::default(),
    };
    if let Some(seconds) = cli.time_limit_s {
        config.time_limit_ms = seconds.saturating_mul(1000);
    }
    if let Some(workers) = cli.workers {
        config.num_workers = workers;
    }
    if let Some(policy) = cli.policy {
        config.policy = policy.into();
    }
    if let Some(plant_id) = cli.preferred_plant.clone() {
        config.preferred_plant = Some(plant_id);
    }
    if let Some(horizon) = cli.horizon_days {
        config.horizon_days = horizon;
    }
    config.validate()?;

    let reference_date = cli
        .reference_date
        .unwrap_or_else(|| Utc::now().date_naive());

    let api = AllocationApi::new(config);
    let report = api.run_files(&cli.plants, &cli.orders, reference_date)?;

    info!(
        status = %report.summary.status,
        total_unmet = report.summary.total_unmet_quantity,
        unproducible = report.summary.unproducible_quantity,
        assignments = report.assignments.len(),
        "运行结束"
    );

    match &cli.output {
        Some(path) => {
            AllocationApi::write_report(&report, path)?;
            info!(path = %path.display(), "结果文档已写出");
        }
        None => {
            println!("{}", AllocationApi::report_to_json(&report)?);
        }
    }

    let code = match report.summary.status {
        SolveStatus::Optimal | SolveStatus::Feasible => ExitCode::SUCCESS,
        SolveStatus::Infeasible | SolveStatus::Timeout => ExitCode::from(2),
    };
    Ok(code)
}
