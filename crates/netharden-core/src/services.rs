//! 服务启动类型切换与状态查询（基于 `sc.exe`）。
//!
//! 说明：
//! - 每个服务独立处理，单个失败不会中断整批操作，也不做回滚
//! - 启用流程：修改启动类型 → 启动（不检查结果）→ 轮询确认运行
//!
//! 权限要求：
//! - 修改启动类型与启动服务需要管理员权限
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::catalog::ServiceDescriptor;
use crate::config::ServicePolicy;
use crate::exec::{CommandRunner, ExecError};
use crate::markers::{self, ServiceStatus};

/// 单个服务的处理结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceOutcome {
    pub name: String,
    pub result: ServiceResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ServiceResult {
    Disabled,
    Enabled,
    Failed(FailureReason),
}

/// 失败原因。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FailureReason {
    /// `sc config start= disabled` 未返回成功标记。
    Rejected,
    /// `sc config start= auto` 未返回成功标记。
    ConfigFailed,
    /// 轮询次数用尽仍未确认运行。
    NotConfirmedRunning,
    /// 命令执行故障（启动失败/超时）。
    Error(String),
}

impl ServiceOutcome {
    fn new(name: &str, result: ServiceResult) -> Self {
        Self {
            name: name.to_string(),
            result,
        }
    }

    fn failed(name: &str, reason: FailureReason) -> Self {
        Self::new(name, ServiceResult::Failed(reason))
    }

    pub fn is_success(&self) -> bool {
        !matches!(self.result, ServiceResult::Failed(_))
    }
}

/// 渲染为报告中的字符串：成功为服务名，失败为“服务名 (原因)”。
impl fmt::Display for ServiceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.result {
            ServiceResult::Disabled | ServiceResult::Enabled | ServiceResult::Failed(FailureReason::Rejected) => {
                write!(f, "{}", self.name)
            }
            ServiceResult::Failed(FailureReason::ConfigFailed) => write!(f, "{} (config failed)", self.name),
            ServiceResult::Failed(FailureReason::NotConfirmedRunning) => {
                write!(f, "{} (didn't confirm running)", self.name)
            }
            ServiceResult::Failed(FailureReason::Error(detail)) => write!(f, "{} (error: {detail})", self.name),
        }
    }
}

/// 将结果拆分为（成功列表，失败列表），每个输入恰好出现一次。
pub fn split_outcomes(outcomes: &[ServiceOutcome]) -> (Vec<String>, Vec<String>) {
    let mut ok = Vec::new();
    let mut failed = Vec::new();
    for outcome in outcomes {
        if outcome.is_success() {
            ok.push(outcome.to_string());
        } else {
            failed.push(outcome.to_string());
        }
    }
    (ok, failed)
}

/// 状态查询的单项结果。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceStatusEntry {
    pub name: String,
    pub display_name: String,
    pub status: ServiceStatus,
}

/// 服务控制器。
///
/// 字段说明：
/// - `runner`：外部命令执行器
/// - `services`：受控服务清单（由配置注入）
/// - `sc_exe`：`sc.exe` 路径
/// - `policy`：启用后的轮询策略
pub struct ServiceController<'a, R: CommandRunner> {
    runner: R,
    services: &'a [ServiceDescriptor],
    sc_exe: &'a str,
    policy: ServicePolicy,
}

impl<'a, R: CommandRunner> ServiceController<'a, R> {
    pub fn new(runner: R, services: &'a [ServiceDescriptor], sc_exe: &'a str, policy: ServicePolicy) -> Self {
        Self {
            runner,
            services,
            sc_exe,
            policy,
        }
    }

    /// 将清单中的服务全部设为禁用。
    ///
    /// 返回值：
    /// - 每个服务一条结果；输出含 `SUCCESS` 视为 `Disabled`，否则为失败
    ///
    /// 异常处理：
    /// - 命令执行故障记为 `Failed(Error)`，继续处理下一个服务
    pub fn disable(&self) -> Vec<ServiceOutcome> {
        let mut outcomes = Vec::with_capacity(self.services.len());
        for svc in self.services {
            let outcome = match self.set_start_mode(&svc.name, "disabled") {
                Ok(true) => ServiceOutcome::new(&svc.name, ServiceResult::Disabled),
                Ok(false) => ServiceOutcome::failed(&svc.name, FailureReason::Rejected),
                Err(e) => ServiceOutcome::failed(&svc.name, FailureReason::Error(e.to_string())),
            };
            log_outcome("禁用服务", &outcome);
            outcomes.push(outcome);
        }
        outcomes
    }

    /// 将清单中的服务设为自动启动并启动，轮询确认进入运行状态。
    ///
    /// 返回值：
    /// - 每个服务一条结果：`Enabled` / `ConfigFailed` / `NotConfirmedRunning` / `Error`
    ///
    /// 异常处理：
    /// - 单个服务的任何故障只影响该服务的结果，不会中断整批
    pub fn enable(&self) -> Vec<ServiceOutcome> {
        let mut outcomes = Vec::with_capacity(self.services.len());
        for svc in self.services {
            let outcome = match self.enable_one(&svc.name) {
                Ok(result) => ServiceOutcome::new(&svc.name, result),
                Err(e) => ServiceOutcome::failed(&svc.name, FailureReason::Error(e.to_string())),
            };
            log_outcome("启用服务", &outcome);
            outcomes.push(outcome);
        }
        outcomes
    }

    fn enable_one(&self, name: &str) -> Result<ServiceResult, ExecError> {
        if !self.set_start_mode(name, "auto")? {
            return Ok(ServiceResult::Failed(FailureReason::ConfigFailed));
        }

        // 启动结果不单独判断（服务可能已在运行），以轮询结果为准。
        let start = self.runner.run(self.sc_exe, &["start", name])?;
        debug!("sc start {name}: exit={:?}", start.exit_code);

        for attempt in 1..=self.policy.poll_attempts {
            std::thread::sleep(self.policy.poll_interval());
            let out = self.runner.run(self.sc_exe, &["query", name])?;
            if markers::is_running(&out) {
                debug!("服务已确认运行: {name} (第 {attempt} 次轮询)");
                return Ok(ServiceResult::Enabled);
            }
        }
        Ok(ServiceResult::Failed(FailureReason::NotConfirmedRunning))
    }

    /// 查询清单中每个服务的状态。
    ///
    /// 判定顺序：
    /// 1) `sc qc` 显示禁用 → `Disabled`（不再查询运行状态）
    /// 2) `sc query` 显示 `RUNNING` / `STOPPED` → `Running` / `Stopped`
    /// 3) 其他情况 → `Unknown`
    ///
    /// 异常处理：
    /// - 命令执行故障记为 `Unknown` 并输出告警日志
    pub fn status(&self) -> Vec<ServiceStatusEntry> {
        self.services
            .iter()
            .map(|svc| {
                let status = self.status_one(&svc.name).unwrap_or_else(|e| {
                    warn!("查询服务状态失败: {}: {e}", svc.name);
                    ServiceStatus::Unknown
                });
                ServiceStatusEntry {
                    name: svc.name.clone(),
                    display_name: svc.display_name.clone(),
                    status,
                }
            })
            .collect()
    }

    fn status_one(&self, name: &str) -> Result<ServiceStatus, ExecError> {
        let qc = self.runner.run(self.sc_exe, &["qc", name])?;
        if markers::start_mode_disabled(&qc) {
            return Ok(ServiceStatus::Disabled);
        }
        let query = self.runner.run(self.sc_exe, &["query", name])?;
        Ok(markers::runtime_status(&query))
    }

    fn set_start_mode(&self, name: &str, mode: &str) -> Result<bool, ExecError> {
        let out = self.runner.run(self.sc_exe, &["config", name, "start=", mode])?;
        Ok(markers::config_succeeded(&out))
    }
}

fn log_outcome(action: &str, outcome: &ServiceOutcome) {
    if outcome.is_success() {
        info!("{action}成功: {}", outcome.name);
    } else {
        warn!("{action}失败: {outcome}");
    }
}
