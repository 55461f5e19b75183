//! `sc.exe` 输出解读。
//!
//! `sc` 没有结构化输出，只能按固定标记文本判断结果：
//! - `SUCCESS`：`sc config` 修改成功
//! - `DISABLED`：`sc qc` 显示启动类型为禁用
//! - `RUNNING` / `STOPPED`：`sc query` 显示的运行状态
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use serde::{Deserialize, Serialize};

use crate::exec::CommandOutput;

const SUCCESS_MARKER: &str = "SUCCESS";
const DISABLED_MARKER: &str = "DISABLED";
const RUNNING_MARKER: &str = "RUNNING";
const STOPPED_MARKER: &str = "STOPPED";

/// 服务状态（状态查询报告使用）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceStatus {
    Disabled,
    Running,
    Stopped,
    Unknown,
}

impl ServiceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ServiceStatus::Disabled => "Disabled",
            ServiceStatus::Running => "Running",
            ServiceStatus::Stopped => "Stopped",
            ServiceStatus::Unknown => "Unknown",
        }
    }
}

/// `sc config` 是否报告成功。
pub fn config_succeeded(out: &CommandOutput) -> bool {
    out.stdout.contains(SUCCESS_MARKER)
}

/// `sc qc` 是否显示启动类型为禁用。
pub fn start_mode_disabled(out: &CommandOutput) -> bool {
    out.stdout.contains(DISABLED_MARKER)
}

/// `sc query` 是否显示服务正在运行。
pub fn is_running(out: &CommandOutput) -> bool {
    out.stdout.contains(RUNNING_MARKER)
}

/// 按 `sc query` 输出归类运行状态；两个标记都不存在时为 `Unknown`。
pub fn runtime_status(out: &CommandOutput) -> ServiceStatus {
    if is_running(out) {
        ServiceStatus::Running
    } else if out.stdout.contains(STOPPED_MARKER) {
        ServiceStatus::Stopped
    } else {
        ServiceStatus::Unknown
    }
}
