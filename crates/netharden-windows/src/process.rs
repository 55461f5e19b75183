//! 端口占用进程名补全（基于 `sysinfo`）。
//!
//! 说明：
//! - `Get-NetUDPEndpoint` 只给出 PID，这里按 PID 查询进程名写回 [`PortRecord::process_names`]
//! - 进程可能在扫描与查询之间退出，查不到的 PID 直接忽略
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use netharden_core::ports::PortRecord;
use sysinfo::{Pid, ProcessRefreshKind, RefreshKind, System};
use tracing::debug;

/// 为端口记录补全占用进程名（按 PID 顺序，去重）。
pub fn annotate_owners(records: &mut [PortRecord]) {
    if records.iter().all(|r| r.owning_pids.is_empty()) {
        return;
    }
    let mut system = System::new_with_specifics(
        RefreshKind::new().with_processes(ProcessRefreshKind::everything()),
    );
    system.refresh_processes();

    for record in records.iter_mut() {
        let mut names: Vec<String> = Vec::new();
        for pid in &record.owning_pids {
            let Ok(raw) = pid.parse::<u32>() else {
                continue;
            };
            if let Some(proc_) = system.process(Pid::from_u32(raw)) {
                let name = proc_.name().to_string();
                if !names.contains(&name) {
                    names.push(name);
                }
            }
        }
        debug!("端口 {} 占用进程: {:?}", record.port, names);
        record.process_names = names;
    }
}
