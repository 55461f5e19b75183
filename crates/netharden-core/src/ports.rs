//! 监听端口扫描与分类（基于 PowerShell `Get-NetTCPConnection` / `Get-NetUDPEndpoint`）。
//!
//! 输出约定：
//! - 前 `header_lines` 行为表头，其后每行以空白分隔各列
//! - TCP：`LocalPort State`；UDP：`LocalAddress LocalPort OwningProcess`
//!
//! 展示策略：
//! - 命中参照表的端口全部展示；参照表之外的端口在已收集条目少于上限时展示
//! - 命中高危端口表的端口无论是否展示都进入 `critical`
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{PortTable, PortTables};
use crate::config::{CommandConfig, DisplayPolicy};
use crate::exec::{CommandRunner, ExecError};
use crate::report::PortScanReport;

const UNKNOWN_SERVICE: &str = "Unknown";
const CRITICAL_HEADER: &str = "Critical Ports Found OPEN (Should be Closed):";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Protocol {
    Tcp,
    Udp,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Tcp => write!(f, "TCP"),
            Protocol::Udp => write!(f, "UDP"),
        }
    }
}

/// 一个被展示的监听端口。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortRecord {
    pub port: u16,
    pub protocol: Protocol,
    /// 占用该端口的进程 ID（仅 UDP 输出携带）。
    pub owning_pids: BTreeSet<String>,
    /// 参照表中的服务名，未收录时为 `Unknown`。
    pub known_service_name: String,
    /// 进程名（由平台层按 PID 补全，可能为空）。
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub process_names: Vec<String>,
}

impl PortRecord {
    fn new(port: u16, protocol: Protocol, table: &PortTable) -> Self {
        Self {
            port,
            protocol,
            owning_pids: BTreeSet::new(),
            known_service_name: table
                .get(&port)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_SERVICE.to_string()),
            process_names: Vec::new(),
        }
    }

    /// 渲染为报告中的一行。
    pub fn render(&self) -> String {
        let mut line = format!("Port {} ({}) - {}", self.port, self.protocol, self.known_service_name);
        if self.protocol == Protocol::Udp {
            let pids: Vec<&str> = self.owning_pids.iter().map(String::as_str).collect();
            line.push_str(&format!(" - PIDs: {}", pids.join(", ")));
        }
        line
    }
}

/// 解析 TCP 连接列表，返回（端口，状态）。
///
/// 说明：
/// - 跳过前 `header_lines` 行；列数不足或端口列不是数字的行会被忽略
pub fn parse_tcp_listeners(text: &str, header_lines: usize) -> Vec<(u16, String)> {
    text.lines()
        .skip(header_lines)
        .filter_map(|line| {
            let mut cols = line.split_whitespace();
            let port = cols.next()?.parse::<u16>().ok()?;
            let state = cols.next()?;
            Some((port, state.to_string()))
        })
        .collect()
}

/// 解析 UDP 端点列表，返回（端口，进程 ID）。
pub fn parse_udp_endpoints(text: &str, header_lines: usize) -> Vec<(u16, String)> {
    text.lines()
        .skip(header_lines)
        .filter_map(|line| {
            let cols: Vec<&str> = line.split_whitespace().collect();
            if cols.len() < 3 {
                return None;
            }
            let port = cols[1].parse::<u16>().ok()?;
            Some((port, cols[2].to_string()))
        })
        .collect()
}

/// 状态列是否表示监听（`Listen` / `LISTENING`，不区分大小写）。
pub fn is_listening(state: &str) -> bool {
    state.eq_ignore_ascii_case("listen") || state.eq_ignore_ascii_case("listening")
}

/// 端口分类器。
pub struct PortClassifier<'a, R: CommandRunner> {
    runner: R,
    tables: &'a PortTables,
    commands: &'a CommandConfig,
    display: &'a DisplayPolicy,
}

impl<'a, R: CommandRunner> PortClassifier<'a, R> {
    pub fn new(runner: R, tables: &'a PortTables, commands: &'a CommandConfig, display: &'a DisplayPolicy) -> Self {
        Self {
            runner,
            tables,
            commands,
            display,
        }
    }

    /// 扫描 TCP/UDP 监听端口并分类。
    ///
    /// 返回值：
    /// - `tcp` / `udp`：展示条目（为空时为提示语）
    /// - `critical`：高危端口告警（非空时首行为标题）
    /// - `records`：展示条目对应的结构化记录
    ///
    /// 异常处理：
    /// - 任一外部命令故障时，三个列表均替换为单条错误描述
    pub fn scan(&self) -> PortScanReport {
        match self.collect() {
            Ok(report) => report,
            Err(e) => {
                warn!("端口扫描失败: {e}");
                PortScanReport {
                    tcp: vec![format!("Error retrieving TCP ports: {e}")],
                    udp: vec![format!("Error retrieving UDP services: {e}")],
                    critical: vec!["Could not determine critical port status.".to_string()],
                    records: Vec::new(),
                }
            }
        }
    }

    fn collect(&self) -> Result<PortScanReport, ExecError> {
        let mut critical: Vec<String> = Vec::new();

        let tcp_out = self.powershell(&self.commands.tcp_listener_script)?;
        let mut tcp_records: Vec<PortRecord> = Vec::new();
        for (port, state) in parse_tcp_listeners(&tcp_out, self.commands.header_lines) {
            if !is_listening(&state) {
                continue;
            }
            let seen = tcp_records.iter().any(|r| r.port == port);
            if !seen && self.admit(&self.tables.common_tcp, port, tcp_records.len()) {
                tcp_records.push(PortRecord::new(port, Protocol::Tcp, &self.tables.common_tcp));
            }
            self.flag_critical(port, &mut critical);
        }

        let udp_out = self.powershell(&self.commands.udp_endpoint_script)?;
        let mut udp_records: BTreeMap<u16, PortRecord> = BTreeMap::new();
        let mut udp_order: Vec<u16> = Vec::new();
        for (port, pid) in parse_udp_endpoints(&udp_out, self.commands.header_lines) {
            if let Some(record) = udp_records.get_mut(&port) {
                record.owning_pids.insert(pid);
            } else if self.admit(&self.tables.known_udp, port, udp_records.len()) {
                let mut record = PortRecord::new(port, Protocol::Udp, &self.tables.known_udp);
                record.owning_pids.insert(pid);
                udp_records.insert(port, record);
                udp_order.push(port);
            }
            self.flag_critical(port, &mut critical);
        }
        let udp_records: Vec<PortRecord> = udp_order
            .iter()
            .filter_map(|port| udp_records.remove(port))
            .collect();

        info!(
            "端口扫描完成: TCP {} 项, UDP {} 项, 高危 {} 项",
            tcp_records.len(),
            udp_records.len(),
            critical.len()
        );

        let tcp = render_or(&tcp_records, "No open TCP ports detected.");
        let udp = render_or(&udp_records, "No active UDP services detected.");
        if critical.is_empty() {
            critical.push("No critical ports open.".to_string());
        } else {
            critical.insert(0, CRITICAL_HEADER.to_string());
        }

        let mut records = tcp_records;
        records.extend(udp_records);
        Ok(PortScanReport {
            tcp,
            udp,
            critical,
            records,
        })
    }

    /// 命中参照表，或已收集条目少于展示上限。
    fn admit(&self, table: &PortTable, port: u16, collected: usize) -> bool {
        table.contains_key(&port) || collected < self.display.unknown_port_cap
    }

    fn flag_critical(&self, port: u16, critical: &mut Vec<String>) {
        if let Some(name) = self.tables.critical.get(&port) {
            let line = format!("{port} ({name}) is OPEN");
            if !critical.contains(&line) {
                warn!("高危端口处于监听状态: {port} ({name})");
                critical.push(line);
            }
        }
    }

    fn powershell(&self, script: &str) -> Result<String, ExecError> {
        let out = self.runner.run(
            &self.commands.powershell_exe,
            &["-NoProfile", "-NonInteractive", "-Command", script],
        )?;
        Ok(out.stdout)
    }
}

fn render_or(records: &[PortRecord], empty: &str) -> Vec<String> {
    if records.is_empty() {
        vec![empty.to_string()]
    } else {
        records.iter().map(PortRecord::render).collect()
    }
}
