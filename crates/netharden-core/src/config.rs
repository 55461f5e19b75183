//! 运行配置（netharden.json）。
//!
//! 该模块描述一次运行所需的全部输入：
//! - 受控服务清单与端口参照表
//! - 外部工具路径、统一超时与输出表头行数
//! - 服务启用后的轮询策略
//! - NetBIOS 相关注册表路径、值名与上限
//! - 端口列表的展示策略
//!
//! 约定：
//! - 所有字段均通过 `#[serde(default)]` 提供默认值，配置文件只需写出要覆盖的部分
//! - 该模块除 [`load_config`] 外不执行任何 IO
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::catalog::{default_services, PortTables, ServiceDescriptor};

/// 配置根对象。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HardeningConfig {
    /// 受控服务清单（禁用/启用/状态查询共用）。
    pub services: Vec<ServiceDescriptor>,
    /// 端口参照表。
    pub ports: PortTables,
    /// 外部命令配置。
    pub commands: CommandConfig,
    /// 服务启用后的确认轮询策略。
    pub service_policy: ServicePolicy,
    /// NetBIOS over TCP/IP 注册表配置。
    pub netbios: NetbiosConfig,
    /// 端口列表展示策略。
    pub display: DisplayPolicy,
}

impl Default for HardeningConfig {
    fn default() -> Self {
        Self {
            services: default_services(),
            ports: PortTables::default(),
            commands: CommandConfig::default(),
            service_policy: ServicePolicy::default(),
            netbios: NetbiosConfig::default(),
            display: DisplayPolicy::default(),
        }
    }
}

/// 外部命令配置。
///
/// 说明：
/// - 默认使用系统目录下的绝对路径，避免 PATH 搜索被劫持
/// - `timeout_secs` 对所有外部调用统一生效
/// - `header_lines` 为 PowerShell 表格输出中需要跳过的表头行数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandConfig {
    pub sc_exe: String,
    pub powershell_exe: String,
    pub timeout_secs: u64,
    pub tcp_listener_script: String,
    pub udp_endpoint_script: String,
    pub header_lines: usize,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            sc_exe: r"C:\Windows\System32\sc.exe".to_string(),
            powershell_exe: r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe".to_string(),
            timeout_secs: 10,
            tcp_listener_script: "Get-NetTCPConnection | Select-Object LocalPort, State".to_string(),
            udp_endpoint_script: "Get-NetUDPEndpoint | Select-Object LocalAddress, LocalPort, OwningProcess"
                .to_string(),
            header_lines: 3,
        }
    }
}

impl CommandConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// 服务启用确认轮询策略。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicePolicy {
    /// 最大轮询次数。
    pub poll_attempts: u32,
    /// 每次轮询前的等待时长（毫秒）。
    pub poll_interval_ms: u64,
}

impl Default for ServicePolicy {
    fn default() -> Self {
        Self {
            poll_attempts: 5,
            poll_interval_ms: 1000,
        }
    }
}

impl ServicePolicy {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// 注册表根键枚举。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistryHive {
    /// HKEY_LOCAL_MACHINE。
    #[default]
    Hklm,
    /// HKEY_CURRENT_USER（仅用于测试隔离）。
    Hkcu,
}

impl RegistryHive {
    pub fn name(self) -> &'static str {
        match self {
            RegistryHive::Hklm => "HKLM",
            RegistryHive::Hkcu => "HKCU",
        }
    }
}

/// NetBIOS over TCP/IP 注册表配置。
///
/// 字段说明：
/// - `interfaces_path`：各网卡子键所在的父键
/// - `connection_path`：网卡友好名称所在的父键（`<id>\Connection\Name`）
/// - `adapter_prefix`：子键名中需剥离的前缀，剥离后即连接 ID
/// - `max_adapters`：单次枚举的子键上限
/// - `disabled_value` / `enabled_value`：`NetbiosOptions` 的禁用值与默认值
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetbiosConfig {
    pub hive: RegistryHive,
    pub interfaces_path: String,
    pub connection_path: String,
    pub value_name: String,
    pub adapter_prefix: String,
    pub max_adapters: usize,
    pub disabled_value: u32,
    pub enabled_value: u32,
}

impl Default for NetbiosConfig {
    fn default() -> Self {
        Self {
            hive: RegistryHive::Hklm,
            interfaces_path: r"SYSTEM\CurrentControlSet\Services\NetBT\Parameters\Interfaces".to_string(),
            connection_path: r"SYSTEM\CurrentControlSet\Control\Network\{4D36E972-E325-11CE-BFC1-08002BE10318}"
                .to_string(),
            value_name: "NetbiosOptions".to_string(),
            adapter_prefix: "Tcpip_".to_string(),
            max_adapters: 100,
            disabled_value: 2,
            enabled_value: 0,
        }
    }
}

/// 端口列表展示策略。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayPolicy {
    /// 参照表之外的端口最多展示多少个（按已收集条目数计）。
    pub unknown_port_cap: usize,
}

impl Default for DisplayPolicy {
    fn default() -> Self {
        Self { unknown_port_cap: 5 }
    }
}

/// 读取并解析配置文件（JSON）。
///
/// 参数：
/// - `path`：配置文件路径
///
/// 返回值：
/// - 成功：返回解析后的 [`HardeningConfig`]（缺省字段取默认值）
///
/// 异常处理：
/// - 文件读取失败（不存在/权限/IO）返回错误
/// - JSON 解析失败返回错误
pub fn load_config(path: &Path) -> Result<HardeningConfig> {
    let bytes = std::fs::read(path).with_context(|| format!("读取配置失败: {}", path.display()))?;
    let config: HardeningConfig = serde_json::from_slice(&bytes).context("解析配置 JSON 失败")?;
    Ok(config)
}
