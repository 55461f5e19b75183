//! 静态参照数据：受控服务清单与端口参照表。
//!
//! 说明：
//! - 这里只提供默认值；运行时由 [`crate::config::HardeningConfig`] 持有副本并注入各组件
//! - 端口表按端口号排序存储，序列化为 JSON 时键为十进制字符串
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 受控服务描述。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    /// 服务内部名（`sc` 使用的稳定标识）。
    pub name: String,
    /// 显示名（用于状态报告）。
    pub display_name: String,
}

impl ServiceDescriptor {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
        }
    }
}

const DEFAULT_SERVICES: &[(&str, &str)] = &[
    ("bthserv", "Bluetooth Support Service"),
    ("TermService", "Remote Desktop Services"),
    ("RemoteAccess", "Routing and Remote Access"),
    ("WFDSConMgrSvc", "Wi-Fi Direct Services"),
    ("xbgm", "Xbox Game Monitoring"),
    ("XblAuthManager", "Xbox Live Auth Manager"),
    ("XboxNetApiSvc", "Xbox Live Networking Service"),
    ("XblGameSave", "Xbox Live Game Save"),
];

const COMMON_TCP_PORTS: &[(u16, &str)] = &[
    (21, "FTP"),
    (22, "SSH"),
    (23, "Telnet"),
    (25, "SMTP"),
    (53, "DNS"),
    (80, "HTTP"),
    (135, "RPC"),
    (139, "NetBIOS"),
    (443, "HTTPS"),
    (445, "SMB"),
    (1900, "UPnP"),
    (3389, "RDP"),
    (5353, "mDNS"),
];

const KNOWN_UDP_PORTS: &[(u16, &str)] = &[
    (53, "DNS"),
    (67, "DHCP Server"),
    (68, "DHCP Client"),
    (123, "NTP"),
    (137, "NetBIOS Name"),
    (138, "NetBIOS Datagram"),
    (161, "SNMP"),
    (162, "SNMP Trap"),
    (500, "ISAKMP"),
    (1900, "UPnP"),
    (3702, "WS-Discovery"),
    (5353, "mDNS"),
];

const CRITICAL_PORTS: &[(u16, &str)] = &[
    (22, "SSH"),
    (53, "DNS"),
    (137, "NetBIOS Name"),
    (138, "NetBIOS Datagram"),
    (139, "NetBIOS Session"),
    (161, "SNMP"),
    (445, "SMB"),
    (3389, "RDP"),
];

/// 默认受控服务清单（8 项）。
pub fn default_services() -> Vec<ServiceDescriptor> {
    DEFAULT_SERVICES
        .iter()
        .map(|(name, display)| ServiceDescriptor::new(*name, *display))
        .collect()
}

/// 端口号 → 服务名映射。
pub type PortTable = BTreeMap<u16, String>;

fn table(entries: &[(u16, &str)]) -> PortTable {
    entries
        .iter()
        .map(|(port, name)| (*port, (*name).to_string()))
        .collect()
}

/// 三张端口参照表。
///
/// 字段说明：
/// - `common_tcp`：常见 TCP 端口（命中即展示）
/// - `known_udp`：常见 UDP 服务端口（命中即展示）
/// - `critical`：应当关闭的高危端口（监听即告警）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortTables {
    pub common_tcp: PortTable,
    pub known_udp: PortTable,
    pub critical: PortTable,
}

impl Default for PortTables {
    fn default() -> Self {
        Self {
            common_tcp: table(COMMON_TCP_PORTS),
            known_udp: table(KNOWN_UDP_PORTS),
            critical: table(CRITICAL_PORTS),
        }
    }
}
