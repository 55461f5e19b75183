//! 各入口操作返回的报告结构。
//!
//! 约定：
//! - 报告只包含字符串列表/状态映射，所有故障都已转为描述文本
//! - 字段名即 JSON 输出中的分组名（如 `services_disabled`、`netbios_failed`）
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::netbios::AdapterRecord;
use crate::ports::PortRecord;
use crate::services::ServiceStatusEntry;

/// 网络加固（禁用）报告。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HardeningReport {
    pub services_disabled: Vec<String>,
    pub services_failed: Vec<String>,
    pub netbios_disabled: Vec<String>,
    pub netbios_failed: Vec<String>,
}

/// 撤销加固（启用）报告。
///
/// 说明：
/// - `netbios_*` 仅在调用方要求同时恢复 NetBIOS 时才会填充
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EnableReport {
    pub services_enabled: Vec<String>,
    pub services_failed: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub netbios_enabled: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub netbios_failed: Vec<String>,
}

/// 服务状态报告（按清单顺序）。
///
/// 说明：
/// - 序列化为 `显示名 -> 状态` 的对象，键按清单顺序输出
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceStatusReport {
    pub statuses: Vec<ServiceStatusEntry>,
}

impl ServiceStatusReport {
    /// 按显示名查找状态。
    pub fn status_of(&self, display_name: &str) -> Option<crate::markers::ServiceStatus> {
        self.statuses
            .iter()
            .find(|e| e.display_name == display_name)
            .map(|e| e.status)
    }
}

impl Serialize for ServiceStatusReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.statuses.len()))?;
        for entry in &self.statuses {
            map.serialize_entry(&entry.display_name, &entry.status)?;
        }
        map.end()
    }
}

/// NetBIOS 状态报告。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetbiosStatusReport {
    pub disabled_adapters: Vec<String>,
    pub enabled_adapters: Vec<String>,
    pub failed: Vec<String>,
    pub adapters: Vec<AdapterRecord>,
}

/// 端口扫描报告。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PortScanReport {
    pub tcp: Vec<String>,
    pub udp: Vec<String>,
    pub critical: Vec<String>,
    pub records: Vec<PortRecord>,
}
