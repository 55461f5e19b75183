//! NetBIOS over TCP/IP 开关（按网卡写入 `NetbiosOptions`）。
//!
//! 注册表约定：
//! - `<interfaces_path>\Tcpip_{GUID}` 下的 DWORD `NetbiosOptions`：2 = 禁用，缺省/其他 = 启用
//! - `<connection_path>\{GUID}\Connection` 下的 `Name`：网卡友好名称
//!
//! 枚举策略：
//! - 按序号从 0 开始逐个枚举子键，遇到“无更多条目”即停止，最多处理 `max_adapters` 个
//! - 达到上限后再探测一次序号 `max_adapters`，确有剩余子键才告警
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::NetbiosConfig;

/// 注册表访问错误。
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("注册表访问失败: {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("当前平台不支持注册表操作")]
    Unsupported,
}

/// 网卡注册表访问接口。
///
/// 约定：
/// - `adapter_at` 返回 `Ok(None)` 表示没有更多子键（正常结束），`Err` 表示访问故障
/// - `read_option` / `connection_name` 在值或键不存在时返回 `Ok(None)`
pub trait AdapterStore {
    fn adapter_at(&self, index: usize) -> Result<Option<String>, RegistryError>;
    fn read_option(&self, adapter: &str) -> Result<Option<u32>, RegistryError>;
    fn write_option(&self, adapter: &str, value: u32) -> Result<(), RegistryError>;
    fn connection_name(&self, connection_id: &str) -> Result<Option<String>, RegistryError>;
}

impl<S: AdapterStore + ?Sized> AdapterStore for &S {
    fn adapter_at(&self, index: usize) -> Result<Option<String>, RegistryError> {
        (**self).adapter_at(index)
    }

    fn read_option(&self, adapter: &str) -> Result<Option<u32>, RegistryError> {
        (**self).read_option(adapter)
    }

    fn write_option(&self, adapter: &str, value: u32) -> Result<(), RegistryError> {
        (**self).write_option(adapter, value)
    }

    fn connection_name(&self, connection_id: &str) -> Result<Option<String>, RegistryError> {
        (**self).connection_name(connection_id)
    }
}

/// 单个网卡的 NetBIOS 状态。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdapterRecord {
    /// 注册表子键名（如 `Tcpip_{GUID}`）。
    pub registry_key: String,
    /// 友好名称（查不到时回退为连接 ID）。
    pub friendly_name: String,
    pub protocol_enabled: bool,
}

/// 批量写入结果。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdapterBatch {
    /// 写入成功的子键名。
    pub changed: Vec<String>,
    /// 失败描述（至多一条，出现即表示枚举已中止）。
    pub failed: Vec<String>,
    /// 上限之后仍有未处理的子键。
    pub truncated: bool,
}

/// 状态查询结果。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AdapterStatus {
    pub adapters: Vec<AdapterRecord>,
    pub failed: Vec<String>,
    pub truncated: bool,
}

/// NetBIOS 开关。
pub struct AdapterToggle<'a, S: AdapterStore> {
    store: S,
    config: &'a NetbiosConfig,
}

impl<'a, S: AdapterStore> AdapterToggle<'a, S> {
    pub fn new(store: S, config: &'a NetbiosConfig) -> Self {
        Self { store, config }
    }

    /// 对所有网卡禁用 NetBIOS over TCP/IP。
    ///
    /// 异常处理：
    /// - 任一枚举/写入故障记为一条 `Error: ...` 并中止枚举；已写入的网卡仍保留在结果中
    pub fn disable_all(&self) -> AdapterBatch {
        self.apply_all(self.config.disabled_value)
    }

    /// 对所有网卡恢复 NetBIOS 默认行为（写入默认值）。
    pub fn enable_all(&self) -> AdapterBatch {
        self.apply_all(self.config.enabled_value)
    }

    fn apply_all(&self, value: u32) -> AdapterBatch {
        let mut batch = AdapterBatch::default();
        let result = self.for_each_adapter(|adapter| {
            self.store.write_option(&adapter, value)?;
            info!("已写入 {}={value}: {adapter}", self.config.value_name);
            batch.changed.push(adapter);
            Ok(())
        });
        match result {
            Ok(truncated) => batch.truncated = truncated,
            Err(e) => {
                warn!("写入 NetBIOS 设置中止: {e}");
                batch.failed.push(format!("Error: {e}"));
            }
        }
        batch
    }

    /// 查询所有网卡的 NetBIOS 状态并映射友好名称。
    ///
    /// 异常处理：
    /// - 单个网卡读取失败记为 `<子键>: <原因>`，继续下一个
    /// - 枚举故障记为 `Error: ...` 并停止
    pub fn status(&self) -> AdapterStatus {
        let mut status = AdapterStatus::default();
        let result = self.for_each_adapter(|adapter| {
            let value = match self.store.read_option(&adapter) {
                Ok(v) => v.unwrap_or(self.config.enabled_value),
                Err(e) => {
                    warn!("读取 NetBIOS 设置失败: {adapter}: {e}");
                    status.failed.push(format!("{adapter}: {e}"));
                    return Ok(());
                }
            };
            let friendly_name = self.friendly_name(&adapter);
            status.adapters.push(AdapterRecord {
                registry_key: adapter,
                friendly_name,
                protocol_enabled: value != self.config.disabled_value,
            });
            Ok(())
        });
        match result {
            Ok(truncated) => status.truncated = truncated,
            Err(e) => {
                warn!("枚举网卡失败: {e}");
                status.failed.push(format!("Error: {e}"));
            }
        }
        status
    }

    /// 由子键名推导连接 ID 并查询友好名称；查询不到或失败时回退为连接 ID。
    fn friendly_name(&self, adapter: &str) -> String {
        let connection_id = connection_id(adapter, &self.config.adapter_prefix);
        match self.store.connection_name(&connection_id) {
            Ok(Some(name)) => name,
            Ok(None) => connection_id,
            Err(e) => {
                warn!("查询网卡名称失败，回退为连接 ID: {connection_id}: {e}");
                connection_id
            }
        }
    }

    /// 按序号枚举子键并逐个回调，最多 `max_adapters` 个。
    ///
    /// 返回值：
    /// - `Ok(true)`：上限处之后仍有子键（已探测序号 `max_adapters`），其余未处理
    /// - `Ok(false)`：枚举自然结束
    fn for_each_adapter<F>(&self, mut f: F) -> Result<bool, RegistryError>
    where
        F: FnMut(String) -> Result<(), RegistryError>,
    {
        for index in 0..self.config.max_adapters {
            match self.store.adapter_at(index)? {
                Some(adapter) => f(adapter)?,
                None => return Ok(false),
            }
        }
        match self.store.adapter_at(self.config.max_adapters) {
            Ok(Some(_)) => {
                warn!("网卡子键数量超过上限 {}，其余未处理", self.config.max_adapters);
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                debug!("探测上限之后的子键失败，忽略: {e}");
                Ok(false)
            }
        }
    }
}

/// 取子键名最后一段并剥离前缀，得到连接 ID（GUID）。
pub fn connection_id(adapter: &str, prefix: &str) -> String {
    let last = adapter.rsplit('\\').next().unwrap_or(adapter);
    last.replace(prefix, "")
}
