//! 网卡 NetBIOS 注册表读写（基于 `winreg`）。
//!
//! 主要用途：
//! - 枚举 `NetBT\Parameters\Interfaces` 下的网卡子键
//! - 读取/写入各网卡的 `NetbiosOptions`
//! - 读取 `Control\Network\{...}\<GUID>\Connection` 下的网卡友好名称
//!
//! 权限要求：
//! - 读取通常不需要管理员；写入 HKLM 需要管理员权限
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use netharden_core::config::NetbiosConfig;
use netharden_core::netbios::{AdapterStore, RegistryError};

/// 基于真实注册表的 [`AdapterStore`] 实现。
///
/// 说明：
/// - 每次调用都重新打开所需的键，不持有句柄
/// - 根键、父键路径与值名均取自配置（测试时可指向 HKCU 下的临时键）
#[derive(Debug, Clone)]
pub struct WinregAdapterStore {
    #[cfg_attr(not(windows), allow(dead_code))]
    config: NetbiosConfig,
}

impl WinregAdapterStore {
    pub fn new(config: NetbiosConfig) -> Self {
        Self { config }
    }
}

#[cfg(windows)]
mod imp {
    use std::io;

    use netharden_core::config::RegistryHive;
    use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_SET_VALUE};
    use winreg::RegKey;

    use super::*;

    fn root(hive: RegistryHive) -> RegKey {
        match hive {
            RegistryHive::Hklm => RegKey::predef(HKEY_LOCAL_MACHINE),
            RegistryHive::Hkcu => RegKey::predef(HKEY_CURRENT_USER),
        }
    }

    fn io_err(hive: RegistryHive, path: &str, source: io::Error) -> RegistryError {
        RegistryError::Io {
            path: format!("{}\\{}", hive.name(), path),
            source,
        }
    }

    /// 值或键不存在视为 `None`，其余错误原样返回。
    fn optional<T>(r: io::Result<T>) -> io::Result<Option<T>> {
        match r {
            Ok(v) => Ok(Some(v)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    impl WinregAdapterStore {
        fn adapter_path(&self, adapter: &str) -> String {
            format!("{}\\{}", self.config.interfaces_path, adapter)
        }

        fn connection_key_path(&self, connection_id: &str) -> String {
            format!("{}\\{}\\Connection", self.config.connection_path, connection_id)
        }
    }

    impl AdapterStore for WinregAdapterStore {
        fn adapter_at(&self, index: usize) -> Result<Option<String>, RegistryError> {
            let hive = self.config.hive;
            let path = &self.config.interfaces_path;
            let interfaces = root(hive).open_subkey(path).map_err(|e| io_err(hive, path, e))?;
            interfaces
                .enum_keys()
                .nth(index)
                .transpose()
                .map_err(|e| io_err(hive, path, e))
        }

        fn read_option(&self, adapter: &str) -> Result<Option<u32>, RegistryError> {
            let hive = self.config.hive;
            let path = self.adapter_path(adapter);
            let key = root(hive).open_subkey(&path).map_err(|e| io_err(hive, &path, e))?;
            optional(key.get_value::<u32, _>(&self.config.value_name)).map_err(|e| io_err(hive, &path, e))
        }

        fn write_option(&self, adapter: &str, value: u32) -> Result<(), RegistryError> {
            let hive = self.config.hive;
            let path = self.adapter_path(adapter);
            let key = root(hive)
                .open_subkey_with_flags(&path, KEY_SET_VALUE)
                .map_err(|e| io_err(hive, &path, e))?;
            key.set_value(&self.config.value_name, &value)
                .map_err(|e| io_err(hive, &path, e))
        }

        fn connection_name(&self, connection_id: &str) -> Result<Option<String>, RegistryError> {
            let hive = self.config.hive;
            let path = self.connection_key_path(connection_id);
            let key = match optional(root(hive).open_subkey(&path)).map_err(|e| io_err(hive, &path, e))? {
                Some(key) => key,
                None => return Ok(None),
            };
            optional(key.get_value::<String, _>("Name")).map_err(|e| io_err(hive, &path, e))
        }
    }
}

#[cfg(not(windows))]
impl AdapterStore for WinregAdapterStore {
    fn adapter_at(&self, _index: usize) -> Result<Option<String>, RegistryError> {
        Err(RegistryError::Unsupported)
    }

    fn read_option(&self, _adapter: &str) -> Result<Option<u32>, RegistryError> {
        Err(RegistryError::Unsupported)
    }

    fn write_option(&self, _adapter: &str, _value: u32) -> Result<(), RegistryError> {
        Err(RegistryError::Unsupported)
    }

    fn connection_name(&self, _connection_id: &str) -> Result<Option<String>, RegistryError> {
        Err(RegistryError::Unsupported)
    }
}
