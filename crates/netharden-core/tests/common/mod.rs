#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use netharden_core::config::HardeningConfig;
use netharden_core::exec::{CommandOutput, CommandRunner, ExecError};
use netharden_core::netbios::{AdapterStore, RegistryError};

type Handler = Box<dyn Fn(&[&str]) -> Result<CommandOutput, ExecError>>;

/// 按参数脚本化返回结果，并记录每次调用（参数以空格拼接，不含程序名）。
pub struct ScriptedRunner {
    handler: Handler,
    calls: RefCell<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(handler: impl Fn(&[&str]) -> Result<CommandOutput, ExecError> + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls.borrow().iter().filter(|c| c.starts_with(prefix)).count()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, _program: &str, args: &[&str]) -> Result<CommandOutput, ExecError> {
        self.calls.borrow_mut().push(args.join(" "));
        (self.handler)(args)
    }
}

pub fn ok(text: &str) -> Result<CommandOutput, ExecError> {
    Ok(CommandOutput::stdout(text))
}

pub fn timeout() -> Result<CommandOutput, ExecError> {
    Err(ExecError::Timeout {
        program: "sc.exe".to_string(),
        timeout: Duration::from_secs(10),
    })
}

/// 测试用配置：轮询不等待。
pub fn fast_config() -> HardeningConfig {
    let mut cfg = HardeningConfig::default();
    cfg.service_policy.poll_interval_ms = 0;
    cfg
}

/// 内存中的网卡注册表。
#[derive(Default)]
pub struct MemoryStore {
    pub adapters: RefCell<Vec<(String, Option<u32>)>>,
    pub names: HashMap<String, String>,
    pub fail_enum_at: Option<usize>,
    pub fail_write_on: Option<String>,
    pub fail_read_on: Option<String>,
    pub highest_index: Cell<Option<usize>>,
}

impl MemoryStore {
    pub fn with_adapters(keys: &[&str]) -> Self {
        Self {
            adapters: RefCell::new(keys.iter().map(|k| (k.to_string(), None)).collect()),
            ..Self::default()
        }
    }

    pub fn value_of(&self, key: &str) -> Option<u32> {
        self.adapters
            .borrow()
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, v)| *v)
    }

    pub fn set(&self, key: &str, value: u32) {
        if let Some(entry) = self.adapters.borrow_mut().iter_mut().find(|(k, _)| k == key) {
            entry.1 = Some(value);
        }
    }
}

fn denied(path: &str) -> RegistryError {
    RegistryError::Io {
        path: path.to_string(),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Access is denied."),
    }
}

impl AdapterStore for MemoryStore {
    fn adapter_at(&self, index: usize) -> Result<Option<String>, RegistryError> {
        self.highest_index.set(Some(index));
        if self.fail_enum_at == Some(index) {
            return Err(denied("Interfaces"));
        }
        Ok(self.adapters.borrow().get(index).map(|(k, _)| k.clone()))
    }

    fn read_option(&self, adapter: &str) -> Result<Option<u32>, RegistryError> {
        if self.fail_read_on.as_deref() == Some(adapter) {
            return Err(denied(adapter));
        }
        Ok(self.value_of(adapter))
    }

    fn write_option(&self, adapter: &str, value: u32) -> Result<(), RegistryError> {
        if self.fail_write_on.as_deref() == Some(adapter) {
            return Err(denied(adapter));
        }
        self.set(adapter, value);
        Ok(())
    }

    fn connection_name(&self, connection_id: &str) -> Result<Option<String>, RegistryError> {
        Ok(self.names.get(connection_id).cloned())
    }
}
