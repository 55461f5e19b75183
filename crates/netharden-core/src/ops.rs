//! 入口操作：每个操作独立完成一次完整流程并返回报告。
//!
//! 说明：
//! - 操作之间不共享可变状态，可重复调用
//! - 同一操作的并发调用会同时修改系统级服务/注册表状态，需由调用方串行化
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use tracing::info;

use crate::config::HardeningConfig;
use crate::exec::CommandRunner;
use crate::netbios::{AdapterStore, AdapterToggle};
use crate::ports::PortClassifier;
use crate::report::{EnableReport, HardeningReport, NetbiosStatusReport, PortScanReport, ServiceStatusReport};
use crate::services::{split_outcomes, ServiceController};

fn service_controller<'a, R: CommandRunner>(runner: R, cfg: &'a HardeningConfig) -> ServiceController<'a, R> {
    ServiceController::new(runner, &cfg.services, &cfg.commands.sc_exe, cfg.service_policy.clone())
}

/// 执行网络加固：禁用受控服务，并对所有网卡禁用 NetBIOS over TCP/IP。
pub fn disable_network_hardening<R: CommandRunner, S: AdapterStore>(
    runner: R,
    store: S,
    cfg: &HardeningConfig,
) -> HardeningReport {
    info!("开始网络加固: {} 个服务", cfg.services.len());
    let (services_disabled, services_failed) = split_outcomes(&service_controller(runner, cfg).disable());
    let netbios = AdapterToggle::new(store, &cfg.netbios).disable_all();
    HardeningReport {
        services_disabled,
        services_failed,
        netbios_disabled: netbios.changed,
        netbios_failed: netbios.failed,
    }
}

/// 撤销网络加固：启用并启动受控服务；`with_netbios` 为真时同时恢复 NetBIOS 默认设置。
pub fn enable_network_hardening<R: CommandRunner, S: AdapterStore>(
    runner: R,
    store: S,
    cfg: &HardeningConfig,
    with_netbios: bool,
) -> EnableReport {
    info!("开始撤销网络加固: {} 个服务", cfg.services.len());
    let (services_enabled, services_failed) = split_outcomes(&service_controller(runner, cfg).enable());
    let mut report = EnableReport {
        services_enabled,
        services_failed,
        ..EnableReport::default()
    };
    if with_netbios {
        let netbios = AdapterToggle::new(store, &cfg.netbios).enable_all();
        report.netbios_enabled = netbios.changed;
        report.netbios_failed = netbios.failed;
    }
    report
}

/// 查询受控服务状态。
pub fn query_service_status<R: CommandRunner>(runner: R, cfg: &HardeningConfig) -> ServiceStatusReport {
    ServiceStatusReport {
        statuses: service_controller(runner, cfg).status(),
    }
}

/// 扫描监听端口并标记高危端口。
pub fn query_port_status<R: CommandRunner>(runner: R, cfg: &HardeningConfig) -> PortScanReport {
    PortClassifier::new(runner, &cfg.ports, &cfg.commands, &cfg.display).scan()
}

/// 查询各网卡 NetBIOS 状态（按友好名称分组）。
pub fn query_netbios_status<S: AdapterStore>(store: S, cfg: &HardeningConfig) -> NetbiosStatusReport {
    let status = AdapterToggle::new(store, &cfg.netbios).status();
    let mut report = NetbiosStatusReport {
        failed: status.failed,
        ..NetbiosStatusReport::default()
    };
    for adapter in &status.adapters {
        if adapter.protocol_enabled {
            report.enabled_adapters.push(adapter.friendly_name.clone());
        } else {
            report.disabled_adapters.push(adapter.friendly_name.clone());
        }
    }
    report.adapters = status.adapters;
    report
}
