//! 网络加固命令行入口（netharden）。
//!
//! 职责：
//! - 读取可选配置文件（netharden.json），缺省使用内置服务清单与端口表
//! - 分发子命令：禁用/启用受控服务与 NetBIOS、查询服务状态、扫描监听端口、查询 NetBIOS 状态
//! - 以文本或 JSON 形式输出报告（报告内已包含所有失败描述，命令本身不因单项失败而报错）
//!
//! 权限要求：
//! - `disable` / `enable` 需要管理员权限
//!
//! 作者：网络加固工具项目组
//! 创建时间：2026-10-19
//! 修改时间：2026-10-19

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use netharden_core::config::{load_config, HardeningConfig};
use netharden_core::ops;
use netharden_core::report::{EnableReport, HardeningReport, NetbiosStatusReport, PortScanReport, ServiceStatusReport};
use netharden_windows::command::SystemCommandRunner;
use netharden_windows::registry::WinregAdapterStore;
use netharden_windows::{elevation, process};

/// 命令行参数。
///
/// 说明：
/// - `config` 指向配置文件（不指定则使用内置默认值）
/// - `json` 以 JSON 输出报告，便于脚本处理
#[derive(Debug, Parser)]
#[command(name = "netharden", version)]
struct Cli {
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

/// 支持的子命令。
#[derive(Debug, Subcommand)]
enum Commands {
    /// 网络加固：禁用受控服务，并对所有网卡禁用 NetBIOS over TCP/IP。
    Disable,
    /// 撤销加固：启用并启动受控服务。
    Enable {
        /// 同时恢复所有网卡的 NetBIOS 默认设置。
        #[arg(long, default_value_t = false)]
        with_netbios: bool,
    },
    /// 查询受控服务状态。
    Services,
    /// 扫描监听端口并标记高危端口。
    Ports,
    /// 查询各网卡 NetBIOS 状态。
    Netbios,
    /// 环境自检（管理员权限、外部工具路径）。
    Doctor,
    /// 输出默认配置（可作为配置文件模板）。
    DefaultConfig,
}

/// 程序入口：解析参数并分发子命令。
///
/// 异常处理：
/// - 配置读取失败、权限不足时返回 `Err`
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("info".parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = match &cli.config {
        Some(path) => load_config(path)?,
        None => HardeningConfig::default(),
    };
    let runner = SystemCommandRunner::new(cfg.commands.timeout());
    let store = WinregAdapterStore::new(cfg.netbios.clone());

    match cli.command {
        Commands::Disable => {
            require_admin("网络加固")?;
            let report = ops::disable_network_hardening(&runner, &store, &cfg);
            emit(cli.json, &report, print_hardening)
        }
        Commands::Enable { with_netbios } => {
            require_admin("撤销加固")?;
            let report = ops::enable_network_hardening(&runner, &store, &cfg, with_netbios);
            emit(cli.json, &report, print_enable)
        }
        Commands::Services => {
            let report = ops::query_service_status(&runner, &cfg);
            emit(cli.json, &report, print_service_status)
        }
        Commands::Ports => {
            let mut report = ops::query_port_status(&runner, &cfg);
            process::annotate_owners(&mut report.records);
            emit(cli.json, &report, print_ports)
        }
        Commands::Netbios => {
            let report = ops::query_netbios_status(&store, &cfg);
            emit(cli.json, &report, print_netbios)
        }
        Commands::Doctor => doctor(&cfg),
        Commands::DefaultConfig => {
            let json = serde_json::to_string_pretty(&HardeningConfig::default()).context("序列化默认配置失败")?;
            println!("{json}");
            Ok(())
        }
    }
}

fn allow_non_admin_for_tests() -> bool {
    matches!(
        std::env::var("NETHARDEN_ALLOW_NON_ADMIN").as_deref(),
        Ok("1")
    )
}

/// 修改系统配置前检查管理员权限。
fn require_admin(action: &str) -> Result<()> {
    if !allow_non_admin_for_tests() && !elevation::is_running_as_admin()? {
        return Err(anyhow!("{action}需要管理员权限，请以管理员方式运行"));
    }
    info!("开始执行: {action}");
    Ok(())
}

/// 按输出模式打印报告。
fn emit<T: Serialize>(json: bool, report: &T, print_text: fn(&T)) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report).context("序列化报告失败")?;
        println!("{text}");
    } else {
        print_text(report);
    }
    Ok(())
}

fn print_bucket(title: &str, lines: &[String]) {
    println!("{title}:");
    if lines.is_empty() {
        println!("  (none)");
    }
    for line in lines {
        println!("  {line}");
    }
}

fn print_hardening(r: &HardeningReport) {
    print_bucket("services_disabled", &r.services_disabled);
    print_bucket("services_failed", &r.services_failed);
    print_bucket("netbios_disabled", &r.netbios_disabled);
    print_bucket("netbios_failed", &r.netbios_failed);
}

fn print_enable(r: &EnableReport) {
    print_bucket("services_enabled", &r.services_enabled);
    print_bucket("services_failed", &r.services_failed);
    if !r.netbios_enabled.is_empty() || !r.netbios_failed.is_empty() {
        print_bucket("netbios_enabled", &r.netbios_enabled);
        print_bucket("netbios_failed", &r.netbios_failed);
    }
}

fn print_service_status(r: &ServiceStatusReport) {
    for entry in &r.statuses {
        println!("{} ({}) = {}", entry.display_name, entry.name, entry.status.as_str());
    }
}

fn print_ports(r: &PortScanReport) {
    print_bucket("tcp", &r.tcp);
    print_bucket("udp", &r.udp);
    print_bucket("critical", &r.critical);
}

fn print_netbios(r: &NetbiosStatusReport) {
    print_bucket("disabled_adapters", &r.disabled_adapters);
    print_bucket("enabled_adapters", &r.enabled_adapters);
    print_bucket("failed", &r.failed);
}

/// 环境自检（用于排障）。
///
/// 输出：
/// - 是否管理员运行
/// - `sc.exe` / `powershell.exe` 路径是否存在
/// - 统一超时与 NetBIOS 父键
fn doctor(cfg: &HardeningConfig) -> Result<()> {
    println!("admin = {}", elevation::is_running_as_admin()?);
    for exe in [&cfg.commands.sc_exe, &cfg.commands.powershell_exe] {
        println!("{exe} = {}", PathBuf::from(exe).exists());
    }
    println!("timeout_secs = {}", cfg.commands.timeout_secs);
    println!(
        "netbios_interfaces = {}\\{}",
        cfg.netbios.hive.name(),
        cfg.netbios.interfaces_path
    );
    Ok(())
}
