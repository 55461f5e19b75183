use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::{json, Value};

fn netharden() -> Command {
    Command::new(env!("CARGO_BIN_EXE_netharden"))
}

fn unique_temp_file(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("netharden-{}-{name}", std::process::id()))
}

const SERVICE_NAMES: [&str; 8] = [
    "bthserv",
    "TermService",
    "RemoteAccess",
    "WFDSConMgrSvc",
    "xbgm",
    "XblAuthManager",
    "XboxNetApiSvc",
    "XblGameSave",
];

/// 写入一份“所有外部依赖都不可用”的配置：`sc.exe` 不存在，NetBIOS 父键指向 HKCU 下不存在的路径。
fn write_unreachable_config(name: &str) -> PathBuf {
    let path = unique_temp_file(name);
    let cfg = json!({
        "commands": { "sc_exe": "netharden-missing-sc", "timeout_secs": 2 },
        "service_policy": { "poll_attempts": 1, "poll_interval_ms": 0 },
        "netbios": {
            "hive": "hkcu",
            "interfaces_path": format!("Software\\NetHardenTest\\e2e-{}-{name}\\Missing", std::process::id()),
        },
    });
    std::fs::write(&path, cfg.to_string()).expect("write config");
    path
}

/// 以跳过管理员检查的方式运行需要提权的子命令，返回解析后的 JSON 报告。
fn run_admin_json(config: &Path, args: &[&str]) -> Value {
    let out = netharden()
        .env("NETHARDEN_ALLOW_NON_ADMIN", "1")
        .args(["--json", "--config", config.to_str().unwrap()])
        .args(args)
        .output()
        .expect("run netharden");
    let _ = std::fs::remove_file(config);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    serde_json::from_slice(&out.stdout).expect("parse json")
}

fn assert_every_service_errored(failed: &Value) {
    let failed = failed.as_array().expect("services_failed array");
    assert_eq!(failed.len(), SERVICE_NAMES.len(), "{failed:?}");
    for (line, name) in failed.iter().zip(SERVICE_NAMES) {
        let line = line.as_str().expect("string entry");
        assert!(line.starts_with(&format!("{name} (error: ")), "{line}");
        assert!(line.ends_with(')'), "{line}");
    }
}

fn assert_single_netbios_error(failed: &Value) {
    let failed = failed.as_array().expect("netbios_failed array");
    assert_eq!(failed.len(), 1, "{failed:?}");
    assert!(failed[0].as_str().unwrap().starts_with("Error: "), "{failed:?}");
}

#[test]
fn disable_with_unreachable_tools_reports_every_failure() {
    let config = write_unreachable_config("disable.json");
    let v = run_admin_json(&config, &["disable"]);

    for bucket in ["services_disabled", "services_failed", "netbios_disabled", "netbios_failed"] {
        assert!(v[bucket].is_array(), "missing bucket {bucket}: {v}");
    }
    assert_eq!(v["services_disabled"], json!([]));
    assert_eq!(v["netbios_disabled"], json!([]));
    assert_every_service_errored(&v["services_failed"]);
    assert_single_netbios_error(&v["netbios_failed"]);
}

#[test]
fn enable_with_netbios_and_unreachable_tools_reports_every_failure() {
    let config = write_unreachable_config("enable.json");
    let v = run_admin_json(&config, &["enable", "--with-netbios"]);

    assert_eq!(v["services_enabled"], json!([]));
    assert_every_service_errored(&v["services_failed"]);
    // 空分组不输出
    assert!(v.get("netbios_enabled").is_none(), "{v}");
    assert_single_netbios_error(&v["netbios_failed"]);
}

#[test]
fn default_config_prints_parseable_json() {
    let out = netharden().arg("default-config").output().expect("run netharden");
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let v: Value = serde_json::from_slice(&out.stdout).expect("parse json");
    assert_eq!(v["services"].as_array().map(Vec::len), Some(8));
    assert_eq!(v["ports"]["critical"]["3389"], "RDP");
    assert_eq!(v["netbios"]["max_adapters"], 100);
    assert_eq!(v["display"]["unknown_port_cap"], 5);
}

#[test]
fn missing_config_file_fails_cleanly() {
    let path = unique_temp_file("missing.json");
    let out = netharden()
        .args(["--config", path.to_str().unwrap(), "services"])
        .output()
        .expect("run netharden");
    assert!(!out.status.success());
}

#[test]
fn json_report_for_ports_has_three_buckets() {
    // 指向不存在的 powershell：扫描失败时仍应输出完整报告
    let path = unique_temp_file("ports.json");
    std::fs::write(
        &path,
        r#"{ "commands": { "powershell_exe": "netharden-missing-powershell", "timeout_secs": 2 } }"#,
    )
    .expect("write config");

    let out = netharden()
        .args(["--json", "--config", path.to_str().unwrap(), "ports"])
        .output()
        .expect("run netharden");
    let _ = std::fs::remove_file(&path);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let v: Value = serde_json::from_slice(&out.stdout).expect("parse json");
    assert!(v["tcp"][0].as_str().unwrap().starts_with("Error retrieving TCP ports: "));
    assert!(v["udp"][0].as_str().unwrap().starts_with("Error retrieving UDP services: "));
    assert_eq!(v["critical"][0], "Could not determine critical port status.");
}
