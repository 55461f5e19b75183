mod common;

use common::{fast_config, ok, timeout, ScriptedRunner};
use netharden_core::catalog::ServiceDescriptor;
use netharden_core::markers::ServiceStatus;
use netharden_core::services::{split_outcomes, ServiceController};

const SC: &str = r"C:\Windows\System32\sc.exe";

fn single(name: &str) -> Vec<ServiceDescriptor> {
    vec![ServiceDescriptor::new(name, name)]
}

#[test]
fn disable_records_service_on_success_marker() {
    let cfg = fast_config();
    let services = single("TermService");
    let runner = ScriptedRunner::new(|_| ok("[SC] ChangeServiceConfig SUCCESS"));
    let ctl = ServiceController::new(&runner, &services, SC, cfg.service_policy.clone());

    let (disabled, failed) = split_outcomes(&ctl.disable());
    assert_eq!(disabled, vec!["TermService"]);
    assert!(failed.is_empty());
    assert_eq!(runner.calls(), vec!["config TermService start= disabled"]);
}

#[test]
fn disable_partitions_every_service() {
    let cfg = fast_config();
    let runner = ScriptedRunner::new(|args| match args[1] {
        "bthserv" => ok("[SC] OpenService FAILED 1060:"),
        "xbgm" => timeout(),
        _ => ok("[SC] ChangeServiceConfig SUCCESS"),
    });
    let ctl = ServiceController::new(&runner, &cfg.services, SC, cfg.service_policy.clone());

    let (disabled, failed) = split_outcomes(&ctl.disable());
    assert_eq!(disabled.len() + failed.len(), cfg.services.len());
    assert_eq!(disabled.len(), 6);
    assert!(failed.contains(&"bthserv".to_string()));
    assert!(failed.iter().any(|f| f.starts_with("xbgm (error: ")));
}

#[test]
fn enable_confirms_running_after_a_few_polls() {
    let cfg = fast_config();
    let services = single("bthserv");
    let polls = std::cell::Cell::new(0);
    let runner = ScriptedRunner::new(move |args| match args[0] {
        "config" => ok("[SC] ChangeServiceConfig SUCCESS"),
        "start" => ok("STATE : 2 START_PENDING"),
        "query" => {
            polls.set(polls.get() + 1);
            if polls.get() >= 3 {
                ok("STATE : 4 RUNNING")
            } else {
                ok("STATE : 2 START_PENDING")
            }
        }
        _ => ok(""),
    });
    let ctl = ServiceController::new(&runner, &services, SC, cfg.service_policy.clone());

    let (enabled, failed) = split_outcomes(&ctl.enable());
    assert_eq!(enabled, vec!["bthserv"]);
    assert!(failed.is_empty());
    assert_eq!(runner.count("query"), 3);
    assert_eq!(runner.calls()[0], "config bthserv start= auto");
}

#[test]
fn enable_gives_up_after_poll_budget() {
    let cfg = fast_config();
    let services = single("XblGameSave");
    let runner = ScriptedRunner::new(|args| match args[0] {
        "config" => ok("[SC] ChangeServiceConfig SUCCESS"),
        _ => ok("STATE : 1 STOPPED"),
    });
    let ctl = ServiceController::new(&runner, &services, SC, cfg.service_policy.clone());

    let (enabled, failed) = split_outcomes(&ctl.enable());
    assert!(enabled.is_empty());
    assert_eq!(failed, vec!["XblGameSave (didn't confirm running)"]);
    assert_eq!(runner.count("query"), cfg.service_policy.poll_attempts as usize);
}

#[test]
fn enable_skips_start_when_config_fails() {
    let cfg = fast_config();
    let services = single("RemoteAccess");
    let runner = ScriptedRunner::new(|_| ok("[SC] ChangeServiceConfig FAILED 5:\r\nAccess is denied."));
    let ctl = ServiceController::new(&runner, &services, SC, cfg.service_policy.clone());

    let (_, failed) = split_outcomes(&ctl.enable());
    assert_eq!(failed, vec!["RemoteAccess (config failed)"]);
    assert_eq!(runner.count("start"), 0);
}

#[test]
fn enable_continues_after_a_faulting_service() {
    let cfg = fast_config();
    let services = vec![
        ServiceDescriptor::new("xbgm", "Xbox Game Monitoring"),
        ServiceDescriptor::new("bthserv", "Bluetooth Support Service"),
    ];
    let runner = ScriptedRunner::new(|args| match (args[0], args[1]) {
        ("start", "xbgm") => timeout(),
        ("config", _) => ok("SUCCESS"),
        ("query", _) => ok("RUNNING"),
        _ => ok(""),
    });
    let ctl = ServiceController::new(&runner, &services, SC, cfg.service_policy.clone());

    let (enabled, failed) = split_outcomes(&ctl.enable());
    assert_eq!(enabled, vec!["bthserv"]);
    assert_eq!(failed.len(), 1);
    assert!(failed[0].starts_with("xbgm (error: "), "{}", failed[0]);
}

#[test]
fn status_short_circuits_on_disabled_start_type() {
    let cfg = fast_config();
    let services = vec![
        ServiceDescriptor::new("TermService", "Remote Desktop Services"),
        ServiceDescriptor::new("bthserv", "Bluetooth Support Service"),
        ServiceDescriptor::new("xbgm", "Xbox Game Monitoring"),
        ServiceDescriptor::new("WFDSConMgrSvc", "Wi-Fi Direct Services"),
    ];
    let runner = ScriptedRunner::new(|args| match (args[0], args[1]) {
        ("qc", "TermService") => ok("START_TYPE : 4 DISABLED"),
        ("qc", _) => ok("START_TYPE : 3 DEMAND_START"),
        // 即使运行中，禁用的服务也不应被查询
        ("query", "TermService") => ok("STATE : 4 RUNNING"),
        ("query", "bthserv") => ok("STATE : 4 RUNNING"),
        ("query", "xbgm") => ok("STATE : 1 STOPPED"),
        _ => ok("[SC] OpenService FAILED 1060"),
    });
    let ctl = ServiceController::new(&runner, &services, SC, cfg.service_policy.clone());

    let statuses: Vec<(String, ServiceStatus)> = ctl
        .status()
        .into_iter()
        .map(|e| (e.display_name, e.status))
        .collect();
    assert_eq!(
        statuses,
        vec![
            ("Remote Desktop Services".to_string(), ServiceStatus::Disabled),
            ("Bluetooth Support Service".to_string(), ServiceStatus::Running),
            ("Xbox Game Monitoring".to_string(), ServiceStatus::Stopped),
            ("Wi-Fi Direct Services".to_string(), ServiceStatus::Unknown),
        ]
    );
    assert!(!runner.calls().contains(&"query TermService".to_string()));
}

#[test]
fn status_reports_unknown_when_command_faults() {
    let cfg = fast_config();
    let services = single("xbgm");
    let runner = ScriptedRunner::new(|_| timeout());
    let ctl = ServiceController::new(&runner, &services, SC, cfg.service_policy.clone());

    let statuses = ctl.status();
    assert_eq!(statuses.len(), 1);
    assert_eq!(statuses[0].status, ServiceStatus::Unknown);
}
