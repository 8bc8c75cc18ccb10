//! End-to-end scan flow against the recording mock runtime

use iscan_e2e_tests::*;
use iscan_engine::domain::ports::OutputFrame;
use iscan_engine::{ExecuteScan, ScanConfig, ScanRequest, ScanVerdict};
use std::collections::HashMap;
use std::io::Write;

#[tokio::test]
async fn scan_of_clean_image_returns_report() {
    let runtime = scripted_runtime("{\"status\":\"ok\"}", 0);

    let report = use_case(&runtime)
        .execute(scan_request("alpine:3.10"))
        .await
        .unwrap();

    assert_eq!(report.verdict, ScanVerdict::Pass);
    assert_eq!(report.report, "{\"status\":\"ok\"}");
    assert_eq!(runtime.created().len(), 1);
    assert_eq!(runtime.stop_count(), 1);
}

#[tokio::test]
async fn session_runs_setup_tail_then_scan() {
    let runtime = scripted_runtime("{}", 0);
    use_case(&runtime)
        .execute(scan_request("alpine:3.10"))
        .await
        .unwrap();

    let execs = runtime.exec_history();
    assert_eq!(
        execs[0],
        vec!["mkdir", "-p", "/tmp/sysdig-inline-scan/logs"]
    );
    assert_eq!(
        execs[1],
        vec!["touch", "/tmp/sysdig-inline-scan/logs/info.log"]
    );
    assert_eq!(execs[2][0], SCAN_COMMAND);
    assert!(execs[2].contains(&"alpine:3.10".to_string()));

    let detached = runtime.detached_exec_history();
    assert_eq!(
        detached[0],
        vec![
            "tail",
            "--sleep-interval=0.2",
            "-f",
            "/tmp/sysdig-inline-scan/logs/info.log"
        ]
    );
}

#[tokio::test]
async fn shell_trace_lines_are_rerouted() {
    let runtime = scripted_runtime("+ set -x\n{\"status\":\"ok\"}", 0);

    let report = use_case(&runtime)
        .execute(scan_request("alpine:3.10"))
        .await
        .unwrap();

    assert_eq!(report.report, "{\"status\":\"ok\"}");
}

#[tokio::test]
async fn stderr_does_not_pollute_the_report() {
    let runtime = iscan_engine::domain::ports::mock_runtime::MockRuntime::new();
    runtime.script_exec(
        SCAN_COMMAND,
        vec![
            OutputFrame::stderr("progress: fetching layers"),
            OutputFrame::stdout("{\"status\":\"ok\"}"),
            OutputFrame::stderr("progress: done"),
        ],
        0,
    );

    let report = use_case(&runtime)
        .execute(scan_request("alpine:3.10"))
        .await
        .unwrap();

    assert_eq!(report.report, "{\"status\":\"ok\"}");
}

#[tokio::test]
async fn dockerfile_is_copied_and_referenced() {
    let dir = tempfile::tempdir().unwrap();
    let dockerfile = dir.path().join("Dockerfile");
    let mut file = std::fs::File::create(&dockerfile).unwrap();
    writeln!(file, "FROM alpine:3.10").unwrap();

    let runtime = scripted_runtime("{}", 0);
    let request = ScanRequest::builder("alpine:3.10", scan_config())
        .dockerfile(&dockerfile)
        .build()
        .unwrap();

    use_case(&runtime).execute(request).await.unwrap();

    let copies = runtime.copies();
    assert_eq!(copies[0].0, dockerfile);
    assert_eq!(copies[0].1, "/tmp/");

    let scan_argv = runtime.exec_history().into_iter().last().unwrap();
    assert!(scan_argv.contains(&"--dockerfile=/tmp/Dockerfile".to_string()));
}

#[tokio::test]
async fn on_prem_engine_url_adds_arguments() {
    let mut config = scan_config();
    config.engine_url = "https://sysdig.internal:8443".to_string();
    let request = ScanRequest::builder("alpine:3.10", config).build().unwrap();

    let runtime = scripted_runtime("{}", 0);
    use_case(&runtime).execute(request).await.unwrap();

    let scan_argv = runtime.exec_history().into_iter().last().unwrap();
    assert!(scan_argv.contains(&"--sysdig-url=https://sysdig.internal:8443".to_string()));
    assert!(scan_argv.contains(&"--on-prem".to_string()));
}

#[tokio::test]
async fn default_engine_url_adds_no_on_prem_arguments() {
    let runtime = scripted_runtime("{}", 0);
    use_case(&runtime)
        .execute(scan_request("alpine:3.10"))
        .await
        .unwrap();

    let scan_argv = runtime.exec_history().into_iter().last().unwrap();
    assert!(!scan_argv.iter().any(|a| a.starts_with("--sysdig-url")));
    assert!(!scan_argv.contains(&"--on-prem".to_string()));
}

#[tokio::test]
async fn proxy_settings_reach_the_container_environment() {
    let mut env = HashMap::new();
    env.insert("http_proxy".to_string(), "http://proxy:3128".to_string());
    env.insert("NO_PROXY".to_string(), "localhost".to_string());

    let runtime = scripted_runtime("{}", 0);
    use_case(&runtime)
        .execute(scan_request_with_env("alpine:3.10", env))
        .await
        .unwrap();

    let spec = &runtime.created()[0];
    assert!(spec.env.contains(&"http_proxy=http://proxy:3128".to_string()));
    assert!(spec.env.contains(&"https_proxy=http://proxy:3128".to_string()));
    assert!(spec.env.contains(&"no_proxy=localhost".to_string()));
    assert!(spec.env.contains(&"SYSDIG_API_TOKEN=test-token".to_string()));
}

#[tokio::test]
async fn policy_failure_still_yields_the_report() {
    let runtime = scripted_runtime("{\"status\":\"fail\"}", 1);

    let report = use_case(&runtime)
        .execute(scan_request("alpine:3.10"))
        .await
        .unwrap();

    assert_eq!(report.verdict, ScanVerdict::PolicyFail);
    assert_eq!(report.report, "{\"status\":\"fail\"}");
}
