//! Shared test utilities for the scan-flow E2E tests
//!
//! The system under test is a library call, so these tests drive
//! `ExecuteScanUseCase` in-process against the recording `MockRuntime`
//! instead of spawning anything. Helpers here build requests and scripted
//! runtimes for the common scenarios.

use iscan_engine::domain::ports::mock_runtime::MockRuntime;
use iscan_engine::domain::ports::OutputFrame;
use iscan_engine::{ExecuteScanUseCase, ScanConfig, ScanRequest};
use std::collections::HashMap;
use std::sync::Arc;

/// Scan entrypoint script, matched against exec argv[0] when scripting.
pub const SCAN_COMMAND: &str = "/sysdig-inline-scan.sh";

pub fn scan_config() -> ScanConfig {
    ScanConfig::new("test-token")
}

pub fn scan_request(image: &str) -> ScanRequest {
    ScanRequest::builder(image, scan_config()).build().unwrap()
}

pub fn scan_request_with_env(image: &str, env: HashMap<String, String>) -> ScanRequest {
    ScanRequest::builder(image, scan_config())
        .env(env)
        .build()
        .unwrap()
}

/// Runtime whose scan command emits `stdout` and exits with `exit_code`.
pub fn scripted_runtime(stdout: &str, exit_code: i64) -> MockRuntime {
    let runtime = MockRuntime::new();
    runtime.script_exec(SCAN_COMMAND, vec![OutputFrame::stdout(stdout)], exit_code);
    runtime
}

pub fn use_case(runtime: &MockRuntime) -> ExecuteScanUseCase {
    ExecuteScanUseCase::new(Arc::new(runtime.clone()))
}
