//! iscan — inline container image scan CLI
//! Wires the scan use case to the local docker daemon and maps the verdict
//! onto the process exit code.

mod options;

use clap::Parser;
use iscan_engine::infrastructure::DockerCliRuntime;
use iscan_engine::{ExecuteScan, ExecuteScanUseCase, ScanRequest, ScanVerdict};
use options::Options;
use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::error;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let options = Options::parse();

    let default_level = if options.debug { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match options.scan_config() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            return ExitCode::from(2);
        }
    };

    let env: HashMap<String, String> = std::env::vars().collect();
    let mut builder = ScanRequest::builder(&options.image, config).env(env);
    if let Some(dockerfile) = &options.dockerfile {
        builder = builder.dockerfile(dockerfile);
    }
    let request = match builder.build() {
        Ok(request) => request,
        Err(e) => {
            error!(error = %e, "Invalid scan request");
            return ExitCode::from(2);
        }
    };

    let use_case = ExecuteScanUseCase::new(Arc::new(DockerCliRuntime::new()));
    match use_case.execute(request).await {
        Ok(report) => {
            print_report(&report.report, options.pretty);
            match report.verdict {
                ScanVerdict::Pass | ScanVerdict::PassThrough => ExitCode::SUCCESS,
                ScanVerdict::PolicyFail => ExitCode::from(1),
                // Tool errors never reach here; they surface as Err.
                ScanVerdict::ToolError(_) => ExitCode::from(2),
            }
        }
        Err(e) => {
            error!(error = %e, "Scan failed");
            ExitCode::from(2)
        }
    }
}

/// Print the captured report, optionally re-rendered as pretty JSON. Output
/// that fails to parse as JSON is printed verbatim.
fn print_report(report: &str, pretty: bool) {
    if pretty {
        if let Ok(value) = serde_json::from_str::<serde_json::Value>(report) {
            if let Ok(rendered) = serde_json::to_string_pretty(&value) {
                println!("{}", rendered);
                return;
            }
        }
    }
    println!("{}", report);
}
