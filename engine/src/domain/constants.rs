//! Fixed protocol surface shared with the inline-scan container image
//! Paths, commands and variable names here are contractual; changing them
//! breaks compatibility with the scan tool.

use std::time::Duration;

/// Entrypoint that keeps the scan container alive without starting a scan.
pub const DUMMY_ENTRYPOINT: &str = "cat";

/// Log directory the scan tool writes its progress log into.
pub const SCAN_LOG_DIR: &str = "/tmp/sysdig-inline-scan/logs";
/// Progress log file followed by the background tail.
pub const SCAN_LOG_FILE: &str = "/tmp/sysdig-inline-scan/logs/info.log";

/// In-container directory a supplied Dockerfile is copied into.
pub const DOCKERFILE_MOUNTPOINT: &str = "/tmp/";

/// Scan entrypoint script inside the scan image.
pub const SCAN_COMMAND: &str = "/sysdig-inline-scan.sh";
/// Flags always passed to the scan command.
pub const SCAN_ARGS: [&str; 2] = ["--storage-type=docker-daemon", "--format=JSON"];
pub const VERBOSE_ARG: &str = "--verbose";
pub const SKIP_TLS_ARG: &str = "--sysdig-skip-tls";
pub const ON_PREM_ARG: &str = "--on-prem";

/// SaaS backend URL; anything else is treated as an on-prem engine.
pub const DEFAULT_ENGINE_URL: &str = "https://secure.sysdig.com";
/// Scan container image used when the caller does not override it.
pub const DEFAULT_SCAN_IMAGE: &str = "quay.io/sysdig/secure-inline-scan:2";

/// Environment variable that overrides the configured scan image.
pub const SCAN_IMAGE_OVERRIDE_VAR: &str = "SYSDIG_OVERRIDE_INLINE_SCAN_IMAGE";
/// Marker identifying the scan as driven by CI automation.
pub const ADDED_BY_ENV: &str = "SYSDIG_ADDED_BY=cicd-inline-scan";
pub const API_TOKEN_VAR: &str = "SYSDIG_API_TOKEN";

/// Host docker socket, bind-mounted 1:1 so the scan tool can inspect images.
pub const DOCKER_SOCKET_MOUNT: &str = "/var/run/docker.sock:/var/run/docker.sock";

pub const MKDIR_COMMAND: [&str; 3] = ["mkdir", "-p", SCAN_LOG_DIR];
pub const TOUCH_COMMAND: [&str; 2] = ["touch", SCAN_LOG_FILE];
/// Tail polls because it is started before the log file exists.
pub const TAIL_COMMAND: [&str; 4] = ["tail", "--sleep-interval=0.2", "-f", SCAN_LOG_FILE];

/// Grace period handed to the runtime when stopping the scan container.
pub const STOP_GRACE_SECONDS: u32 = 1;
/// Upper bound on waiting for the background tail to acknowledge termination.
pub const TAIL_DRAIN_TIMEOUT: Duration = Duration::from_millis(60_000);
