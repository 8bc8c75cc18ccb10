pub mod config;
pub mod docker_cli_runtime;

pub use config::load_scan_config;
pub use docker_cli_runtime::DockerCliRuntime;
