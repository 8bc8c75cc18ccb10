pub mod output_router;
pub mod proxy_env;
pub mod scan_command;

pub use output_router::{spawn_info_consumer, spawn_scan_consumer, OutputRouter, ScanOutputBuffers};
pub use proxy_env::proxy_environment;
pub use scan_command::{build_container_env, build_scan_args, resolve_scan_image};
