pub mod scan_config;
pub mod scan_id;
pub mod scan_verdict;

pub use scan_config::ScanConfig;
pub use scan_id::ScanId;
pub use scan_verdict::ScanVerdict;
