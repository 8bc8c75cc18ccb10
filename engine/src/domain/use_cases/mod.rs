pub mod execute_scan;

pub use execute_scan::{ExecuteScan, ExecuteScanUseCase, ScanReport};
