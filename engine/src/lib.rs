pub mod domain;
pub mod infrastructure;

pub use domain::{
    DomainError, ExecuteScan, ExecuteScanUseCase, Result, ScanConfig, ScanId, ScanReport,
    ScanRequest, ScanVerdict,
};
