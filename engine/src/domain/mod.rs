pub mod constants;
pub mod entities;
pub mod error;
pub mod ports;
pub mod services;
pub mod use_cases;
pub mod value_objects;

pub use entities::ScanRequest;
pub use error::{DomainError, Result};
pub use use_cases::{ExecuteScan, ExecuteScanUseCase, ScanReport};
pub use value_objects::{ScanConfig, ScanId, ScanVerdict};
