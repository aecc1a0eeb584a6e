pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::{cli::LocalStorage, PortalConfig};

pub use crate::core::{
    etl::EtlEngine,
    ingest::{ingest, IngestSummary, StageOutcome},
    pipeline::PortalPipeline,
    portal::Portal,
    reader::{FileReader, Record},
    report::ReportFormat,
};
pub use crate::domain::model::{CustomerReportRow, InventoryPolicy, Reports, StoreReportRow};
pub use crate::utils::diagnostics::{Diagnostic, Diagnostics};
pub use crate::utils::error::{PortalError, Result};
