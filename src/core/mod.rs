pub mod etl;
pub mod ingest;
pub mod pipeline;
pub mod portal;
pub mod reader;
pub mod report;

pub use crate::domain::model::Reports;
pub use crate::domain::ports::{ConfigProvider, DiagnosticSink, Pipeline, Storage};
pub use crate::utils::error::Result;
