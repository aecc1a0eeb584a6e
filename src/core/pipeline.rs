use crate::config::cli::LocalStorage;
use crate::core::ingest::{ingest, IngestSummary};
use crate::core::portal::Portal;
use crate::core::report::{render, ReportFormat};
use crate::core::{ConfigProvider, DiagnosticSink, Pipeline, Reports, Storage};
use crate::utils::error::Result;

/// Reads a portal from `storage`, projects both reports and renders them.
pub struct PortalPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    format: ReportFormat,
    export: Option<LocalStorage>,
}

impl<S: Storage, C: ConfigProvider> PortalPipeline<S, C> {
    pub fn new(storage: S, config: C, format: ReportFormat) -> Self {
        Self {
            storage,
            config,
            format,
            export: None,
        }
    }

    /// Also writes `store_report.<ext>` and `customer_report.<ext>` here.
    pub fn with_export(mut self, export: LocalStorage) -> Self {
        self.export = Some(export);
        self
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for PortalPipeline<S, C> {
    type Model = (Portal, IngestSummary);

    fn extract(&self, diagnostics: &mut dyn DiagnosticSink) -> Result<Self::Model> {
        ingest(&self.storage, &self.config, diagnostics)
    }

    fn transform(&self, model: &Self::Model) -> Result<Reports> {
        let (portal, _) = model;
        Ok(portal.reports())
    }

    fn load(&self, reports: &Reports) -> Result<String> {
        let rendered = render(reports, self.format)?;

        if let Some(export) = &self.export {
            export.write_file(&rendered.store_file_name(), rendered.stores.as_bytes())?;
            export.write_file(&rendered.customer_file_name(), rendered.customers.as_bytes())?;
            tracing::info!("📁 Reports written to {}", export.base_path().display());
        }

        let mut output = rendered.stores;
        if self.format != ReportFormat::Json && !output.ends_with('\n') {
            output.push('\n');
        }
        output.push('\n');
        output.push_str(&rendered.customers);
        Ok(output)
    }
}
