use crate::core::{Pipeline, Reports};
use crate::utils::diagnostics::Diagnostics;
use crate::utils::error::Result;

/// Everything one run produced.
#[derive(Debug)]
pub struct RunOutput<M> {
    pub model: M,
    pub reports: Reports,
    pub rendered: String,
    pub diagnostics: Diagnostics,
}

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn run(&self) -> Result<RunOutput<P::Model>> {
        tracing::info!("Starting portal run...");
        let mut diagnostics = Diagnostics::new();

        // Extract
        let model = self.pipeline.extract(&mut diagnostics)?;
        tracing::info!(
            "Ingestion finished with {} warnings and {} stage errors",
            diagnostics.warnings().count(),
            diagnostics.errors().count()
        );

        // Transform
        let reports = self.pipeline.transform(&model)?;
        tracing::info!(
            "Projected {} store rows and {} customer rows",
            reports.stores.len(),
            reports.customers.len()
        );

        // Load
        let rendered = self.pipeline.load(&reports)?;

        Ok(RunOutput {
            model,
            reports,
            rendered,
            diagnostics,
        })
    }
}
