use crate::domain::model::{InventoryPolicy, Reports};
use crate::domain::source::{SourceKind, SourceSpec};
use crate::utils::diagnostics::Diagnostic;
use crate::utils::error::Result;
use std::io::BufRead;

pub trait Storage {
    /// Opens a source for line reading. A missing or unreadable source is
    /// reported as `PortalError::SourceUnavailable`.
    fn open(&self, path: &str) -> Result<Box<dyn BufRead>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    /// Human readable location of `path`, used in messages.
    fn describe(&self, path: &str) -> String {
        path.to_string()
    }
}

pub trait ConfigProvider {
    fn source(&self, kind: SourceKind) -> SourceSpec;
    fn inventory_policy(&self) -> InventoryPolicy;
    fn strict(&self) -> bool;
}

pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

pub trait Pipeline {
    type Model;

    fn extract(&self, diagnostics: &mut dyn DiagnosticSink) -> Result<Self::Model>;
    fn transform(&self, model: &Self::Model) -> Result<Reports>;
    fn load(&self, reports: &Reports) -> Result<String>;
}
