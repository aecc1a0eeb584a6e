use crate::domain::ports::DiagnosticSink;
use crate::domain::source::SourceKind;
use std::fmt;

/// Non-fatal findings raised while building a portal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    DuplicateStore { id: String },
    DuplicateCustomer { id: String },
    /// A store was stocked twice with the same product name.
    DuplicateProduct { store: String, product: String },
    /// A product was listed twice for the same store in the inventory source.
    DuplicateListing { product_id: String, store_id: String },
    /// A stage stopped early. The message is the error that stopped it.
    StageAborted { stage: SourceKind, message: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateStore { id } | Diagnostic::DuplicateCustomer { id } => {
                write!(f, "id {} already read from file", id)
            }
            Diagnostic::DuplicateProduct { product, .. } => {
                write!(f, "product {} already exists!", product)
            }
            Diagnostic::DuplicateListing {
                product_id,
                store_id,
            } => write!(
                f,
                "product {} is already listed under store {}.",
                product_id, store_id
            ),
            Diagnostic::StageAborted { stage, message } => {
                write!(f, "{} stage stopped: {}", stage, message)
            }
        }
    }
}

impl Diagnostic {
    pub fn is_error(&self) -> bool {
        matches!(self, Diagnostic::StageAborted { .. })
    }
}

/// Collects diagnostics in order and mirrors each one to the log.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| !d.is_error())
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(|d| d.is_error())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            tracing::error!("{}", diagnostic);
        } else {
            tracing::warn!("Warning: {}", diagnostic);
        }
        self.entries.push(diagnostic);
    }
}
