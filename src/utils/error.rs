use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PortalError {
    #[error("Can't open {}: {source}", path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{source_name} has {actual} fields on line {line} but expected {expected}")]
    FieldCountMismatch {
        source_name: String,
        line: usize,
        actual: usize,
        expected: usize,
    },

    #[error("{source_name} has invalid quantity '{value}' on line {line}")]
    InvalidQuantity {
        source_name: String,
        line: usize,
        value: String,
    },

    #[error("Unknown {kind} id '{id}'")]
    UnknownReference { kind: EntityKind, id: String },

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

/// Entity registries a record can point into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Store,
    Product,
    Customer,
    /// A product name that a store has never stocked.
    StockedProduct,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Store => "store",
            EntityKind::Product => "product",
            EntityKind::Customer => "customer",
            EntityKind::StockedProduct => "stocked product",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PortalError {
    pub fn unknown(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::UnknownReference {
            kind,
            id: id.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PortalError::SourceUnavailable { .. } => ErrorSeverity::Low,
            PortalError::FieldCountMismatch { .. } | PortalError::InvalidQuantity { .. } => {
                ErrorSeverity::Medium
            }
            PortalError::UnknownReference { .. } => ErrorSeverity::High,
            PortalError::ConfigError { .. }
            | PortalError::InvalidConfigValueError { .. }
            | PortalError::ValidationError { .. }
            | PortalError::TomlError(_) => ErrorSeverity::High,
            PortalError::CsvError(_)
            | PortalError::IoError(_)
            | PortalError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    /// Errors that end one ingestion stage without ending the run.
    pub fn is_stage_local(&self) -> bool {
        matches!(
            self,
            PortalError::SourceUnavailable { .. }
                | PortalError::FieldCountMismatch { .. }
                | PortalError::InvalidQuantity { .. }
                | PortalError::UnknownReference { .. }
                | PortalError::IoError(_)
        )
    }

    /// Process exit status for a failed run: 3 for critical failures, 2 for
    /// a stage error surfaced by strict mode, 1 for anything else.
    pub fn exit_code(&self) -> i32 {
        if self.severity() == ErrorSeverity::Critical {
            3
        } else if self.is_stage_local() {
            2
        } else {
            1
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PortalError::SourceUnavailable { path, .. } => {
                format!("Could not read {}, it was skipped", path.display())
            }
            PortalError::FieldCountMismatch { .. } | PortalError::InvalidQuantity { .. } => {
                format!("Malformed input: {}", self)
            }
            PortalError::UnknownReference { kind, id } => {
                format!("A record refers to {} '{}' which was never defined", kind, id)
            }
            PortalError::ConfigError { .. }
            | PortalError::InvalidConfigValueError { .. }
            | PortalError::ValidationError { .. }
            | PortalError::TomlError(_) => format!("Configuration problem: {}", self),
            _ => self.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PortalError>;
