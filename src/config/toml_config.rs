use crate::domain::model::InventoryPolicy;
use crate::domain::ports::ConfigProvider;
use crate::domain::source::{SourceKind, SourceSpec};
use crate::utils::error::Result;
use crate::utils::validation::{validate_delimiter, validate_path, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Source layout and ingestion switches, usually read from a TOML file.
///
/// Every key is optional. Missing keys fall back to the default layout
/// (`stores.txt` split on `*`, `products.txt` on `|` without a header, and
/// so on).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PortalConfig {
    pub sources: SourcesConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    pub stores: SourceOverride,
    pub products: SourceOverride,
    pub customers: SourceOverride,
    pub inventory: SourceOverride,
    pub transactions: SourceOverride,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceOverride {
    pub file: Option<String>,
    pub delimiter: Option<String>,
    pub header: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IngestConfig {
    pub inventory_policy: InventoryPolicy,
    pub strict: bool,
}

impl PortalConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::parse(&content)?;
        tracing::debug!("Loaded portal config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: PortalConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.ingest.strict = strict;
        self
    }

    pub fn with_inventory_policy(mut self, policy: InventoryPolicy) -> Self {
        self.ingest.inventory_policy = policy;
        self
    }

    fn source_override(&self, kind: SourceKind) -> &SourceOverride {
        match kind {
            SourceKind::Stores => &self.sources.stores,
            SourceKind::Products => &self.sources.products,
            SourceKind::Customers => &self.sources.customers,
            SourceKind::Inventory => &self.sources.inventory,
            SourceKind::Transactions => &self.sources.transactions,
        }
    }
}

impl ConfigProvider for PortalConfig {
    fn source(&self, kind: SourceKind) -> SourceSpec {
        let mut spec = kind.default_spec();
        let overrides = self.source_override(kind);

        if let Some(file) = &overrides.file {
            spec.file = file.clone();
        }
        if let Some(delimiter) = overrides.delimiter.as_deref().and_then(|d| d.chars().next()) {
            spec.delimiter = delimiter;
        }
        if let Some(header) = overrides.header {
            spec.header = header;
        }

        spec
    }

    fn inventory_policy(&self) -> InventoryPolicy {
        self.ingest.inventory_policy
    }

    fn strict(&self) -> bool {
        self.ingest.strict
    }
}

impl Validate for PortalConfig {
    fn validate(&self) -> Result<()> {
        for kind in SourceKind::ALL {
            let overrides = self.source_override(kind);

            if let Some(file) = &overrides.file {
                validate_path(&format!("sources.{}.file", kind), file)?;
            }
            if let Some(delimiter) = &overrides.delimiter {
                validate_delimiter(&format!("sources.{}.delimiter", kind), delimiter)?;
            }
        }
        Ok(())
    }
}
