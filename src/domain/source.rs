use serde::{Deserialize, Serialize};
use std::fmt;

/// The five input tables, in the order they must be ingested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Stores,
    Products,
    Customers,
    Inventory,
    Transactions,
}

impl SourceKind {
    pub const ALL: [SourceKind; 5] = [
        SourceKind::Stores,
        SourceKind::Products,
        SourceKind::Customers,
        SourceKind::Inventory,
        SourceKind::Transactions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Stores => "stores",
            SourceKind::Products => "products",
            SourceKind::Customers => "customers",
            SourceKind::Inventory => "inventory",
            SourceKind::Transactions => "transactions",
        }
    }

    /// Number of fields on every record line.
    pub fn arity(self) -> usize {
        match self {
            SourceKind::Stores | SourceKind::Customers => 2,
            SourceKind::Products | SourceKind::Inventory => 3,
            SourceKind::Transactions => 4,
        }
    }

    pub fn default_spec(self) -> SourceSpec {
        let (delimiter, header) = match self {
            SourceKind::Stores => ('*', true),
            SourceKind::Products => ('|', false),
            SourceKind::Customers => (',', true),
            SourceKind::Inventory | SourceKind::Transactions => ('|', true),
        };

        SourceSpec {
            file: format!("{}.txt", self.as_str()),
            delimiter,
            header,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a source lives and how its lines are split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSpec {
    pub file: String,
    pub delimiter: char,
    pub header: bool,
}
