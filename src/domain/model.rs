use crate::utils::error::{EntityKind, PortalError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One sale of a product by a store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleEntry {
    pub customer: String,
    pub quantity: u32,
}

/// One purchase of a product by a customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PurchaseEntry {
    pub store_id: String,
    pub quantity: u32,
}

/// Append-only history of entries grouped by product name.
///
/// Products keep the order in which they were first recorded, and entries
/// within a product keep arrival order. Entries are never merged, so a
/// customer buying the same product twice yields two entries.
#[derive(Debug, Clone)]
pub struct Ledger<E> {
    products: Vec<String>,
    index: HashMap<String, usize>,
    entries: Vec<Vec<E>>,
}

impl<E> Default for Ledger<E> {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }
}

impl<E> Ledger<E> {
    pub fn append(&mut self, product: &str, entry: E) {
        let slot = match self.index.get(product) {
            Some(&slot) => slot,
            None => {
                self.products.push(product.to_string());
                self.entries.push(Vec::new());
                let slot = self.entries.len() - 1;
                self.index.insert(product.to_string(), slot);
                slot
            }
        };
        self.entries[slot].push(entry);
    }

    pub fn entries_for(&self, product: &str) -> &[E] {
        self.index
            .get(product)
            .map(|&slot| self.entries[slot].as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[E])> {
        self.products
            .iter()
            .zip(self.entries.iter())
            .map(|(product, entries)| (product.as_str(), entries.as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }
}

/// How a product's per-store inventory map is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum InventoryPolicy {
    /// Every store keeps its own initial quantity.
    #[default]
    PerStore,
    /// A new store listing replaces the whole map. Matches the legacy portal.
    Replace,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreReportRow {
    pub store: String,
    pub product: String,
    pub customers: Vec<String>,
    pub quantity_sold: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerReportRow {
    pub customer: String,
    pub product: String,
    pub quantity_purchased: u64,
}

/// Both report projections of one portal, in registry order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reports {
    pub stores: Vec<StoreReportRow>,
    pub customers: Vec<CustomerReportRow>,
}

#[derive(Debug, Clone)]
pub struct Store {
    id: String,
    name: String,
    products: HashMap<String, u32>,
    sales: Ledger<SaleEntry>,
}

impl Store {
    pub const REPORT_HEADERS: [&'static str; 4] =
        ["Store", "Product", "Customers", "Quantity Sold"];

    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            products: HashMap::new(),
            sales: Ledger::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stocks a product. Returns `false` and leaves the stock untouched when
    /// the store already carries a product with this name.
    pub fn add_product(&mut self, product: &str, quantity: u32) -> bool {
        if self.products.contains_key(product) {
            return false;
        }
        self.products.insert(product.to_string(), quantity);
        true
    }

    pub fn query_stock(&self, product: &str) -> Option<u32> {
        self.products.get(product).copied()
    }

    /// Sells up to `quantity` units and returns how many were sold.
    ///
    /// Returns `Ok(None)` without recording anything when the product is out
    /// of stock. A request larger than the stock sells the remaining stock.
    pub fn add_sale(&mut self, customer: &str, product: &str, quantity: u32) -> Result<Option<u32>> {
        let stock = self
            .products
            .get_mut(product)
            .ok_or_else(|| PortalError::unknown(EntityKind::StockedProduct, product))?;

        if *stock == 0 {
            return Ok(None);
        }

        let sold = quantity.min(*stock);
        *stock -= sold;

        self.sales.append(
            product,
            SaleEntry {
                customer: customer.to_string(),
                quantity: sold,
            },
        );
        Ok(Some(sold))
    }

    pub fn sales(&self) -> &Ledger<SaleEntry> {
        &self.sales
    }

    pub fn report_rows(&self) -> impl Iterator<Item = StoreReportRow> + '_ {
        self.sales.iter().map(move |(product, entries)| {
            let mut customers: Vec<String> = Vec::new();
            for entry in entries {
                if !customers.contains(&entry.customer) {
                    customers.push(entry.customer.clone());
                }
            }
            customers.sort();

            StoreReportRow {
                store: self.name.clone(),
                product: product.to_string(),
                customers,
                quantity_sold: entries.iter().map(|e| u64::from(e.quantity)).sum(),
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct Product {
    id: String,
    name: String,
    inventory: HashMap<String, u32>,
}

impl Product {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            inventory: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records the initial quantity listed for a store. The first listing
    /// per store wins; a repeat returns `false` without changing anything.
    pub fn set_initial_inventory(
        &mut self,
        store_id: &str,
        quantity: u32,
        policy: InventoryPolicy,
    ) -> bool {
        if self.inventory.contains_key(store_id) {
            return false;
        }

        if policy == InventoryPolicy::Replace {
            self.inventory.clear();
        }
        self.inventory.insert(store_id.to_string(), quantity);
        true
    }

    pub fn initial_inventory(&self, store_id: &str) -> Option<u32> {
        self.inventory.get(store_id).copied()
    }
}

#[derive(Debug, Clone)]
pub struct Customer {
    id: String,
    name: String,
    purchases: Ledger<PurchaseEntry>,
}

impl Customer {
    pub const REPORT_HEADERS: [&'static str; 3] = ["Customer Name", "Product", "Quantity Purchased"];

    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            purchases: Ledger::default(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn add_purchase(&mut self, store_id: &str, product: &str, quantity: u32) {
        self.purchases.append(
            product,
            PurchaseEntry {
                store_id: store_id.to_string(),
                quantity,
            },
        );
    }

    pub fn purchases(&self) -> &Ledger<PurchaseEntry> {
        &self.purchases
    }

    pub fn report_rows(&self) -> impl Iterator<Item = CustomerReportRow> + '_ {
        self.purchases
            .iter()
            .map(move |(product, entries)| CustomerReportRow {
                customer: self.name.clone(),
                product: product.to_string(),
                quantity_purchased: entries.iter().map(|e| u64::from(e.quantity)).sum(),
            })
    }
}
