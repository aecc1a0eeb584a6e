use crate::domain::model::{
    Customer, CustomerReportRow, InventoryPolicy, Product, Reports, Store, StoreReportRow,
};
use crate::domain::ports::DiagnosticSink;
use crate::utils::diagnostics::Diagnostic;
use crate::utils::error::{EntityKind, PortalError, Result};
use std::collections::HashMap;

/// Id-keyed arena that remembers insertion order.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    items: Vec<T>,
    index: HashMap<String, usize>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> Registry<T> {
    /// Inserts `item` under `id` unless the id is taken. The first insert wins.
    pub fn insert(&mut self, id: &str, item: T) -> bool {
        if self.index.contains_key(id) {
            return false;
        }
        self.index.insert(id.to_string(), self.items.len());
        self.items.push(item);
        true
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&slot| &self.items[slot])
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.index.get(id).map(|&slot| &mut self.items[slot])
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Owns every store, product and customer of one run.
#[derive(Debug, Clone, Default)]
pub struct Portal {
    stores: Registry<Store>,
    products: Registry<Product>,
    customers: Registry<Customer>,
    inventory_policy: InventoryPolicy,
}

impl Portal {
    pub fn new(inventory_policy: InventoryPolicy) -> Self {
        Self {
            inventory_policy,
            ..Self::default()
        }
    }

    pub fn stores(&self) -> &Registry<Store> {
        &self.stores
    }

    pub fn products(&self) -> &Registry<Product> {
        &self.products
    }

    pub fn customers(&self) -> &Registry<Customer> {
        &self.customers
    }

    pub fn store(&self, id: &str) -> Option<&Store> {
        self.stores.get(id)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.get(id)
    }

    pub fn add_store(&mut self, id: &str, name: &str, diagnostics: &mut dyn DiagnosticSink) -> bool {
        let added = self.stores.insert(id, Store::new(id, name));
        if !added {
            diagnostics.report(Diagnostic::DuplicateStore { id: id.to_string() });
        }
        added
    }

    /// Duplicate product ids are dropped without a diagnostic.
    pub fn add_product(&mut self, id: &str, name: &str) -> bool {
        let added = self.products.insert(id, Product::new(id, name));
        if !added {
            tracing::debug!("Skipping duplicate product id {}", id);
        }
        added
    }

    pub fn add_customer(
        &mut self,
        id: &str,
        name: &str,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> bool {
        let added = self.customers.insert(id, Customer::new(id, name));
        if !added {
            diagnostics.report(Diagnostic::DuplicateCustomer { id: id.to_string() });
        }
        added
    }

    /// Applies one inventory listing: the product learns its initial quantity
    /// at the store and the store stocks the product by name.
    pub fn stock(
        &mut self,
        store_id: &str,
        product_id: &str,
        quantity: u32,
        diagnostics: &mut dyn DiagnosticSink,
    ) -> Result<()> {
        let product = self
            .products
            .get_mut(product_id)
            .ok_or_else(|| PortalError::unknown(EntityKind::Product, product_id))?;
        let store = self
            .stores
            .get_mut(store_id)
            .ok_or_else(|| PortalError::unknown(EntityKind::Store, store_id))?;

        if !product.set_initial_inventory(store_id, quantity, self.inventory_policy) {
            diagnostics.report(Diagnostic::DuplicateListing {
                product_id: product_id.to_string(),
                store_id: store_id.to_string(),
            });
        }

        if !store.add_product(product.name(), quantity) {
            diagnostics.report(Diagnostic::DuplicateProduct {
                store: store_id.to_string(),
                product: product.name().to_string(),
            });
        }

        Ok(())
    }

    /// Applies one transaction and returns the quantity actually sold, or
    /// `None` when the store is out of the product.
    ///
    /// The product, store and stock are resolved first; an out-of-stock sale
    /// is skipped before the customer is looked up. Nothing is mutated until
    /// every lookup has succeeded.
    pub fn apply_transaction(
        &mut self,
        customer_id: &str,
        product_id: &str,
        store_id: &str,
        quantity: u32,
    ) -> Result<Option<u32>> {
        let product_name = self
            .products
            .get(product_id)
            .ok_or_else(|| PortalError::unknown(EntityKind::Product, product_id))?
            .name();
        let store = self
            .stores
            .get_mut(store_id)
            .ok_or_else(|| PortalError::unknown(EntityKind::Store, store_id))?;
        let stock = store
            .query_stock(product_name)
            .ok_or_else(|| PortalError::unknown(EntityKind::StockedProduct, product_name))?;

        if stock == 0 {
            tracing::debug!(
                "{} is out of {}, skipping purchase by {}",
                store.name(),
                product_name,
                customer_id
            );
            return Ok(None);
        }

        let customer = self
            .customers
            .get_mut(customer_id)
            .ok_or_else(|| PortalError::unknown(EntityKind::Customer, customer_id))?;

        let actual = quantity.min(stock);
        customer.add_purchase(store_id, product_name, actual);
        let sold = store.add_sale(customer.name(), product_name, quantity)?;
        debug_assert_eq!(sold, Some(actual));

        Ok(Some(actual))
    }

    pub fn store_report(&self) -> Vec<StoreReportRow> {
        self.stores
            .iter()
            .flat_map(|store| store.report_rows())
            .collect()
    }

    pub fn customer_report(&self) -> Vec<CustomerReportRow> {
        self.customers
            .iter()
            .flat_map(|customer| customer.report_rows())
            .collect()
    }

    pub fn reports(&self) -> Reports {
        Reports {
            stores: self.store_report(),
            customers: self.customer_report(),
        }
    }
}
