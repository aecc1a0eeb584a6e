//! Builds a [`Portal`] from the five sources.
//!
//! Stages run strictly in [`SourceKind::ALL`] order and each one consumes a
//! single source through [`FileReader`]. An error ends only the stage that
//! raised it unless the configuration asks for strict ingestion.

use crate::core::portal::Portal;
use crate::core::reader::{FileReader, Record};
use crate::domain::ports::{ConfigProvider, DiagnosticSink, Storage};
use crate::domain::source::SourceKind;
use crate::utils::diagnostics::Diagnostic;
use crate::utils::error::{PortalError, Result};

/// What happened to one stage.
#[derive(Debug)]
pub struct StageOutcome {
    pub stage: SourceKind,
    /// Records applied before the stage finished or stopped.
    pub records: usize,
    pub error: Option<PortalError>,
}

impl StageOutcome {
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct IngestSummary {
    pub stages: Vec<StageOutcome>,
}

impl IngestSummary {
    pub fn stage(&self, kind: SourceKind) -> Option<&StageOutcome> {
        self.stages.iter().find(|outcome| outcome.stage == kind)
    }

    pub fn failed_stages(&self) -> impl Iterator<Item = &StageOutcome> {
        self.stages.iter().filter(|outcome| !outcome.is_complete())
    }

    pub fn is_clean(&self) -> bool {
        self.failed_stages().next().is_none()
    }
}

pub struct Ingestor<'a, S: Storage + ?Sized, C: ConfigProvider + ?Sized> {
    storage: &'a S,
    config: &'a C,
}

impl<'a, S: Storage + ?Sized, C: ConfigProvider + ?Sized> Ingestor<'a, S, C> {
    pub fn new(storage: &'a S, config: &'a C) -> Self {
        Self { storage, config }
    }

    pub fn run(&self, diagnostics: &mut dyn DiagnosticSink) -> Result<(Portal, IngestSummary)> {
        let mut portal = Portal::new(self.config.inventory_policy());
        let mut summary = IngestSummary::default();

        for kind in SourceKind::ALL {
            let mut outcome = match kind {
                SourceKind::Stores => self.stage(kind, &mut portal, diagnostics, apply_store),
                SourceKind::Products => self.stage(kind, &mut portal, diagnostics, apply_product),
                SourceKind::Customers => {
                    self.stage(kind, &mut portal, diagnostics, apply_customer)
                }
                SourceKind::Inventory => {
                    self.stage(kind, &mut portal, diagnostics, apply_inventory)
                }
                SourceKind::Transactions => {
                    self.stage(kind, &mut portal, diagnostics, apply_transaction)
                }
            };

            if let Some(err) = &outcome.error {
                tracing::error!(
                    "❌ {} stage stopped after {} records: {}",
                    kind,
                    outcome.records,
                    err
                );
                diagnostics.report(Diagnostic::StageAborted {
                    stage: kind,
                    message: err.to_string(),
                });

                if self.config.strict() {
                    if let Some(err) = outcome.error.take() {
                        return Err(err);
                    }
                }
            } else {
                tracing::info!("Read {} {} records", outcome.records, kind);
            }

            summary.stages.push(outcome);
        }

        Ok((portal, summary))
    }

    fn stage<const N: usize>(
        &self,
        kind: SourceKind,
        portal: &mut Portal,
        diagnostics: &mut dyn DiagnosticSink,
        mut apply: impl FnMut(&mut Portal, &str, Record<N>, &mut dyn DiagnosticSink) -> Result<()>,
    ) -> StageOutcome {
        debug_assert_eq!(kind.arity(), N);

        let spec = self.config.source(kind);
        let source_name = self.storage.describe(&spec.file);
        tracing::debug!("Reading {} from {}", kind, source_name);

        let reader = match self.storage.open(&spec.file) {
            Ok(reader) => reader,
            Err(err) => {
                return StageOutcome {
                    stage: kind,
                    records: 0,
                    error: Some(err),
                }
            }
        };

        let mut records = 0;
        let mut error = None;
        let lines =
            FileReader::<_, N>::new(source_name.as_str(), reader, spec.delimiter, spec.header);

        for record in lines {
            match record.and_then(|record| apply(portal, &source_name, record, diagnostics)) {
                Ok(()) => records += 1,
                Err(err) => {
                    error = Some(err);
                    break;
                }
            }
        }

        StageOutcome {
            stage: kind,
            records,
            error,
        }
    }
}

fn apply_store(
    portal: &mut Portal,
    _source: &str,
    record: Record<2>,
    diagnostics: &mut dyn DiagnosticSink,
) -> Result<()> {
    let [id, name] = record.fields;
    portal.add_store(&id, &name, diagnostics);
    Ok(())
}

/// The store column of the products source is not used.
fn apply_product(
    portal: &mut Portal,
    _source: &str,
    record: Record<3>,
    _diagnostics: &mut dyn DiagnosticSink,
) -> Result<()> {
    let [id, _store_id, name] = record.fields;
    portal.add_product(&id, &name);
    Ok(())
}

fn apply_customer(
    portal: &mut Portal,
    _source: &str,
    record: Record<2>,
    diagnostics: &mut dyn DiagnosticSink,
) -> Result<()> {
    let [id, name] = record.fields;
    portal.add_customer(&id, &name, diagnostics);
    Ok(())
}

fn apply_inventory(
    portal: &mut Portal,
    source: &str,
    record: Record<3>,
    diagnostics: &mut dyn DiagnosticSink,
) -> Result<()> {
    let line = record.line;
    let [store_id, quantity, product_id] = record.fields;
    let quantity = parse_quantity(source, line, &quantity)?;
    portal.stock(&store_id, &product_id, quantity, diagnostics)
}

fn apply_transaction(
    portal: &mut Portal,
    source: &str,
    record: Record<4>,
    _diagnostics: &mut dyn DiagnosticSink,
) -> Result<()> {
    let line = record.line;
    let [customer_id, quantity, product_id, store_id] = record.fields;
    let quantity = parse_quantity(source, line, &quantity)?;
    if portal
        .apply_transaction(&customer_id, &product_id, &store_id, quantity)?
        .is_none()
    {
        tracing::debug!("{} line {}: out of stock, nothing sold", source, line);
    }
    Ok(())
}

fn parse_quantity(source: &str, line: usize, value: &str) -> Result<u32> {
    value.parse::<u32>().map_err(|_| PortalError::InvalidQuantity {
        source_name: source.to_string(),
        line,
        value: value.to_string(),
    })
}

/// Reads all five sources from `storage` into a new portal.
pub fn ingest<S, C>(
    storage: &S,
    config: &C,
    diagnostics: &mut dyn DiagnosticSink,
) -> Result<(Portal, IngestSummary)>
where
    S: Storage + ?Sized,
    C: ConfigProvider + ?Sized,
{
    Ingestor::new(storage, config).run(diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PortalConfig;
    use crate::domain::model::{CustomerReportRow, InventoryPolicy, StoreReportRow};
    use crate::utils::diagnostics::Diagnostics;
    use std::collections::HashMap;
    use std::io::{BufRead, Cursor};

    #[derive(Default)]
    struct MockStorage {
        files: HashMap<String, String>,
    }

    impl MockStorage {
        fn with(mut self, path: &str, content: &str) -> Self {
            self.files.insert(path.to_string(), content.to_string());
            self
        }
    }

    impl Storage for MockStorage {
        fn open(&self, path: &str) -> Result<Box<dyn BufRead>> {
            match self.files.get(path) {
                Some(content) => Ok(Box::new(Cursor::new(content.clone().into_bytes()))),
                None => Err(PortalError::SourceUnavailable {
                    path: path.into(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
                }),
            }
        }

        fn write_file(&self, _path: &str, _data: &[u8]) -> Result<()> {
            Ok(())
        }
    }

    fn donut_storage() -> MockStorage {
        MockStorage::default()
            .with("stores.txt", "id*name\ns1*Dunkin Donuts\ns2*Valve Productions\n")
            .with(
                "products.txt",
                "p1|s1|Chocolate Donuts\np2|s1|Coffee\np3|s2|Dota 2\n",
            )
            .with(
                "customers.txt",
                "id,name\nc1,Architect Armin\nc2,Hacker Rohan\nc3,Pilot Dave\n",
            )
            .with(
                "inventory.txt",
                "store|quantity|product\ns1|10|p1\ns1|3|p2\ns2|100|p3\n",
            )
            .with(
                "transactions.txt",
                "customer|quantity|product|store\nc1|10|p1|s1\nc2|3|p2|s1\nc3|100|p3|s2\n",
            )
    }

    fn run(storage: &MockStorage, config: &PortalConfig) -> (Portal, IngestSummary, Diagnostics) {
        let mut diagnostics = Diagnostics::new();
        let (portal, summary) = ingest(storage, config, &mut diagnostics).unwrap();
        (portal, summary, diagnostics)
    }

    #[test]
    fn test_full_ingest_produces_both_reports() {
        let (portal, summary, diagnostics) = run(&donut_storage(), &PortalConfig::default());

        assert!(summary.is_clean());
        assert!(diagnostics.is_empty());
        assert_eq!(summary.stage(SourceKind::Transactions).unwrap().records, 3);
        assert_eq!(
            portal.store_report(),
            vec![
                StoreReportRow {
                    store: "Dunkin Donuts".to_string(),
                    product: "Chocolate Donuts".to_string(),
                    customers: vec!["Architect Armin".to_string()],
                    quantity_sold: 10,
                },
                StoreReportRow {
                    store: "Dunkin Donuts".to_string(),
                    product: "Coffee".to_string(),
                    customers: vec!["Hacker Rohan".to_string()],
                    quantity_sold: 3,
                },
                StoreReportRow {
                    store: "Valve Productions".to_string(),
                    product: "Dota 2".to_string(),
                    customers: vec!["Pilot Dave".to_string()],
                    quantity_sold: 100,
                },
            ]
        );
        assert_eq!(
            portal.customer_report()[0],
            CustomerReportRow {
                customer: "Architect Armin".to_string(),
                product: "Chocolate Donuts".to_string(),
                quantity_purchased: 10,
            }
        );
    }

    #[test]
    fn test_missing_source_does_not_stop_later_stages() {
        let mut storage = donut_storage();
        storage.files.remove("customers.txt");

        let (portal, summary, diagnostics) = run(&storage, &PortalConfig::default());

        assert!(matches!(
            summary.stage(SourceKind::Customers).unwrap().error,
            Some(PortalError::SourceUnavailable { .. })
        ));
        assert_eq!(summary.stage(SourceKind::Inventory).unwrap().records, 3);
        assert!(portal.customers().is_empty());
        // Every transaction names an unknown customer, so the first one stops the stage.
        assert_eq!(summary.stage(SourceKind::Transactions).unwrap().records, 0);
        assert_eq!(diagnostics.errors().count(), 2);
        assert_eq!(
            portal.store("s1").unwrap().query_stock("Chocolate Donuts"),
            Some(10)
        );
    }

    #[test]
    fn test_field_count_mismatch_keeps_earlier_records() {
        let storage = donut_storage().with(
            "customers.txt",
            "id,name\nc1,Architect Armin\nc2,Hacker, Rohan\nc3,Pilot Dave\n",
        );

        let (portal, summary, _) = run(&storage, &PortalConfig::default());

        let customers = summary.stage(SourceKind::Customers).unwrap();
        assert_eq!(customers.records, 1);
        assert!(matches!(
            customers.error,
            Some(PortalError::FieldCountMismatch {
                line: 2,
                actual: 3,
                expected: 2,
                ..
            })
        ));
        assert_eq!(portal.customers().len(), 1);
        assert!(summary.stage(SourceKind::Transactions).unwrap().error.is_some());
        assert_eq!(portal.customer_report().len(), 1);
    }

    #[test]
    fn test_quoted_customer_name_loses_comma() {
        let storage = donut_storage().with(
            "customers.txt",
            "id,name\nc1,\"Armin, Architect\"\nc2,Hacker Rohan\nc3,Pilot Dave\n",
        );

        let (portal, summary, _) = run(&storage, &PortalConfig::default());

        assert!(summary.is_clean());
        assert_eq!(portal.customer("c1").unwrap().name(), "Armin Architect");
    }

    #[test]
    fn test_invalid_quantity_stops_inventory_stage() {
        let storage = donut_storage().with(
            "inventory.txt",
            "store|quantity|product\ns1|10|p1\ns1|three|p2\ns2|100|p3\n",
        );

        let (portal, summary, _) = run(&storage, &PortalConfig::default());

        assert!(matches!(
            summary.stage(SourceKind::Inventory).unwrap().error,
            Some(PortalError::InvalidQuantity { line: 2, .. })
        ));
        assert_eq!(
            portal.store("s1").unwrap().query_stock("Chocolate Donuts"),
            Some(0)
        );
        // c2 asks for Coffee, which s1 never stocked.
        assert_eq!(summary.stage(SourceKind::Transactions).unwrap().records, 1);
    }

    #[test]
    fn test_duplicate_store_warns_and_keeps_first() {
        let storage = donut_storage().with(
            "stores.txt",
            "id*name\ns1*Dunkin Donuts\ns1*Krispy Kreme\ns2*Valve Productions\n",
        );

        let (portal, summary, diagnostics) = run(&storage, &PortalConfig::default());

        assert_eq!(portal.stores().len(), 2);
        assert_eq!(portal.store("s1").unwrap().name(), "Dunkin Donuts");
        assert_eq!(summary.stage(SourceKind::Stores).unwrap().records, 3);
        assert_eq!(
            diagnostics.entries(),
            &[Diagnostic::DuplicateStore {
                id: "s1".to_string()
            }]
        );
    }

    #[test]
    fn test_duplicate_customer_warns_and_keeps_first() {
        let storage = donut_storage()
            .with(
                "customers.txt",
                "id,name\nc1,Architect Armin\nc2,Hacker Rohan\nc1,Impostor Ian\nc3,Pilot Dave\n",
            )
            .with(
                "transactions.txt",
                "customer|quantity|product|store\nc1|4|p1|s1\n",
            );

        let (portal, summary, diagnostics) = run(&storage, &PortalConfig::default());

        assert!(summary.is_clean());
        assert_eq!(summary.stage(SourceKind::Customers).unwrap().records, 4);
        assert_eq!(portal.customers().len(), 3);
        assert_eq!(portal.customer("c1").unwrap().name(), "Architect Armin");
        assert_eq!(
            diagnostics.entries(),
            &[Diagnostic::DuplicateCustomer {
                id: "c1".to_string()
            }]
        );
        assert_eq!(
            portal.customer_report(),
            vec![CustomerReportRow {
                customer: "Architect Armin".to_string(),
                product: "Chocolate Donuts".to_string(),
                quantity_purchased: 4,
            }]
        );
        assert_eq!(
            portal.store_report()[0].customers,
            vec!["Architect Armin".to_string()]
        );
    }

    #[test]
    fn test_clamped_sale_then_out_of_stock() {
        let storage = donut_storage().with(
            "transactions.txt",
            "customer|quantity|product|store\nc1|15|p1|s1\nc2|4|p1|s1\n",
        );

        let (portal, summary, _) = run(&storage, &PortalConfig::default());

        assert!(summary.is_clean());
        assert_eq!(
            portal.store_report(),
            vec![StoreReportRow {
                store: "Dunkin Donuts".to_string(),
                product: "Chocolate Donuts".to_string(),
                customers: vec!["Architect Armin".to_string()],
                quantity_sold: 10,
            }]
        );
        assert!(portal.customer("c2").unwrap().purchases().is_empty());
        assert_eq!(
            portal.store("s1").unwrap().query_stock("Chocolate Donuts"),
            Some(0)
        );
    }

    #[test]
    fn test_strict_mode_returns_first_stage_error() {
        let mut storage = donut_storage();
        storage.files.remove("products.txt");
        let config = PortalConfig::default().with_strict(true);

        let mut diagnostics = Diagnostics::new();
        let result = ingest(&storage, &config, &mut diagnostics);

        assert!(matches!(result, Err(PortalError::SourceUnavailable { .. })));
        assert_eq!(diagnostics.errors().count(), 1);
    }

    #[test]
    fn test_replace_policy_is_threaded_to_products() {
        let storage = donut_storage().with(
            "inventory.txt",
            "store|quantity|product\ns1|10|p1\ns2|7|p1\n",
        );
        let config = PortalConfig::default().with_inventory_policy(InventoryPolicy::Replace);

        let (portal, _, _) = run(&storage, &config);

        let product = portal.product("p1").unwrap();
        assert_eq!(product.initial_inventory("s1"), None);
        assert_eq!(product.initial_inventory("s2"), Some(7));
        assert_eq!(
            portal.store("s2").unwrap().query_stock("Chocolate Donuts"),
            Some(7)
        );
    }
}
