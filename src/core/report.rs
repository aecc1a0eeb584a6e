use crate::domain::model::{Customer, CustomerReportRow, Reports, Store, StoreReportRow};
use crate::utils::error::{PortalError, Result};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ReportFormat {
    #[default]
    Table,
    Csv,
    Tsv,
    Json,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Table => "txt",
            ReportFormat::Csv => "csv",
            ReportFormat::Tsv => "tsv",
            ReportFormat::Json => "json",
        }
    }
}

/// Both reports rendered in one format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedReports {
    pub format: ReportFormat,
    pub stores: String,
    pub customers: String,
}

impl RenderedReports {
    pub fn store_file_name(&self) -> String {
        format!("store_report.{}", self.format.extension())
    }

    pub fn customer_file_name(&self) -> String {
        format!("customer_report.{}", self.format.extension())
    }
}

pub fn render(reports: &Reports, format: ReportFormat) -> Result<RenderedReports> {
    let (stores, customers) = match format {
        ReportFormat::Table => (
            table(&Store::REPORT_HEADERS, reports.stores.iter().map(store_cells)),
            table(
                &Customer::REPORT_HEADERS,
                reports.customers.iter().map(customer_cells),
            ),
        ),
        ReportFormat::Csv | ReportFormat::Tsv => {
            let delimiter = if format == ReportFormat::Csv { b',' } else { b'\t' };
            (
                delimited(
                    delimiter,
                    &Store::REPORT_HEADERS,
                    reports.stores.iter().map(store_cells),
                )?,
                delimited(
                    delimiter,
                    &Customer::REPORT_HEADERS,
                    reports.customers.iter().map(customer_cells),
                )?,
            )
        }
        ReportFormat::Json => (
            serde_json::to_string_pretty(&reports.stores)?,
            serde_json::to_string_pretty(&reports.customers)?,
        ),
    };

    Ok(RenderedReports {
        format,
        stores,
        customers,
    })
}

fn store_cells(row: &StoreReportRow) -> Vec<String> {
    vec![
        row.store.clone(),
        row.product.clone(),
        row.customers.join("; "),
        row.quantity_sold.to_string(),
    ]
}

fn customer_cells(row: &CustomerReportRow) -> Vec<String> {
    vec![
        row.customer.clone(),
        row.product.clone(),
        row.quantity_purchased.to_string(),
    ]
}

fn table(headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(headers.to_vec());

    for row in rows {
        table.add_row(row);
    }

    table.to_string()
}

fn delimited(
    delimiter: u8,
    headers: &[&str],
    rows: impl Iterator<Item = Vec<String>>,
) -> Result<String> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());

    wtr.write_record(headers)?;
    for row in rows {
        wtr.write_record(&row)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| PortalError::IoError(e.into_error()))?;
    String::from_utf8(bytes).map_err(|e| PortalError::ValidationError {
        message: format!("report is not valid UTF-8: {}", e),
    })
}
