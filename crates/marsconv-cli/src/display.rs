//! Display utilities for formatting CLI output.
//!
//! This module provides table row structures and formatting functions
//! for presenting dataset schemas and conversion reports in a
//! human-readable format.

use tabled::{Table, Tabled};

use marsconv_core::pipeline::ConversionReport;
use marsconv_core::store::DatasetInfo;

/// Table row representation for displaying field/column information.
#[derive(Tabled)]
pub struct FieldRow {
    /// Name of the field.
    #[tabled(rename = "Field")]
    pub name: String,
    /// Data type of the field.
    #[tabled(rename = "Type")]
    pub field_type: String,
    /// Declared numeric precision, if any.
    #[tabled(rename = "Precision")]
    pub precision: String,
    /// Declared numeric scale, if any.
    #[tabled(rename = "Scale")]
    pub scale: String,
    /// Declared text length, if any.
    #[tabled(rename = "Length")]
    pub length: String,
}

fn opt_u32(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Display dataset information in a formatted table.
pub fn display_dataset_info(info: &DatasetInfo) {
    println!("\nDataset: {}", info.path.display());
    println!("Geometry: {}", info.geometry_kind);
    println!("Features: {}", info.feature_count);

    if !info.schema.is_empty() {
        println!("\n=== Fields ===");

        let field_rows: Vec<FieldRow> = info
            .schema
            .fields()
            .iter()
            .map(|f| FieldRow {
                name: f.name.clone(),
                field_type: f.field_type.to_string(),
                precision: opt_u32(f.precision),
                scale: opt_u32(f.scale),
                length: opt_u32(f.length),
            })
            .collect();

        let field_table = Table::new(field_rows).to_string();
        println!("{field_table}");
    }
}

/// Display the outcome of a conversion run.
///
/// Retained warnings are listed after the counts; when more records were
/// skipped than warnings retained, the remainder is noted.
pub fn display_report(report: &ConversionReport) {
    println!(
        "Converted {} of {} record(s), {} skipped.",
        report.written, report.read, report.skipped
    );
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }
    let unreported = report.skipped.saturating_sub(report.warnings.len() as u64);
    if unreported > 0 {
        println!("  ({unreported} further warning(s) not shown)");
    }
}
