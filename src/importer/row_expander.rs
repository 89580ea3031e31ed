// ==========================================
// Seguimiento de pedidos - size-column pivot
// ==========================================
// The cutting-sheet utility: takes a wide spreadsheet with one
// column per garment size and expands it to one row per
// (input row, size), carrying the chosen info columns, applying the
// programming uplift and deriving the packing unit count.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::RawSheet;
use serde::{Deserialize, Serialize};
use std::io::Write;

// ==========================================
// ExpandOptions
// ==========================================
#[derive(Debug, Clone, Deserialize)]
pub struct ExpandOptions {
    /// Columns repeated verbatim on every expanded row
    pub info_columns: Vec<String>,
    /// Size columns driving the expansion, one output row each
    pub size_columns: Vec<String>,
    /// Optional second size group, paired positionally with the first
    pub extra_columns: Vec<String>,
    /// Programming uplift percent applied to each quantity (0..=30)
    pub uplift_pct: u32,
    /// Multiplier of the packing formula
    pub multiple: u32,
    /// Divisor of the packing formula; at least 1
    pub divisor: u32,
}

impl ExpandOptions {
    fn validate(&self, sheet: &RawSheet) -> ImportResult<()> {
        if self.divisor == 0 {
            return Err(ImportError::InvalidParameter {
                name: "divisor".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.size_columns.is_empty() {
            return Err(ImportError::InvalidParameter {
                name: "size_columns".to_string(),
                message: "select at least one size column".to_string(),
            });
        }
        for column in self
            .info_columns
            .iter()
            .chain(&self.size_columns)
            .chain(&self.extra_columns)
        {
            if sheet.column_index(column).is_none() {
                return Err(ImportError::ColumnNotFound(column.clone()));
            }
        }
        Ok(())
    }
}

// ==========================================
// ExpandedRow / ExpandedTable
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ExpandedRow {
    /// Values of the info columns, in selection order
    pub info: Vec<String>,
    /// Size-column name this row was expanded from
    pub size: String,
    /// Raw quantity cell for that size
    pub quantity: String,
    /// Quantity with the programming uplift, rounded up
    pub programmed_quantity: u64,
    /// multiple * q + ceil(q / divisor)
    pub derived_units: u64,
    /// Paired second-group column, when one lines up positionally
    pub extra_size: Option<String>,
    pub extra_value: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExpandedTable {
    pub info_headers: Vec<String>,
    pub rows: Vec<ExpandedRow>,
}

// ==========================================
// RowExpander
// ==========================================
pub struct RowExpander;

impl RowExpander {
    pub fn new() -> Self {
        Self
    }

    /// Expand the sheet: one output row per (input row, size column).
    pub fn expand(&self, sheet: &RawSheet, options: &ExpandOptions) -> ImportResult<ExpandedTable> {
        options.validate(sheet)?;

        let mut rows = Vec::new();
        for row_idx in 0..sheet.rows.len() {
            for (size_idx, size_column) in options.size_columns.iter().enumerate() {
                let quantity_raw = sheet.cell(row_idx, size_column).to_string();
                let programmed_quantity =
                    programmed_quantity(&quantity_raw, options.uplift_pct);
                let derived_units = u64::from(options.multiple) * programmed_quantity
                    + programmed_quantity.div_ceil(u64::from(options.divisor));

                // second group pairs by position; unmatched tail gets none
                let extra_size = options.extra_columns.get(size_idx).cloned();
                let extra_value = extra_size
                    .as_deref()
                    .map(|col| sheet.cell(row_idx, col).to_string());

                rows.push(ExpandedRow {
                    info: options
                        .info_columns
                        .iter()
                        .map(|col| sheet.cell(row_idx, col).to_string())
                        .collect(),
                    size: size_column.clone(),
                    quantity: quantity_raw,
                    programmed_quantity,
                    derived_units,
                    extra_size,
                    extra_value,
                });
            }
        }

        Ok(ExpandedTable {
            info_headers: options.info_columns.clone(),
            rows,
        })
    }

    /// Write the expanded table as CSV.
    pub fn write_csv<W: Write>(&self, table: &ExpandedTable, writer: W) -> ImportResult<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let mut headers: Vec<String> = table.info_headers.clone();
        headers.extend([
            "Talla".to_string(),
            "Cantidad".to_string(),
            "cant_prog".to_string(),
            "Und_result".to_string(),
            "Talla2".to_string(),
            "Data2".to_string(),
        ]);
        csv_writer.write_record(&headers)?;

        for row in &table.rows {
            let mut record: Vec<String> = row.info.clone();
            record.push(row.size.clone());
            record.push(row.quantity.clone());
            record.push(row.programmed_quantity.to_string());
            record.push(row.derived_units.to_string());
            record.push(row.extra_size.clone().unwrap_or_default());
            record.push(row.extra_value.clone().unwrap_or_default());
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl Default for RowExpander {
    fn default() -> Self {
        Self::new()
    }
}

/// Uplifted quantity, rounded up; blank or junk cells count as zero.
fn programmed_quantity(raw: &str, uplift_pct: u32) -> u64 {
    let quantity = raw.trim().replace(',', ".").parse::<f64>().unwrap_or(0.0);
    if quantity <= 0.0 {
        return 0;
    }
    (quantity * (1.0 + f64::from(uplift_pct) / 100.0)).ceil() as u64
}
