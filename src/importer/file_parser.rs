// ==========================================
// Seguimiento de pedidos - sheet parsers
// ==========================================
// Excel (.xlsx/.xls) and CSV into a RawSheet. Column order is
// preserved: the pivot utility reproduces selected columns in the
// order the planner chose them.
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use calamine::{open_workbook, Reader, Xlsx};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

// ==========================================
// RawSheet - one parsed worksheet
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct RawSheet {
    pub headers: Vec<String>,
    /// Rows of cells, aligned with `headers`; short rows are padded
    pub rows: Vec<Vec<String>>,
}

impl RawSheet {
    /// Index of a header, exact match after trimming.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name.trim())
    }

    /// A cell by row index and column name; empty when out of range.
    pub fn cell(&self, row: usize, column: &str) -> &str {
        self.column_index(column)
            .and_then(|c| self.rows.get(row).and_then(|r| r.get(c)))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Parser for one file format.
pub trait SheetParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawSheet>;
}

// ==========================================
// CSV parser
// ==========================================
pub struct CsvParser;

impl SheetParser for CsvParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawSheet> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let file = File::open(file_path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // tolerate ragged rows
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let mut row: Vec<String> =
                record.iter().map(|v| v.trim().to_string()).collect();
            row.resize(headers.len(), String::new());

            // skip fully blank lines
            if row.iter().all(|v| v.is_empty()) {
                continue;
            }
            rows.push(row);
        }

        Ok(RawSheet { headers, rows })
    }
}

// ==========================================
// Excel parser
// ==========================================
pub struct ExcelParser;

impl SheetParser for ExcelParser {
    fn parse(&self, file_path: &Path) -> ImportResult<RawSheet> {
        if !file_path.exists() {
            return Err(ImportError::FileNotFound(file_path.display().to_string()));
        }

        let mut workbook: Xlsx<_> = open_workbook(file_path)
            .map_err(|e: calamine::XlsxError| ImportError::ExcelParseError(e.to_string()))?;

        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("workbook has no sheets".to_string()))?;

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| ImportError::ExcelParseError(e.to_string()))?;

        let mut range_rows = range.rows();
        let header_row = range_rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("sheet has no header row".to_string()))?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for data_row in range_rows {
            let mut row: Vec<String> = data_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect();
            row.resize(headers.len(), String::new());

            if row.iter().all(|v| v.is_empty()) {
                continue;
            }
            rows.push(row);
        }

        Ok(RawSheet { headers, rows })
    }
}

// ==========================================
// Universal parser (dispatch on extension)
// ==========================================
pub struct UniversalSheetParser;

impl UniversalSheetParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawSheet> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse(path),
            "xlsx" | "xls" => ExcelParser.parse(path),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_csv_parse_preserves_column_order() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "ESTILO,PO,S,M,L").unwrap();
        writeln!(file, "A100,224-95,10,20,30").unwrap();
        writeln!(file, ",,,,").unwrap();
        writeln!(file, "A101,224-96,5,,15").unwrap();
        file.flush().unwrap();

        let sheet = CsvParser.parse(file.path()).unwrap();
        assert_eq!(sheet.headers, vec!["ESTILO", "PO", "S", "M", "L"]);
        assert_eq!(sheet.rows.len(), 2); // blank line dropped
        assert_eq!(sheet.cell(0, "M"), "20");
        assert_eq!(sheet.cell(1, "M"), "");
    }

    #[test]
    fn test_unsupported_extension() {
        let err = UniversalSheetParser.parse("tabla.pdf").unwrap_err();
        assert!(matches!(err, ImportError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = CsvParser.parse(Path::new("/no/such/file.csv")).unwrap_err();
        assert!(matches!(err, ImportError::FileNotFound(_)));
    }
}
