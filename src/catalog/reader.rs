use crate::utils::{CatalogError, Result};
use calamine::{open_workbook_auto, Data, Reader};
use std::path::Path;

/// A catalog sheet loaded into memory. Cells are trimmed; blanks are `None`.
#[derive(Debug, Clone, Default)]
pub struct SheetTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl SheetTable {
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .and_then(|c| c.as_deref())
    }
}

pub struct CatalogReader {
    path: String,
    sheet: Option<String>,
}

impl CatalogReader {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            sheet: None,
        }
    }

    pub fn with_sheet(mut self, sheet: Option<String>) -> Self {
        self.sheet = sheet;
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn read(&self) -> Result<SheetTable> {
        if !file_exists(&self.path) {
            return Err(CatalogError::FileNotFound(self.path.clone()));
        }

        let extension = Path::new(&self.path)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();

        let table = match extension.as_str() {
            "csv" => self.read_csv()?,
            _ => self.read_workbook()?,
        };

        tracing::debug!(
            path = %self.path,
            rows = table.rows.len(),
            columns = table.headers.len(),
            "Catalog loaded"
        );

        Ok(table)
    }

    fn read_csv(&self) -> Result<SheetTable> {
        let file = std::fs::File::open(&self.path)?;
        let mut reader = csv::Reader::from_reader(file);
        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect::<Vec<_>>();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let row: Vec<Option<String>> = record.iter().map(|c| clean_text(Some(c))).collect();
            push_row(&mut rows, row, headers.len());
        }

        Ok(SheetTable { headers, rows })
    }

    fn read_workbook(&self) -> Result<SheetTable> {
        let mut workbook = open_workbook_auto(&self.path)?;

        let sheet_name = match &self.sheet {
            Some(name) => name.clone(),
            None => workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| CatalogError::FileNotFound(format!("{} (no sheets)", self.path)))?,
        };

        let range = workbook.worksheet_range(&sheet_name)?;
        let mut raw_rows = range.rows();

        let headers: Vec<String> = match raw_rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|c| cell_to_string(c).unwrap_or_default())
                .collect(),
            None => return Ok(SheetTable::default()),
        };

        let mut rows = Vec::new();
        for raw in raw_rows {
            let row: Vec<Option<String>> = raw.iter().map(cell_to_string).collect();
            push_row(&mut rows, row, headers.len());
        }

        Ok(SheetTable { headers, rows })
    }
}

fn push_row(rows: &mut Vec<Vec<Option<String>>>, mut row: Vec<Option<String>>, width: usize) {
    if row.iter().all(Option::is_none) {
        return;
    }
    row.resize(width.max(row.len()), None);
    rows.push(row);
}

/// Trim a cell; missing or blank text becomes `None`.
pub fn clean_text(value: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn cell_to_string(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) => clean_text(Some(s)),
        Data::Int(i) => Some(i.to_string()),
        Data::Float(f) => Some(format_number(*f)),
        Data::Bool(b) => Some(b.to_string()),
        other => clean_text(Some(&other.to_string())),
    }
}

/// Whole numbers lose their fractional part so ids like `42015` do not turn
/// into `42015.0`.
pub fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

pub fn file_exists(path: &str) -> bool {
    Path::new(path).exists()
}
