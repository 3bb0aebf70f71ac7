use crate::catalog::reader::SheetTable;
use crate::utils::{CatalogColumns, CatalogError, Result};

/// Column positions resolved against a loaded sheet. Optional columns that
/// are absent simply read as empty.
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    name: usize,
    product_id: usize,
    price: usize,
    brand: Option<usize>,
    size: Option<usize>,
    image_url: Option<usize>,
    kosher: Option<usize>,
    health_labels: Option<usize>,
    sales_method: Option<usize>,
    promotion: Option<usize>,
    availability: Option<usize>,
    unit_price: Option<usize>,
}

impl ColumnIndex {
    pub fn resolve(table: &SheetTable, columns: &CatalogColumns) -> Result<Self> {
        let required = |header: &str| {
            table
                .column_index(header)
                .ok_or_else(|| CatalogError::MissingColumn(header.to_string()))
        };

        Ok(Self {
            name: required(&columns.name)?,
            product_id: required(&columns.product_id)?,
            price: required(&columns.price)?,
            brand: table.column_index(&columns.brand),
            size: table.column_index(&columns.size),
            image_url: table.column_index(&columns.image_url),
            kosher: table.column_index(&columns.kosher),
            health_labels: table.column_index(&columns.health_labels),
            sales_method: table.column_index(&columns.sales_method),
            promotion: table.column_index(&columns.promotion),
            availability: table.column_index(&columns.availability),
            unit_price: table.column_index(&columns.unit_price),
        })
    }
}

/// Typed view of one spreadsheet row.
#[derive(Debug, Clone, Copy)]
pub struct CatalogRow<'a> {
    pub index: usize,
    cells: &'a [Option<String>],
    columns: &'a ColumnIndex,
}

impl<'a> CatalogRow<'a> {
    fn get(&self, column: Option<usize>) -> Option<&'a str> {
        column
            .and_then(|c| self.cells.get(c))
            .and_then(|c| c.as_deref())
    }

    pub fn name(&self) -> Option<&'a str> {
        self.get(Some(self.columns.name))
    }

    pub fn shufersal_id(&self) -> Option<&'a str> {
        self.get(Some(self.columns.product_id))
    }

    pub fn price_text(&self) -> Option<&'a str> {
        self.get(Some(self.columns.price))
    }

    pub fn brand(&self) -> Option<&'a str> {
        self.get(self.columns.brand)
    }

    pub fn size(&self) -> Option<&'a str> {
        self.get(self.columns.size)
    }

    pub fn image_url(&self) -> Option<&'a str> {
        self.get(self.columns.image_url)
    }

    pub fn kosher(&self) -> Option<&'a str> {
        self.get(self.columns.kosher)
    }

    pub fn health_labels(&self) -> Option<&'a str> {
        self.get(self.columns.health_labels)
    }

    pub fn sales_method(&self) -> Option<&'a str> {
        self.get(self.columns.sales_method)
    }

    pub fn promotion(&self) -> Option<&'a str> {
        self.get(self.columns.promotion)
    }

    pub fn availability(&self) -> Option<&'a str> {
        self.get(self.columns.availability)
    }

    pub fn unit_price(&self) -> Option<&'a str> {
        self.get(self.columns.unit_price)
    }

    /// Empty price reads as 0. Text that is not a finite, non-negative number
    /// is an error.
    pub fn price(&self) -> Result<f64> {
        let Some(text) = self.price_text() else {
            return Ok(0.0);
        };
        let invalid = |reason: &str| CatalogError::InvalidRow {
            row: self.index,
            reason: format!("price {:?} {}", text, reason),
        };

        let cleaned = text.trim_start_matches('₪').trim();
        let price = cleaned
            .parse::<f64>()
            .map_err(|_| invalid("is not a number"))?;
        if !price.is_finite() {
            return Err(invalid("is not finite"));
        }
        if price < 0.0 {
            return Err(invalid("is negative"));
        }
        Ok(price)
    }
}

pub fn iter_rows<'a>(
    table: &'a SheetTable,
    columns: &'a ColumnIndex,
) -> impl Iterator<Item = CatalogRow<'a>> + 'a {
    table
        .rows
        .iter()
        .enumerate()
        .map(move |(index, cells)| CatalogRow {
            index,
            cells,
            columns,
        })
}
