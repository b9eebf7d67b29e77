//! Column-oriented tabular datasets

use indexmap::IndexMap;
use std::io::Read;
use thiserror::Error;

/// Table construction errors
#[derive(Error, Debug)]
pub enum TableError {
    /// A row does not have one value per column
    #[error("Row {row} has {found} values, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// CSV decoding failure
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type TableResult<T> = Result<T, TableError>;

/// A dataset held column by column
///
/// Each column has exactly `len()` values.
#[derive(Debug, Clone, Default)]
pub struct Table {
    /// Column name → column position
    header: IndexMap<String, usize>,
    columns: Vec<Vec<String>>,
    len: usize,
}

impl Table {
    /// Build a table from a header and row-major records
    pub fn from_rows(header: Vec<String>, rows: Vec<Vec<String>>) -> TableResult<Self> {
        let width = header.len();
        let mut columns: Vec<Vec<String>> = (0..width).map(|_| Vec::with_capacity(rows.len())).collect();
        let len = rows.len();

        for (index, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(TableError::RaggedRow {
                    row: index,
                    expected: width,
                    found: row.len(),
                });
            }
            for (column, value) in columns.iter_mut().zip(row) {
                column.push(value);
            }
        }

        Ok(Self {
            header: index_header(header),
            columns,
            len,
        })
    }

    /// Read a CSV stream whose first row holds the column names.
    ///
    /// `on_row` is called with the running row count after each record.
    pub fn from_csv<R: Read>(reader: R, mut on_row: impl FnMut(usize)) -> TableResult<Self> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut columns: Vec<Vec<String>> = vec![Vec::new(); header.len()];
        let mut len = 0;
        for record in reader.records() {
            let record = record?;
            for (column, value) in columns.iter_mut().zip(record.iter()) {
                column.push(value.to_string());
            }
            len += 1;
            on_row(len);
        }

        Ok(Self {
            header: index_header(header),
            columns,
            len,
        })
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the table has no records
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Column names in source order
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.header.keys().map(String::as_str)
    }

    /// Values of one column
    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.header.get(name).map(|&i| self.columns[i].as_slice())
    }

    pub(crate) fn columns_mut(&mut self) -> &mut [Vec<String>] {
        &mut self.columns
    }

    /// View of one record
    pub fn record(&self, index: usize) -> Option<Record<'_>> {
        (index < self.len).then_some(Record { table: self, index })
    }

    /// Iterate over all records in order
    pub fn records(&self) -> impl Iterator<Item = Record<'_>> {
        (0..self.len).map(move |index| Record { table: self, index })
    }
}

/// Borrowed view of one table row
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Record<'a> {
    /// Value of a field, or `None` if the table has no such column
    pub fn get(&self, field: &str) -> Option<&'a str> {
        self.table
            .column(field)
            .map(|column| column[self.index].as_str())
    }

    /// Position of this record in its table
    pub fn index(&self) -> usize {
        self.index
    }
}

fn index_header(header: Vec<String>) -> IndexMap<String, usize> {
    let mut index = IndexMap::with_capacity(header.len());
    for (position, name) in header.into_iter().enumerate() {
        index.entry(name).or_insert(position);
    }
    index
}
