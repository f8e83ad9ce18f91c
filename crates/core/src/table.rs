use std::collections::HashMap;

/// 以標頭列與字串儲存格組成的表格。 / A header row plus string cells, as read from CSV/TSV sources.
///
/// Rows may be shorter than the header row; missing cells read as blank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Convenience constructor for literal tables.
    pub fn from_literals(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|header| header.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| cell.to_string()).collect())
                .collect(),
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn has_column(&self, header: &str) -> bool {
        self.column_index(header).is_some()
    }

    /// Index of the first header equal to `header`.
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|candidate| candidate == header)
    }

    pub fn rows(&self) -> impl Iterator<Item = TableRow<'_>> {
        self.rows.iter().map(move |cells| TableRow {
            headers: &self.headers,
            cells,
        })
    }
}

/// Borrowed view over one row.
#[derive(Debug, Clone, Copy)]
pub struct TableRow<'a> {
    headers: &'a [String],
    cells: &'a [String],
}

impl<'a> TableRow<'a> {
    /// Cell under `header`, blank when the header or the cell is missing.
    pub fn get(&self, header: &str) -> &'a str {
        self.headers
            .iter()
            .position(|candidate| candidate == header)
            .and_then(|index| self.cells.get(index))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Header → cell map; with duplicate headers the later column wins.
    pub fn to_map(&self) -> HashMap<&'a str, &'a str> {
        self.headers
            .iter()
            .enumerate()
            .map(|(index, header)| {
                let cell = self.cells.get(index).map(String::as_str).unwrap_or("");
                (header.as_str(), cell)
            })
            .collect()
    }
}
