//! Header-addressed CSV tables.
//!
//! Empty cells and the usual NA spellings (`NaN`, `NA`, `N/A`, `null`, ...)
//! are treated as missing values, the way a dataframe reader loads them.

use std::io;

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::error::{EtlError, EtlResult};

/// Cell values read as missing, matching pandas' default `na_values`.
const MISSING_MARKERS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_missing(cell: &str) -> bool {
    cell.is_empty() || MISSING_MARKERS.contains(&cell)
}

/// A parsed CSV file with a header row.
#[derive(Debug, Clone)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<StringRecord>,
}

impl Table {
    pub fn from_reader<R: io::Read>(reader: R) -> EtlResult<Self> {
        let mut reader = ReaderBuilder::new()
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').to_string())
            .collect();
        let rows = reader.records().collect::<Result<Vec<_>, _>>()?;

        Ok(Self { headers, rows })
    }

    pub fn from_bytes(bytes: &[u8]) -> EtlResult<Self> {
        Self::from_reader(bytes)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Position of a named column.
    pub fn column(&self, catalog: &'static str, name: &str) -> EtlResult<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| EtlError::MissingColumn {
                catalog,
                column: name.to_string(),
            })
    }

    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|record| Row { record })
    }
}

/// One data row of a [`Table`].
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    record: &'a StringRecord,
}

impl<'a> Row<'a> {
    /// The cell at `column`, or `None` if it is absent, empty or an NA marker.
    #[must_use]
    pub fn get(&self, column: usize) -> Option<&'a str> {
        self.record.get(column).filter(|cell| !is_missing(cell))
    }

    /// `true` when every listed column has a value.
    #[must_use]
    pub fn has_all(&self, columns: &[usize]) -> bool {
        columns.iter().all(|&c| self.get(c).is_some())
    }
}

/// Parse a finite numeric cell, reporting the row and column on failure.
pub fn parse_number(row: usize, column: &str, value: &str) -> EtlResult<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| EtlError::InvalidNumber {
            row,
            column: column.to_string(),
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_cells_are_none() {
        let table = Table::from_bytes(b"a,b,c\n1,,3\n4,5\n").unwrap();
        assert_eq!(table.len(), 2);

        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].get(0), Some("1"));
        assert_eq!(rows[0].get(1), None);
        assert_eq!(rows[1].get(2), None);
        assert!(rows[0].has_all(&[0, 2]));
        assert!(!rows[1].has_all(&[0, 2]));
    }

    #[test]
    fn test_na_markers_are_missing() {
        let table = Table::from_bytes(b"a,b,c,d,e\nNaN,NA,N/A,null,Nancy\n").unwrap();
        let row = table.rows().next().unwrap();
        assert_eq!(row.get(0), None);
        assert_eq!(row.get(1), None);
        assert_eq!(row.get(2), None);
        assert_eq!(row.get(3), None);
        assert_eq!(row.get(4), Some("Nancy"));
        assert!(!row.has_all(&[0, 4]));
    }

    #[test]
    fn test_quoted_fields() {
        let table = Table::from_bytes(b"title,cast\n\"Heat\",\"Al Pacino, Robert De Niro\"\n").unwrap();
        let row = table.rows().next().unwrap();
        assert_eq!(row.get(0), Some("Heat"));
        assert_eq!(row.get(1), Some("Al Pacino, Robert De Niro"));
    }

    #[test]
    fn test_cells_are_trimmed() {
        let table = Table::from_bytes(b"tempo, energy\n  120.0 ,   \n").unwrap();
        assert_eq!(table.column("test", "energy").unwrap(), 1);
        let row = table.rows().next().unwrap();
        assert_eq!(row.get(0), Some("120.0"));
        assert_eq!(row.get(1), None);
    }

    #[test]
    fn test_column_lookup() {
        let table = Table::from_bytes(b"\xef\xbb\xbfid,name\n").unwrap();
        assert_eq!(table.column("test", "id").unwrap(), 0);
        assert!(matches!(
            table.column("test", "missing"),
            Err(EtlError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(0, "tempo", "120.5").unwrap(), 120.5);
        assert!(matches!(
            parse_number(3, "tempo", "fast"),
            Err(EtlError::InvalidNumber { row: 3, .. })
        ));
        assert!(parse_number(1, "tempo", "inf").is_err());
        assert!(parse_number(1, "tempo", "NaN").is_err());
    }
}
