//! Row-oriented table storage.

use std::collections::HashMap;

use tabula_common::eq_fold;

use crate::value::Value;

/// Column names plus rows of cells. Every row has exactly one cell per column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        let mut index = HashMap::with_capacity(columns.len());
        for (idx, name) in columns.iter().enumerate() {
            index.entry(name.clone()).or_insert(idx);
        }
        Self {
            columns,
            index,
            rows: Vec::new(),
        }
    }

    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let mut table = Self::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// Appends a row, padding with `Null` (or truncating) to the table width.
    pub fn push_row(&mut self, mut cells: Vec<Value>) {
        cells.resize(self.columns.len(), Value::Null);
        self.rows.push(cells);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Index of a column by exact name, then case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied().or_else(|| {
            self.columns
                .iter()
                .position(|column| eq_fold(column, name))
        })
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<Row<'_>> {
        (index < self.rows.len()).then_some(Row { table: self, index })
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = Row<'_>> + '_ {
        (0..self.rows.len()).map(move |index| Row { table: self, index })
    }

    /// All cells of one column, top to bottom.
    pub fn column_values(&self, name: &str) -> Option<impl Iterator<Item = &Value> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Value> {
        self.rows.get(row).and_then(|cells| cells.get(column))
    }
}

/// Read-only view of one table row, addressed by column name.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    /// Zero-based row index within its table.
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn get(&self, name: &str) -> Option<&'a Value> {
        let column = self.table.column_index(name)?;
        self.table.cell(self.index, column)
    }

    /// Non-null text of a column; `None` when the column is missing or null.
    pub fn get_str(&self, name: &str) -> Option<&'a str> {
        self.get(name)
            .filter(|value| !value.is_null())
            .and_then(Value::as_str)
    }

    /// True when the column is missing or its value is null.
    pub fn is_blank(&self, name: &str) -> bool {
        self.get(name).is_none_or(Value::is_null)
    }

    pub fn values(&self) -> &'a [Value] {
        &self.table.rows[self.index]
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Value)> + 'a {
        self.table
            .columns
            .iter()
            .map(String::as_str)
            .zip(self.table.rows[self.index].iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_rows(
            vec!["ID".to_string(), "NAME".to_string()],
            vec![
                vec![Value::from("1"), Value::from("Ana")],
                vec![Value::from("2")],
            ],
        )
    }

    #[test]
    fn pads_short_rows() {
        let table = sample();
        assert_eq!(table.height(), 2);
        assert_eq!(table.cell(1, 1), Some(&Value::Null));
    }

    #[test]
    fn row_lookup_by_name() {
        let table = sample();
        let row = table.row(0).unwrap();
        assert_eq!(row.get_str("NAME"), Some("Ana"));
        assert_eq!(row.get_str("name"), Some("Ana"));
        assert!(row.get("MISSING").is_none());
        assert!(table.row(1).unwrap().is_blank("NAME"));
        assert!(table.row(2).is_none());
    }

    #[test]
    fn lookup_folds_non_ascii_case() {
        let table = Table::from_rows(vec!["Situação".to_string()], vec![vec![Value::from("ok")]]);
        assert_eq!(table.column_index("SITUAÇÃO"), Some(0));
        assert_eq!(table.row(0).unwrap().get_str("situação"), Some("ok"));
    }

    #[test]
    fn column_values_in_order() {
        let table = sample();
        let ids: Vec<_> = table
            .column_values("ID")
            .unwrap()
            .map(Value::to_text)
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }
}
