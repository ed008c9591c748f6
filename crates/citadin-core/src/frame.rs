//! In-memory row/column table used as adapter working state.
//!
//! A [`Frame`] keeps its columns in first-seen order and stores JSON scalar
//! cells. Missing cells are `Value::Null`. Frames are built by the tabular and
//! CSV adapters and are always reduced to normalized records before they leave
//! the crate's shaping layer.

use serde_json::{Map, Value};

/// A single cell value.
pub type Cell = Value;

/// Rows × named columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Frame {
    /// An empty frame with a fixed column set.
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Build a frame from keyed records; columns are the union of keys in
    /// first-seen order.
    pub fn from_records(records: Vec<Map<String, Value>>) -> Self {
        let mut frame = Self::default();
        for record in records {
            frame.push_record(record);
        }
        frame
    }

    /// Parse delimited text whose first record is the header.
    ///
    /// A leading UTF-8 byte-order mark is ignored, short rows are padded with
    /// missing values and empty fields become missing values.
    pub fn from_delimited(text: &str, delimiter: u8) -> Result<Self, csv::Error> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let columns = reader
            .headers()?
            .iter()
            .map(str::to_owned)
            .collect::<Vec<_>>();
        let width = columns.len();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row = record
                .iter()
                .take(width)
                .map(|field| {
                    if field.is_empty() {
                        Value::Null
                    } else {
                        Value::String(field.to_owned())
                    }
                })
                .collect::<Vec<_>>();
            row.resize(width, Value::Null);
            rows.push(row);
        }

        Ok(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        self.rows.get(index).map(|cells| RowView {
            columns: &self.columns,
            cells,
        })
    }

    pub fn rows(&self) -> impl Iterator<Item = RowView<'_>> {
        self.rows.iter().map(|cells| RowView {
            columns: &self.columns,
            cells,
        })
    }

    /// Append a keyed record, adding any new columns.
    pub fn push_record(&mut self, record: Map<String, Value>) {
        let mut row = vec![Value::Null; self.columns.len()];
        for (key, value) in record {
            let index = match self.column_index(&key) {
                Some(index) => index,
                None => {
                    self.columns.push(key);
                    for existing in &mut self.rows {
                        existing.push(Value::Null);
                    }
                    row.push(Value::Null);
                    self.columns.len() - 1
                }
            };
            row[index] = value;
        }
        self.rows.push(row);
    }

    /// Keep only rows accepted by `predicate`, preserving order.
    pub fn retain_rows<F>(&mut self, mut predicate: F)
    where
        F: FnMut(&RowView<'_>) -> bool,
    {
        let columns = &self.columns;
        self.rows.retain(|cells| predicate(&RowView { columns, cells }));
    }

    /// Rewrite every cell of `column` in place; cells for which `map` returns
    /// `None` are left unchanged. No-op when the column is absent.
    pub fn map_column<F>(&mut self, column: &str, mut map: F)
    where
        F: FnMut(&Cell) -> Option<Cell>,
    {
        let Some(index) = self.column_index(column) else {
            return;
        };
        for row in &mut self.rows {
            if let Some(replacement) = map(&row[index]) {
                row[index] = replacement;
            }
        }
    }

    /// Rows as keyed records carrying every column.
    pub fn to_records(&self) -> Vec<Map<String, Value>> {
        self.rows().map(|row| row.to_record()).collect()
    }
}

/// Borrowed view over one frame row.
#[derive(Debug, Clone, Copy)]
pub struct RowView<'a> {
    columns: &'a [String],
    cells: &'a [Cell],
}

impl<'a> RowView<'a> {
    pub fn get(&self, column: &str) -> Option<&'a Cell> {
        let cells = self.cells;
        self.columns
            .iter()
            .position(|name| name == column)
            .and_then(|index| cells.get(index))
    }

    /// Cell rendered as text; `None` for missing values.
    pub fn text(&self, column: &str) -> Option<String> {
        self.get(column).and_then(cell_text)
    }

    /// `(column, cell)` pairs in column order.
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, &'a Cell)> {
        let (columns, cells) = (self.columns, self.cells);
        columns.iter().map(String::as_str).zip(cells.iter())
    }

    pub fn to_record(&self) -> Map<String, Value> {
        self.iter()
            .map(|(column, cell)| (column.to_owned(), cell.clone()))
            .collect()
    }
}

/// Text form of a scalar cell, `None` for nulls.
pub fn cell_text(cell: &Cell) -> Option<String> {
    match cell {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        other => Some(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Map<String, Value> {
        value.as_object().cloned().expect("object literal")
    }

    #[test]
    fn records_grow_columns_in_first_seen_order() {
        let frame = Frame::from_records(vec![
            record(json!({"GEO": "COM-69123"})),
            record(json!({"GEO": "COM-75056", "SEX": "F"})),
        ]);

        assert_eq!(frame.columns(), ["GEO", "SEX"]);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.row(0).and_then(|row| row.get("SEX")), Some(&Value::Null));
        assert_eq!(frame.row(1).and_then(|row| row.text("SEX")), Some(String::from("F")));
    }

    #[test]
    fn delimited_text_tolerates_bom_and_ragged_rows() {
        let frame = Frame::from_delimited("\u{feff}code;label;A2019\n69123;X\n75056;Y;;extra\n", b';')
            .expect("valid csv");

        assert_eq!(frame.columns(), ["code", "label", "A2019"]);
        assert_eq!(frame.len(), 2);
        let first = frame.row(0).expect("first row");
        assert_eq!(first.get("A2019"), Some(&Value::Null));
        let second = frame.row(1).expect("second row");
        assert_eq!(second.get("A2019"), Some(&Value::Null));
        assert_eq!(second.text("label"), Some(String::from("Y")));
    }

    #[test]
    fn empty_text_yields_frame_without_columns() {
        let frame = Frame::from_delimited("", b';').expect("empty csv");
        assert!(frame.columns().is_empty());
        assert!(frame.is_empty());
    }

    #[test]
    fn retain_and_map_column_operate_in_place() {
        let mut frame = Frame::from_records(vec![
            record(json!({"RP_MEASURE": "NBEMP", "SEX": "F"})),
            record(json!({"RP_MEASURE": "OTHER", "SEX": "M"})),
        ]);

        frame.retain_rows(|row| row.text("RP_MEASURE").as_deref() == Some("NBEMP"));
        frame.map_column("SEX", |cell| {
            (cell == &json!("F")).then(|| json!("Femme"))
        });
        frame.map_column("ABSENT", |_| Some(json!("never")));

        assert_eq!(
            frame.to_records(),
            vec![record(json!({"RP_MEASURE": "NBEMP", "SEX": "Femme"}))]
        );
    }

    #[test]
    fn numeric_cells_render_as_text() {
        assert_eq!(cell_text(&json!(69123)), Some(String::from("69123")));
        assert_eq!(cell_text(&Value::Null), None);
    }
}
