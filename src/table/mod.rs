// src/table/mod.rs
use std::{
    borrow::Cow,
    collections::{BTreeSet, HashMap},
};

/// A single cell. `Missing` is the explicit absent value: it renders as an
/// empty CSV field and never equals a token.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Int(i64),
    Decimal(f64),
    Text(String),
}

static MISSING: Value = Value::Missing;

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Decimal(_))
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render as a CSV field.
    pub fn to_field(&self) -> Cow<'_, str> {
        match self {
            Value::Missing => Cow::Borrowed(""),
            Value::Int(i) => Cow::Owned(i.to_string()),
            Value::Decimal(f) => Cow::Owned(format_decimal(*f)),
            Value::Text(s) => Cow::Borrowed(s),
        }
    }
}

/// Whole floats keep a trailing `.0` so they stay distinguishable from ints.
fn format_decimal(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

/// One parsed CSV file: header names plus rows aligned to them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A loaded input archive.
#[derive(Debug, Clone)]
pub struct Batch {
    /// Display name of the source, used in diagnostics.
    pub name: String,
    pub table: RowTable,
}

/// All batches concatenated in load order. Every row is as wide as the
/// union of input columns; gaps hold `Value::Missing`.
#[derive(Debug, Clone, Default)]
pub struct CombinedTable {
    columns: Vec<String>,
    index: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl CombinedTable {
    pub fn with_columns(columns: Vec<String>) -> Self {
        let index = columns
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        Self {
            columns,
            index,
            rows: Vec::new(),
        }
    }

    /// Append one batch's rows. Each row must already be laid out in this
    /// table's column order.
    pub fn push_rows(&mut self, rows: Vec<Vec<Value>>) {
        for row in rows {
            debug_assert_eq!(row.len(), self.columns.len(), "row width mismatch");
            self.rows.push(row);
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The known column set, as alias resolution sees it.
    pub fn column_set(&self) -> BTreeSet<String> {
        self.columns.iter().cloned().collect()
    }

    /// Cell lookup; unknown columns read as `Missing`.
    pub fn get(&self, row: usize, column: &str) -> &Value {
        match self.index.get(column) {
            Some(&c) => &self.rows[row][c],
            None => &MISSING,
        }
    }

    /// Every value of `column`, in row order.
    pub fn column_values<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        (0..self.rows.len()).map(move |r| self.get(r, column))
    }

    /// Add `name` as a new column, or overwrite it if it already exists.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len(), "column length mismatch");
        match self.index.get(name) {
            Some(&c) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row[c] = v;
                }
            }
            None => {
                self.index.insert(name.to_string(), self.columns.len());
                self.columns.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.push(v);
                }
            }
        }
    }

    /// Rewrite every value of an existing column. Returns false when the
    /// column is absent.
    pub fn map_column(&mut self, name: &str, mut f: impl FnMut(Value) -> Value) -> bool {
        let Some(&c) = self.index.get(name) else {
            return false;
        };
        for row in &mut self.rows {
            let v = std::mem::replace(&mut row[c], Value::Missing);
            row[c] = f(v);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_renders_empty_and_decimals_keep_point() {
        assert_eq!(Value::Missing.to_field(), "");
        assert_eq!(Value::Int(42).to_field(), "42");
        assert_eq!(Value::Decimal(93.994).to_field(), "93.994");
        assert_eq!(Value::Decimal(1.0).to_field(), "1.0");
        assert_eq!(Value::text("admin").to_field(), "admin");
    }

    #[test]
    fn set_column_appends_then_overwrites() {
        let mut t = CombinedTable::with_columns(vec!["a".into()]);
        t.push_rows(vec![vec![Value::Int(1)], vec![Value::Int(2)]]);

        t.set_column("b", vec![Value::text("x"), Value::Missing]);
        assert_eq!(t.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(t.get(0, "b"), &Value::text("x"));

        t.set_column("a", vec![Value::Int(10), Value::Int(20)]);
        assert_eq!(t.columns().len(), 2);
        assert_eq!(t.get(1, "a"), &Value::Int(20));
        assert_eq!(t.get(1, "nope"), &Value::Missing);
    }

    #[test]
    fn map_column_reports_absence() {
        let mut t = CombinedTable::with_columns(vec!["a".into()]);
        t.push_rows(vec![vec![Value::Int(1)]]);
        assert!(t.map_column("a", |_| Value::Int(7)));
        assert!(!t.map_column("zzz", |v| v));
        assert_eq!(t.get(0, "a"), &Value::Int(7));
    }

    #[test]
    fn column_values_follow_row_order() {
        let mut t = CombinedTable::with_columns(vec!["a".into(), "b".into()]);
        t.push_rows(vec![vec![Value::Int(1), Value::Missing]; 3]);
        t.push_rows(vec![vec![Value::Missing, Value::text("x")]; 2]);
        assert_eq!(t.len(), 5);
        assert_eq!(t.column_values("a").filter(|v| v.is_missing()).count(), 2);
        assert_eq!(t.column_values("zzz").count(), 5);
        assert!(t.column_set().contains("b"));
    }
}
