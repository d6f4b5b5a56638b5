use std::collections::{BTreeSet, HashMap};
use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value as produced by the spreadsheet decoders.
/// Grouping uses `BTreeSet` / `BTreeMap` downstream so `CellValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// ISO-8601 date string kept as text.
    Date(String),
    Null,
}

// -- Manual Eq/Ord so we can put CellValue in BTreeSet --
// Equality must agree with `Ord` and `Hash`: `Float(NaN) == Float(NaN)`.

impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                String(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (String(a), String(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::String(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Build a numeric cell, collapsing integral floats to `Integer`.
    ///
    /// Spreadsheets store every number as a double, so `2020` comes back
    /// as `2020.0`; collapsing keeps equality and labels stable across formats.
    pub fn number(v: f64) -> Self {
        if v.is_finite() && v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
            CellValue::Integer(v as i64)
        } else {
            CellValue::Float(v)
        }
    }

    /// Interpret the value as an `f64` for plotting.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// Table – the complete loaded sheet
// ---------------------------------------------------------------------------

/// A parsed sheet: one header row plus data rows of the same width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<CellValue>>,
    /// Header name → first column index carrying that name.
    column_index: HashMap<String, usize>,
}

impl Table {
    /// Build a table, forcing every row to the header width
    /// (short rows are padded with `Null`, long rows truncated).
    pub fn new(headers: Vec<String>, mut rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        for row in &mut rows {
            row.resize(width, CellValue::Null);
        }

        let mut column_index = HashMap::with_capacity(width);
        for (i, name) in headers.iter().enumerate() {
            column_index.entry(name.clone()).or_insert(i);
        }

        Table {
            headers,
            rows,
            column_index,
        }
    }

    /// Build a table from a raw cell grid whose first row holds the headers.
    pub fn from_grid(grid: Vec<Vec<CellValue>>) -> Self {
        let mut rows = grid.into_iter();
        let headers = match rows.next() {
            Some(first) => first.iter().map(header_label).collect(),
            None => return Table::default(),
        };
        Table::new(headers, rows.collect())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Index of the first column called `name`.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.column_index.get(name).copied()
    }

    /// Sorted set of values observed in column `idx`.
    pub fn distinct_values(&self, idx: usize) -> BTreeSet<CellValue> {
        self.rows
            .iter()
            .filter_map(|row| row.get(idx))
            .cloned()
            .collect()
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Header cells are shown as text; empty header cells stay empty.
fn header_label(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> CellValue {
        CellValue::String(v.to_string())
    }

    #[test]
    fn rows_are_forced_to_header_width() {
        let table = Table::new(
            vec!["a".into(), "b".into()],
            vec![
                vec![CellValue::Integer(1)],
                vec![CellValue::Integer(1), CellValue::Integer(2), CellValue::Integer(3)],
            ],
        );
        assert!(table.rows().iter().all(|r| r.len() == 2));
        assert_eq!(table.rows()[0][1], CellValue::Null);
    }

    #[test]
    fn duplicate_headers_resolve_to_first_match() {
        let table = Table::new(vec!["x".into(), "y".into(), "x".into()], vec![]);
        assert_eq!(table.column("x"), Some(0));
        assert_eq!(table.column("y"), Some(1));
        assert_eq!(table.column("z"), None);
    }

    #[test]
    fn from_grid_splits_header_row() {
        let table = Table::from_grid(vec![
            vec![s("Year"), s("Revenue")],
            vec![CellValue::Integer(2020), CellValue::Integer(100)],
        ]);
        assert_eq!(table.headers(), ["Year", "Revenue"]);
        assert_eq!(table.len(), 1);

        let empty = Table::from_grid(Vec::new());
        assert_eq!(empty.width(), 0);
        assert!(empty.is_empty());
    }

    #[test]
    fn distinct_values_are_sorted_and_deduplicated() {
        let table = Table::new(
            vec!["g".into()],
            vec![vec![s("B")], vec![s("A")], vec![s("B")]],
        );
        let values: Vec<_> = table.distinct_values(0).into_iter().collect();
        assert_eq!(values, vec![s("A"), s("B")]);
        assert!(table.distinct_values(7).is_empty());
    }

    #[test]
    fn integral_numbers_collapse_to_integers() {
        assert_eq!(CellValue::number(2020.0), CellValue::Integer(2020));
        assert_eq!(CellValue::number(1.5), CellValue::Float(1.5));
        assert_eq!(CellValue::number(f64::NAN).as_f64().map(f64::is_nan), Some(true));
    }

    #[test]
    fn nan_cells_are_equal_to_each_other() {
        let nan = CellValue::Float(f64::NAN);
        assert_eq!(nan, CellValue::Float(f64::NAN));
        assert_eq!(nan.cmp(&CellValue::Float(f64::NAN)), std::cmp::Ordering::Equal);
        assert_ne!(nan, CellValue::Null);
        assert_ne!(nan, CellValue::Float(1.0));

        let table = Table::new(
            vec!["g".into()],
            vec![vec![nan.clone()], vec![nan.clone()], vec![s("A")]],
        );
        let distinct = table.distinct_values(0);
        assert_eq!(distinct.len(), 2);
        assert!(distinct.contains(&nan));
        assert_eq!(table.rows().iter().filter(|r| r[0] == nan).count(), 2);
    }
}
