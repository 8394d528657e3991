use serde::Serialize;
use std::fmt;

/// One value of a flat output row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Serializes a nested JSON value (usage thresholds, ranges) as text.
    pub fn json(value: Option<&serde_json::Value>) -> Self {
        match value {
            None | Some(serde_json::Value::Null) => Cell::Null,
            Some(value) => Cell::Text(value.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => Ok(()),
            Cell::Bool(value) => write!(f, "{value}"),
            Cell::Int(value) => write!(f, "{value}"),
            Cell::Real(value) => write!(f, "{value}"),
            Cell::Text(value) => f.write_str(value),
        }
    }
}

impl From<bool> for Cell {
    fn from(value: bool) -> Self {
        Cell::Bool(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Real(value)
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<&String> for Cell {
    fn from(value: &String) -> Self {
        Cell::Text(value.clone())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl<T> From<Option<T>> for Cell
where
    T: Into<Cell>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Cell::Null, Into::into)
    }
}

/// A flat row of one output category.
///
/// `columns` and `cells` must line up one to one. Tables keyed by carpark
/// put `park_id` first, it acts as the index column.
pub trait Record: Serialize {
    fn columns() -> &'static [&'static str]
    where
        Self: Sized;

    fn cells(&self) -> Vec<Cell>;
}

#[test]
fn cell_display() {
    assert_eq!(Cell::Null.to_string(), "");
    assert_eq!(Cell::Bool(true).to_string(), "true");
    assert_eq!(Cell::Int(-1).to_string(), "-1");
    assert_eq!(Cell::Real(2.5).to_string(), "2.5");
    assert_eq!(Cell::from(Some("G/F")).to_string(), "G/F");
    assert!(Cell::from(None::<i64>).is_null());
}

#[test]
fn nested_json_as_text() {
    let value = serde_json::json!([{ "hours": 1, "price": 20 }]);
    assert_eq!(
        Cell::json(Some(&value)),
        Cell::Text(r#"[{"hours":1,"price":20}]"#.into())
    );
    assert!(Cell::json(None).is_null());
}
