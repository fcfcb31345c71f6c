use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A decoded document value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // u64 above i64::MAX and all non-integers
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Value::Map(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

/// Readable fallback used for values that have no column representation
/// (mixed lists, nested documents, booleans).
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("<nil>"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("map[")?;
                for (i, (key, item)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}:{}", key, item)?;
                }
                f.write_str("]")
            }
        }
    }
}

/// One source document, keyed by top-level field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub data: BTreeMap<String, Value>,
}

impl Record {
    pub fn new(data: BTreeMap<String, Value>) -> Self {
        Self { data }
    }

    /// Decodes one JSON document. `null` yields an empty record; any other
    /// non-object document is rejected.
    pub fn from_json_slice(line: &[u8]) -> std::result::Result<Self, serde_json::Error> {
        let data: Option<BTreeMap<String, serde_json::Value>> = serde_json::from_slice(line)?;
        Ok(Self {
            data: data
                .unwrap_or_default()
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect(),
        })
    }
}

/// Traversal through nested documents, e.g. `["address", "city"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Output columns of a table, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldPaths(Vec<FieldPath>);

impl FieldPaths {
    pub fn new(paths: Vec<FieldPath>) -> Self {
        Self(paths)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldPath> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a FieldPaths {
    type Item = &'a FieldPath;
    type IntoIter = std::slice::Iter<'a, FieldPath>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Per-table migration settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TableSpec {
    /// Source collection.
    pub mongo_name: String,
    /// Destination table.
    pub mysql_name: String,
    /// Dotted field names, one per output column.
    pub fields: Vec<String>,
    #[serde(default)]
    pub create_cmd: String,
    #[serde(default)]
    pub after_cmd: String,
}

/// Outcome of one table run.
#[derive(Debug, Clone)]
pub struct TableReport {
    pub mongo_name: String,
    pub mysql_name: String,
    pub rows: u64,
    pub started_at: chrono::DateTime<chrono::Utc>,
    pub elapsed: std::time::Duration,
}

impl TableReport {
    pub fn finished_at(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Duration::from_std(self.elapsed)
            .ok()
            .and_then(|elapsed| self.started_at.checked_add_signed(elapsed))
            .unwrap_or(self.started_at)
    }
}
