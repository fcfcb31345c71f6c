use crate::domain::model::{FieldPath, Record, Value};

/// Resolves `path` against `record` and renders the value as a column.
///
/// Never fails: missing keys, missing intermediate documents and nulls all
/// become the empty string, and values without a column representation fall
/// back to their `Display` form.
pub fn resolve(record: &Record, path: &FieldPath) -> String {
    let Some((last, parents)) = path.segments().split_last() else {
        return String::new();
    };

    let mut level = &record.data;
    for key in parents {
        match level.get(key) {
            Some(Value::Map(nested)) => level = nested,
            _ => return String::new(),
        }
    }

    level.get(last).map(stringify).unwrap_or_default()
}

pub fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Int(i) => i.to_string(),
        Value::Float(x) => format_float(*x),
        Value::String(s) => s.clone(),
        Value::List(items) => {
            let strings: Option<Vec<&str>> = items
                .iter()
                .map(|item| match item {
                    Value::String(s) => Some(s.as_str()),
                    _ => None,
                })
                .collect();
            match strings {
                Some(strings) => strings.join("|"),
                None => value.to_string(),
            }
        }
        Value::Bool(_) | Value::Map(_) => value.to_string(),
    }
}

// Whole numbers print without a decimal point, everything else with six
// fractional digits. Loaders depend on this exact shape.
fn format_float(x: f64) -> String {
    if x == 0.0 {
        "0".to_string()
    } else if x.fract() == 0.0 {
        format!("{:.0}", x)
    } else {
        format!("{:.6}", x)
    }
}
