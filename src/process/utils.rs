use crate::table::Value;

/// Spellings that read as an absent value.
const NA_TOKENS: &[&str] = &["NA", "N/A", "#N/A", "NaN", "nan", "null", "NULL", "None"];

/// Infer a typed value from a CSV cell. The csv reader has already removed
/// field quoting, so only surrounding whitespace is dropped here.
pub fn infer_value(raw: &str) -> Value {
    let s = raw.trim();
    if s.is_empty() || NA_TOKENS.contains(&s) {
        return Value::Missing;
    }
    if let Ok(i) = s.parse::<i64>() {
        return Value::Int(i);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => Value::Decimal(f),
        _ => Value::Text(s.to_string()),
    }
}

/// True when every present value is a number. An all-missing column counts
/// as numeric.
pub fn all_numeric<'a>(values: impl IntoIterator<Item = &'a Value>) -> bool {
    values
        .into_iter()
        .filter(|v| !v.is_missing())
        .all(Value::is_numeric)
}
