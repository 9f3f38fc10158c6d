use std::collections::HashMap;
use tracing::debug;

use crate::table::{Batch, CombinedTable, Value};

pub const CLIENT_ID: &str = "client_id";

/// Concatenate batches in load order and number the rows 1..=N as
/// `client_id`. Returns `None` when there is nothing to combine.
pub fn unify(batches: Vec<Batch>) -> Option<CombinedTable> {
    if batches.is_empty() {
        return None;
    }

    // union of columns, in first-seen order
    let mut columns: Vec<String> = Vec::new();
    let mut position: HashMap<String, usize> = HashMap::new();
    for batch in &batches {
        for h in &batch.table.headers {
            if !position.contains_key(h) {
                position.insert(h.clone(), columns.len());
                columns.push(h.clone());
            }
        }
    }
    let width = columns.len();
    let mut combined = CombinedTable::with_columns(columns);

    for Batch { name, table } in batches {
        let targets: Vec<usize> = table.headers.iter().map(|h| position[h]).collect();
        let rows = table
            .rows
            .into_iter()
            .map(|row| {
                let mut out = vec![Value::Missing; width];
                for (value, &t) in row.into_iter().zip(&targets) {
                    out[t] = value;
                }
                out
            })
            .collect();
        debug!(batch = %name, columns = table.headers.len(), "appending batch");
        combined.push_rows(rows);
    }

    let ids = (1..=combined.len() as i64).map(Value::Int).collect();
    combined.set_column(CLIENT_ID, ids);
    Some(combined)
}
