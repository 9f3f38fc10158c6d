// src/process/mod.rs
pub mod date_parser;
pub mod reconcile;
pub mod unify;
pub mod utils;

use crate::table::{Batch, CombinedTable};

/// Unify, reconcile and date-stamp the loaded batches. Pure: no filesystem
/// access. `None` when there are no batches.
pub fn transform(batches: Vec<Batch>) -> Option<CombinedTable> {
    let table = unify::unify(batches)?;
    let table = reconcile::reconcile(table);
    Some(date_parser::synthesize_last_contact_date(table))
}
