use std::collections::BTreeSet;
use tracing::debug;

use crate::process::utils::all_numeric;
use crate::table::{CombinedTable, Value};

/// How a resolved source column becomes the canonical column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// yes/no style flag encoded as 1/0. Defaults to 0.
    Flag { positive: &'static str },
    /// Value copied unchanged. Defaults to missing.
    PassThrough,
}

/// A canonical output column and the source columns that may supply it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Candidate source columns, first present wins.
    pub aliases: &'static [&'static str],
    pub rule: Rule,
}

pub const CREDIT_DEFAULT: FieldSpec = FieldSpec {
    name: "credit_default",
    aliases: &["default", "credit_default"],
    rule: Rule::Flag { positive: "yes" },
};

pub const MORTGAGE: FieldSpec = FieldSpec {
    name: "mortgage",
    aliases: &["housing", "mortgage"],
    rule: Rule::Flag { positive: "yes" },
};

pub const PREVIOUS_OUTCOME: FieldSpec = FieldSpec {
    name: "previous_outcome",
    aliases: &["poutcome", "previous_outcome"],
    rule: Rule::Flag {
        positive: "success",
    },
};

pub const CAMPAIGN_OUTCOME: FieldSpec = FieldSpec {
    name: "campaign_outcome",
    aliases: &["y", "campaign_outcome"],
    rule: Rule::Flag { positive: "yes" },
};

pub const NUMBER_CONTACTS: FieldSpec = FieldSpec {
    name: "number_contacts",
    aliases: &["number_contacts", "campaign"],
    rule: Rule::PassThrough,
};

pub const CONTACT_DURATION: FieldSpec = FieldSpec {
    name: "contact_duration",
    aliases: &["contact_duration", "duration"],
    rule: Rule::PassThrough,
};

pub const PREVIOUS_CAMPAIGN_CONTACTS: FieldSpec = FieldSpec {
    name: "previous_campaign_contacts",
    aliases: &["previous_campaign_contacts", "previous"],
    rule: Rule::PassThrough,
};

pub const CONS_PRICE_IDX: FieldSpec = FieldSpec {
    name: "cons_price_idx",
    aliases: &["cons_price_idx", "cons.price.idx"],
    rule: Rule::PassThrough,
};

pub const EURIBOR_THREE_MONTHS: FieldSpec = FieldSpec {
    name: "euribor_three_months",
    aliases: &["euribor_three_months", "euribor3m"],
    rule: Rule::PassThrough,
};

pub const FIELDS: &[FieldSpec] = &[
    CREDIT_DEFAULT,
    MORTGAGE,
    PREVIOUS_OUTCOME,
    CAMPAIGN_OUTCOME,
    NUMBER_CONTACTS,
    CONTACT_DURATION,
    PREVIOUS_CAMPAIGN_CONTACTS,
    CONS_PRICE_IDX,
    EURIBOR_THREE_MONTHS,
];

/// Pick the source column for `field` from the combined table's columns.
pub fn resolve_source(columns: &BTreeSet<String>, field: &FieldSpec) -> Option<&'static str> {
    field
        .aliases
        .iter()
        .copied()
        .find(|alias| columns.contains(*alias))
}

/// Clean the text fields, then materialize every canonical field.
pub fn reconcile(mut table: CombinedTable) -> CombinedTable {
    clean_job(&mut table);
    clean_education(&mut table);

    let columns = table.column_set();
    for field in FIELDS {
        let source = resolve_source(&columns, field);
        debug!(field = field.name, source = ?source, "resolved");
        let values = materialize(&table, field, source);
        table.set_column(field.name, values);
    }
    table
}

/// `admin.` → `admin`, `blue-collar` → `blue_collar`
pub fn clean_job(table: &mut CombinedTable) -> bool {
    table.map_column("job", |v| match v {
        Value::Text(s) => Value::Text(s.replace('.', "").replace('-', "_")),
        other => other,
    })
}

/// `university.degree` → `university_degree`, `unknown` → missing
pub fn clean_education(table: &mut CombinedTable) -> bool {
    table.map_column("education", |v| match v {
        Value::Text(s) => {
            let s = s.replace('.', "_");
            if s == "unknown" {
                Value::Missing
            } else {
                Value::Text(s)
            }
        }
        other => other,
    })
}

/// Build the canonical column from the resolved source, for every row.
/// Rows whose batch lacked the source column read as missing there.
fn materialize(table: &CombinedTable, field: &FieldSpec, source: Option<&str>) -> Vec<Value> {
    match (source, field.rule) {
        (None, Rule::Flag { .. }) => vec![Value::Int(0); table.len()],
        (None, Rule::PassThrough) => vec![Value::Missing; table.len()],
        (Some(src), Rule::PassThrough) => table.column_values(src).cloned().collect(),
        (Some(src), Rule::Flag { positive }) if src == field.name => {
            let values: Vec<&Value> = table.column_values(src).collect();
            normalize_flag(&values, positive)
        }
        (Some(src), Rule::Flag { positive }) => table
            .column_values(src)
            .map(|v| Value::Int(i64::from(v.as_text() == Some(positive))))
            .collect(),
    }
}

/// A column that already carries the canonical name: numbers are truncated
/// to integers as-is, anything else is compared case-insensitively against
/// the positive token.
fn normalize_flag(values: &[&Value], positive: &str) -> Vec<Value> {
    if all_numeric(values.iter().copied()) {
        values
            .iter()
            .map(|v| match v {
                Value::Int(i) => Value::Int(*i),
                Value::Decimal(f) => Value::Int(f.trunc() as i64),
                _ => Value::Int(0),
            })
            .collect()
    } else {
        values
            .iter()
            .map(|v| Value::Int(i64::from(v.to_field().to_lowercase() == positive)))
            .collect()
    }
}
