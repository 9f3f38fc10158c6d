use chrono::Month;
use tracing::warn;

use crate::table::{CombinedTable, Value};

/// Contacts carry no year, they are all placed in this one.
pub const ASSUMED_YEAR: i32 = 2022;

pub const LAST_CONTACT_DATE: &str = "last_contact_date";

/// Three-letter English month code, any case: `"JUL"` → 7
pub fn month_number(code: &str) -> Option<u32> {
    let code = code.trim();
    if code.len() != 3 {
        return None;
    }
    code.parse::<Month>().ok().map(|m| m.number_from_month())
}

/// Day of month from an integer cell or a numeric string.
pub fn day_of_month(value: &Value) -> Option<u32> {
    let day = match value {
        Value::Int(i) => *i,
        Value::Decimal(f) if f.fract() == 0.0 => *f as i64,
        Value::Text(s) => s.trim().parse::<i64>().ok()?,
        _ => return None,
    };
    u32::try_from(day).ok().filter(|d| (1..=31).contains(d))
}

/// Fast build of `"YYYY-MM-DD"` from a month code and a day cell. `None`
/// when the month is unknown or the day is outside 1..=31. No calendar
/// check: `feb` 30 gives `2022-02-30`.
pub fn parse_contact_date(month: &Value, day: &Value) -> Option<String> {
    let month = month_number(month.as_text()?)?;
    let day = day_of_month(day)?;
    Some(format!("{:04}-{:02}-{:02}", ASSUMED_YEAR, month, day))
}

/// Derive `last_contact_date` from the `month` and `day` columns. Rows that
/// cannot be parsed get a missing date and are counted in a warning.
pub fn synthesize_last_contact_date(mut table: CombinedTable) -> CombinedTable {
    let mut unparsed = 0usize;
    let dates: Vec<Value> = (0..table.len())
        .map(|r| {
            match parse_contact_date(table.get(r, "month"), table.get(r, "day")) {
                Some(date) => Value::Text(date),
                None => {
                    unparsed += 1;
                    Value::Missing
                }
            }
        })
        .collect();

    if unparsed > 0 {
        warn!(
            rows = unparsed,
            "{} could not be derived from month/day", LAST_CONTACT_DATE
        );
    }
    table.set_column(LAST_CONTACT_DATE, dates);
    table
}
