use crate::models::smart::SmartAttribute;
use once_cell::sync::Lazy;
use regex::Regex;

static COLUMNS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Columns in a row; anything past RAW_VALUE stays in the last one.
const MAX_COLUMNS: usize = 11;

/// Parse the attribute table of `smartctl -A` output.
///
/// Rows after the `ID#` header are mapped positionally. A row with missing or
/// non-numeric columns still yields a record, with those fields zeroed.
pub fn parse_attributes(out: &str) -> Vec<SmartAttribute> {
    let mut in_table = false;
    let mut attributes = Vec::new();
    for line in out.trim().lines() {
        if line.starts_with("ID#") {
            in_table = true;
            continue;
        }
        if in_table {
            let columns: Vec<&str> = COLUMNS_RE.splitn(line.trim(), MAX_COLUMNS).collect();
            attributes.push(from_columns(&columns));
        }
    }
    attributes
}

fn from_columns(columns: &[&str]) -> SmartAttribute {
    let col = |i: usize| columns.get(i).copied().unwrap_or("");
    let num = |i: usize| col(i).parse().unwrap_or(0);

    SmartAttribute {
        id:              num(0),
        name:            col(1).to_string(),
        flag:            u16::from_str_radix(&col(2).replacen("0x", "", 1), 16).unwrap_or(0),
        value:           num(3),
        worst:           num(4),
        thresh:          num(5),
        attr_type:       col(6).to_string(),
        updated:         col(7).to_string(),
        when_failed:     col(8).to_string(),
        raw_value:       col(9).parse().unwrap_or(0),
        raw_value_notes: columns.get(10).map(|s| s.to_string()),
    }
}
