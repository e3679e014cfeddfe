//! Mortality table loader
//!
//! Table files are semicolon-separated with a header row `Alter;qx;qy`
//! (age, male rate, female rate) and use a decimal comma:
//!
//! ```text
//! Alter;qx;qy
//! 0;0,002345;0,001876
//! 1;0,000123;0,000098
//! ```
//!
//! A decimal point is accepted as well. Rows above `MAX_AGE` are dropped.

use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};

use super::{MortalityTable, MAX_AGE};
use crate::error::{ActuarialError, Result};

/// Default directory searched by `load_named_table`
pub const DEFAULT_TABLE_DIR: &str = "data";

const AGE_COLUMN: &str = "Alter";
const MALE_COLUMN: &str = "qx";
const FEMALE_COLUMN: &str = "qy";

/// Load a table from a file; the table is named after the file stem
pub fn load_table(path: &Path) -> Result<MortalityTable> {
    let name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("unnamed")
        .to_string();

    let file = std::fs::File::open(path)?;
    let table = load_table_from_reader(name, file)?;
    log::info!(
        "loaded mortality table '{}' (ages {}-{}) from {}",
        table.name(),
        table.min_age(),
        table.max_age(),
        path.display()
    );
    Ok(table)
}

/// Load `{data_dir}/{name}.csv`
pub fn load_named_table(name: &str, data_dir: &Path) -> Result<MortalityTable> {
    let path = data_dir.join(format!("{}.csv", name));
    if !path.exists() {
        return Err(ActuarialError::InvalidTable(format!(
            "table '{}' not found at {} (expected format '{};{};{}')",
            name,
            path.display(),
            AGE_COLUMN,
            MALE_COLUMN,
            FEMALE_COLUMN
        )));
    }
    load_table(&path)
}

/// Load a table from any reader (file, in-memory buffer)
pub fn load_table_from_reader<R: Read>(name: impl Into<String>, reader: R) -> Result<MortalityTable> {
    let name = name.into();
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(b';')
        .trim(Trim::All)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let age_idx = column_index(&headers, AGE_COLUMN, &name)?;
    let male_idx = column_index(&headers, MALE_COLUMN, &name)?;
    let female_idx = column_index(&headers, FEMALE_COLUMN, &name)?;

    let mut rows = Vec::new();
    let mut total = 0usize;

    for (line, result) in csv_reader.records().enumerate() {
        let record = result?;
        total += 1;

        let age = parse_age(field(&record, age_idx), &name, line)?;
        if age > MAX_AGE {
            continue;
        }
        let male = parse_decimal(field(&record, male_idx), &name, line)?;
        let female = parse_decimal(field(&record, female_idx), &name, line)?;
        rows.push((age, male, female));
    }

    if rows.len() < total {
        log::info!(
            "table '{}': loaded {} of {} rows (ages up to {})",
            name,
            rows.len(),
            total,
            MAX_AGE
        );
    }

    MortalityTable::from_rows(name, rows)
}

fn column_index(headers: &StringRecord, column: &str, table: &str) -> Result<usize> {
    headers.iter().position(|h| h == column).ok_or_else(|| {
        ActuarialError::InvalidTable(format!(
            "table '{}': missing column '{}' (found {:?})",
            table,
            column,
            headers.iter().collect::<Vec<_>>()
        ))
    })
}

fn field(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or("")
}

fn parse_age(raw: &str, table: &str, line: usize) -> Result<u32> {
    raw.parse().map_err(|_| {
        ActuarialError::InvalidTable(format!(
            "table '{}' row {}: invalid age {:?}",
            table,
            line + 1,
            raw
        ))
    })
}

/// Parse a number written with either a decimal comma or a decimal point
fn parse_decimal(raw: &str, table: &str, line: usize) -> Result<f64> {
    raw.replace(',', ".").parse().map_err(|_| {
        ActuarialError::InvalidTable(format!(
            "table '{}' row {}: invalid rate {:?}",
            table,
            line + 1,
            raw
        ))
    })
}
