//! Cable-length table parser
//!
//! The length table arrives as loosely formatted CSV exported from a
//! spreadsheet: the delimiter may be a comma, tab or semicolon, and lengths
//! may use a decimal comma. Malformed rows are skipped and counted.

use std::collections::HashMap;

use crate::normalize::normalize_id;

/// Header cells accepted as the identifier column
const ID_HEADERS: [&str; 2] = ["id", "di"];

/// Substring identifying the length column
const LENGTH_HEADER: &str = "length";

/// Cable lengths keyed by normalized inverter identifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LengthTable {
    entries: HashMap<String, f64>,

    /// Data rows dropped because the identifier or length was unusable
    pub skipped_rows: usize,
}

impl LengthTable {
    /// Length in meters for a normalized identifier
    pub fn get(&self, normalized_id: &str) -> Option<f64> {
        self.entries.get(normalized_id).copied()
    }

    pub fn insert(&mut self, normalized_id: impl Into<String>, meters: f64) {
        self.entries.insert(normalized_id.into(), meters);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of every length in the table
    pub fn total_meters(&self) -> f64 {
        self.entries.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(id, meters)| (id.as_str(), *meters))
    }
}

impl FromIterator<(String, f64)> for LengthTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect(), skipped_rows: 0 }
    }
}

/// Pick the delimiter from the header line: comma, then tab, then semicolon
pub fn detect_delimiter(line: &str) -> char {
    [',', '\t', ';'].into_iter().find(|d| line.contains(*d)).unwrap_or(',')
}

/// Parse a cable-length table.
///
/// The first non-empty line is the header; a leading byte-order mark is
/// ignored. Later rows with the same normalized identifier overwrite earlier
/// ones.
pub fn parse_lengths(text: &str) -> LengthTable {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut rows = text.lines().map(str::trim).filter(|row| !row.is_empty());

    let Some(header) = rows.next() else {
        return LengthTable::default();
    };

    let delimiter = detect_delimiter(header);
    let header_cells: Vec<String> =
        header.split(delimiter).map(|cell| cell.trim().to_lowercase()).collect();

    let id_index = header_cells
        .iter()
        .position(|cell| ID_HEADERS.contains(&cell.as_str()))
        .unwrap_or(0);
    let length_index =
        header_cells.iter().position(|cell| cell.contains(LENGTH_HEADER)).unwrap_or(1);
    let length_is_last = length_index + 1 == header_cells.len();

    let mut table = LengthTable::default();

    for row in rows {
        let cells: Vec<&str> = row.split(delimiter).map(str::trim).collect();

        let normalized = cells.get(id_index).map(|id| normalize_id(id)).unwrap_or_default();

        let recovered;
        let raw_length = if delimiter == ',' && length_is_last && cells.len() == header_cells.len() + 1
        {
            recovered =
                recover_decimal_comma(cells.get(length_index).copied(), cells.last().copied());
            recovered.as_deref().or(cells.get(length_index).copied())
        } else {
            cells.get(length_index).copied()
        };

        match (normalized.is_empty(), raw_length.and_then(parse_meters)) {
            (false, Some(meters)) => table.insert(normalized, meters),
            _ => {
                tracing::debug!("Skipping length row '{}'", row);
                table.skipped_rows += 1;
            }
        }
    }

    tracing::debug!(
        "Parsed {} cable lengths ({} rows skipped)",
        table.len(),
        table.skipped_rows
    );
    table
}

/// A comma-delimited row with one surplus cell after the length column most
/// likely split a decimal comma: `7,3` became `7` and `3`.
fn recover_decimal_comma(integer: Option<&str>, fraction: Option<&str>) -> Option<String> {
    let (integer, fraction) = (integer?, fraction?);
    let all_digits = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit());
    if all_digits(integer) && all_digits(fraction) {
        Some(format!("{}.{}", integer, fraction))
    } else {
        None
    }
}

/// Parse a length cell, accepting a decimal comma. An empty cell is 0 m.
/// Negative, NaN and infinite values are rejected.
fn parse_meters(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0.0);
    }
    let value: f64 = raw.replacen(',', ".", 1).parse().ok()?;
    (value.is_finite() && value >= 0.0).then_some(value)
}
