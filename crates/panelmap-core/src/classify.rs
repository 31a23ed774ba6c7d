//! Role classification of point labels
//!
//! The label layer mixes inverter tags (`"INV-01"`) and table/panel-string tags
//! (`"INV-01-STR3"`). Two heuristics are used: a loose substring test when
//! snapping labels to lines, and a stricter anchored suffix test when
//! partitioning the layer.

use serde::{Deserialize, Serialize};

/// Marker of a panel-string label
const STRING_MARKER: &str = "-STR";

/// Marker of an inverter label
const INVERTER_MARKER: &str = "INV";

/// Role of a point label, derived from its text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    InverterLabel,
    TableLabel,
    Unclassified,
}

impl Role {
    /// Classify by substring: `-STR` anywhere makes a table label, otherwise
    /// `INV` makes an inverter label. Case-sensitive.
    pub fn classify(text: &str) -> Self {
        if text.contains(STRING_MARKER) {
            Role::TableLabel
        } else if text.contains(INVERTER_MARKER) {
            Role::InverterLabel
        } else {
            Role::Unclassified
        }
    }

    /// Classify an optional text property; missing text is unclassified
    pub fn classify_text(text: Option<&str>) -> Self {
        text.map(Self::classify).unwrap_or(Role::Unclassified)
    }

    pub fn is_label(&self) -> bool {
        !matches!(self, Role::Unclassified)
    }
}

/// Anchored test for table label identifiers: `-STR` followed by one or more
/// digits at the very end, case-insensitive.
pub fn is_table_label_id(id: &str) -> bool {
    let digits = id.len() - id.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return false;
    }

    let head = &id[..id.len() - digits];
    let marker_len = STRING_MARKER.len();
    head.len() >= marker_len
        && head.is_char_boundary(head.len() - marker_len)
        && head[head.len() - marker_len..].eq_ignore_ascii_case(STRING_MARKER)
}
