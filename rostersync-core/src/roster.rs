//! Roster table parsing.
//!
//! # Format
//!
//! ```text
//! Some preamble text.
//!
//! | Employee ID | Name     | Status | Rate | Profession |
//! |-------------|----------|--------|------|------------|
//! | E100        | Jane Doe | Active | $20  | Developer  |
//!
//! Anything after the first non-table line is ignored.
//! ```
//!
//! Table mode opens at the header row and closes at the first following line
//! that does not start with `|`. Rows with fewer than five cells are dropped;
//! cells past the fifth are ignored.

use std::collections::HashMap;

use crate::types::{EmployeeName, EmployeeRecord};

/// First header cell that opens the roster table.
pub const HEADER_MARKER: &str = "Employee ID";

/// Separator row prefix (`|---|---|`).
pub const SEPARATOR_PREFIX: &str = "|---";

const MIN_CELLS: usize = 5;

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// Insertion-ordered map of employee name → record.
///
/// Inserting a name that is already present replaces the stored record but
/// keeps the original position, so iteration order is the order in which each
/// name first appeared in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roster {
    records: Vec<EmployeeRecord>,
    index: HashMap<EmployeeName, usize>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record`, returning the record it replaced if the name was
    /// already present.
    pub fn insert(&mut self, record: EmployeeRecord) -> Option<EmployeeRecord> {
        match self.index.get(&record.name) {
            Some(&slot) => Some(std::mem::replace(&mut self.records[slot], record)),
            None => {
                self.index.insert(record.name.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    /// Exact-key lookup.
    pub fn get(&self, name: &str) -> Option<&EmployeeRecord> {
        self.index
            .get(&EmployeeName::from(name))
            .map(|&slot| &self.records[slot])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in first-appearance order.
    pub fn iter(&self) -> impl Iterator<Item = &EmployeeRecord> {
        self.records.iter()
    }
}

impl FromIterator<EmployeeRecord> for Roster {
    fn from_iter<I: IntoIterator<Item = EmployeeRecord>>(iter: I) -> Self {
        let mut roster = Roster::new();
        for record in iter {
            roster.insert(record);
        }
        roster
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a EmployeeRecord;
    type IntoIter = std::slice::Iter<'a, EmployeeRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse result: the roster plus every name that appeared more than once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedRoster {
    pub roster: Roster,
    /// Names overwritten by a later row, in the order the duplicate was seen.
    pub duplicates: Vec<EmployeeName>,
}

/// Parse the roster markdown table out of `content`.
pub fn parse_roster(content: &str) -> ParsedRoster {
    let mut parsed = ParsedRoster::default();
    let mut in_table = false;

    for line in content.lines() {
        let trimmed = line.trim();

        if !in_table {
            if is_header_row(trimmed) {
                in_table = true;
            }
            continue;
        }

        if trimmed.starts_with(SEPARATOR_PREFIX) {
            continue;
        }
        if !trimmed.starts_with('|') {
            break;
        }

        let cells = split_cells(trimmed);
        if cells.len() < MIN_CELLS {
            continue;
        }
        let record = EmployeeRecord {
            id: cells[0].to_string(),
            name: EmployeeName::from(cells[1]),
            status: cells[2].to_string(),
            rate: cells[3].to_string(),
            profession: cells[4].to_string(),
        };
        if parsed.roster.insert(record.clone()).is_some() {
            parsed.duplicates.push(record.name);
        }
    }

    parsed
}

fn is_header_row(trimmed: &str) -> bool {
    trimmed.starts_with('|')
        && split_cells(trimmed)
            .first()
            .is_some_and(|cell| *cell == HEADER_MARKER)
}

/// Split a `|`-delimited row into trimmed cells, discarding the text before
/// the first pipe and after the last one.
fn split_cells(row: &str) -> Vec<&str> {
    let parts: Vec<&str> = row.split('|').collect();
    if parts.len() < 2 {
        return Vec::new();
    }
    parts[1..parts.len() - 1].iter().map(|p| p.trim()).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
