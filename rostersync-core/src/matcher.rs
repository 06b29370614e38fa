//! Profile name → roster record resolution.
//!
//! Policy precedence (first hit wins):
//! 1. `Exact`: the derived name is a roster key.
//! 2. `CaseInsensitive`: equal after case folding.
//! 3. `Token`: both names have at least two whitespace tokens and the first
//!    and last tokens agree case-insensitively. Middle names and initials are
//!    ignored.
//!
//! Steps 2 and 3 scan the roster in its iteration order.

use crate::roster::Roster;
use crate::types::EmployeeRecord;

/// Which policy step produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    CaseInsensitive,
    Token,
}

/// Resolve `name` against `roster`. `None` means unmatched, which callers
/// count as a skip.
pub fn match_employee<'r>(
    name: &str,
    roster: &'r Roster,
) -> Option<(&'r EmployeeRecord, MatchKind)> {
    if let Some(record) = roster.get(name) {
        return Some((record, MatchKind::Exact));
    }

    let folded = name.to_lowercase();
    if let Some(record) = roster
        .iter()
        .find(|r| r.name.as_str().to_lowercase() == folded)
    {
        return Some((record, MatchKind::CaseInsensitive));
    }

    let tokens: Vec<&str> = name.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    roster
        .iter()
        .find(|r| {
            let candidate: Vec<&str> = r.name.as_str().split_whitespace().collect();
            candidate.len() >= 2
                && same_token(tokens[0], candidate[0])
                && same_token(tokens[tokens.len() - 1], candidate[candidate.len() - 1])
        })
        .map(|record| (record, MatchKind::Token))
}

fn same_token(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EmployeeName;

    fn rec(name: &str, id: &str) -> EmployeeRecord {
        EmployeeRecord {
            id: id.to_string(),
            name: EmployeeName::from(name),
            status: "Active".to_string(),
            rate: "$1".to_string(),
            profession: "Developer".to_string(),
        }
    }

    #[test]
    fn exact_beats_case_insensitive() {
        let roster: Roster = vec![rec("jane doe", "R1"), rec("Jane Doe", "R2")]
            .into_iter()
            .collect();
        let (hit, kind) = match_employee("Jane Doe", &roster).unwrap();
        assert_eq!(hit.id, "R2");
        assert_eq!(kind, MatchKind::Exact);
    }

    #[test]
    fn case_insensitive_beats_token() {
        let roster: Roster = vec![rec("Jane Q Doe", "TOKEN"), rec("JANE DOE", "FOLD")]
            .into_iter()
            .collect();
        let (hit, kind) = match_employee("jane doe", &roster).unwrap();
        assert_eq!(hit.id, "FOLD");
        assert_eq!(kind, MatchKind::CaseInsensitive);
    }

    #[test]
    fn single_token_names_never_token_match() {
        let roster: Roster = vec![rec("Cher Bono", "R1")].into_iter().collect();
        assert!(match_employee("Cher", &roster).is_none());

        let roster: Roster = vec![rec("Cher", "R1")].into_iter().collect();
        assert!(match_employee("Cher Bono", &roster).is_none());
    }
}
