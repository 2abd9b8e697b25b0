// Row cleaning shared by all the readers.

use crate::charts::*;

pub const CANDIDATE_NAME_COLUMN: &str = "candidate_name";
pub const PARTY_COLUMN: &str = "candidate_party";
pub const VOTES_COLUMN: &str = "candidate_votes";
pub const OUTCOME_COLUMN: &str = "outcome";

/// A row as read from the file, before any check.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RawRow {
    pub lineno: usize,
    pub candidate_name: Option<String>,
    pub party: Option<String>,
    pub votes: Option<String>,
    pub outcome: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct LoadedRecords {
    pub records: Vec<ElectionRecord>,
    /// Rows excluded because of a missing field.
    pub dropped: usize,
}

/// The positions of the required columns in the header.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct ColumnIndices {
    candidate_name: usize,
    party: usize,
    votes: usize,
    outcome: usize,
}

impl ColumnIndices {
    pub fn from_header(header: &[String], path: &str) -> ChartResult<ColumnIndices> {
        let find = |name: &str| -> ChartResult<usize> {
            header
                .iter()
                .position(|h| h.trim() == name)
                .context(SourceMalformedSnafu {
                    path,
                    reason: format!("missing column {:?}", name),
                })
        };
        Ok(ColumnIndices {
            candidate_name: find(CANDIDATE_NAME_COLUMN)?,
            party: find(PARTY_COLUMN)?,
            votes: find(VOTES_COLUMN)?,
            outcome: find(OUTCOME_COLUMN)?,
        })
    }

    /// Builds a row from a cell accessor (None for a missing cell).
    pub fn extract(&self, lineno: usize, cell: impl Fn(usize) -> Option<String>) -> RawRow {
        RawRow {
            lineno,
            candidate_name: cell(self.candidate_name),
            party: cell(self.party),
            votes: cell(self.votes),
            outcome: cell(self.outcome),
        }
    }
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.to_string())
}

// Empty and blank cells count as missing.
fn present(cell: &Option<String>) -> Option<&String> {
    cell.as_ref().filter(|s| !s.trim().is_empty())
}

/// Reads a vote count. Integral floats (`1234.0`) are accepted since
/// spreadsheets and some exports write all numbers this way.
pub fn parse_votes(s: &str) -> Option<u64> {
    let s = s.trim();
    if let Ok(x) = s.parse::<u64>() {
        return Some(x);
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => {
            Some(f as u64)
        }
        _ => None,
    }
}

/// Turns the rows into records.
///
/// Rows with a missing field are dropped and counted. A vote count that is
/// present but not a non-negative integer is an error, and so is a total
/// number of votes that does not fit in a `u64`.
pub fn clean_rows(path: &str, rows: Vec<RawRow>) -> ChartResult<LoadedRecords> {
    let mut records: Vec<ElectionRecord> = Vec::new();
    let mut dropped: usize = 0;
    // Any party sum is bounded by this total.
    let mut total_votes: u64 = 0;
    for row in rows.iter() {
        let party = row.party.as_ref().map(|p| p.trim().to_string());
        let fields = (
            present(&row.candidate_name),
            present(&party),
            present(&row.votes),
            present(&row.outcome),
        );
        match fields {
            (Some(name), Some(party), Some(votes), Some(outcome)) => {
                let votes = match parse_votes(votes) {
                    Some(v) => v,
                    None => {
                        return SourceMalformedSnafu {
                            path,
                            reason: format!("line {}: invalid vote count {:?}", row.lineno, votes),
                        }
                        .fail();
                    }
                };
                total_votes = match total_votes.checked_add(votes) {
                    Some(t) => t,
                    None => {
                        return SourceMalformedSnafu {
                            path,
                            reason: format!("line {}: total number of votes too large", row.lineno),
                        }
                        .fail();
                    }
                };
                records.push(ElectionRecord {
                    candidate_name: name.clone(),
                    party: party.clone(),
                    votes,
                    outcome: outcome.clone(),
                });
            }
            _ => {
                debug!("clean_rows: line {}: dropping incomplete row {:?}", row.lineno, row);
                dropped += 1;
            }
        }
    }
    Ok(LoadedRecords { records, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|s| s.to_string()).collect()
    }

    fn row(lineno: usize, name: &str, party: &str, votes: &str, outcome: &str) -> RawRow {
        let cell = |s: &str| Some(s.to_string());
        RawRow {
            lineno,
            candidate_name: cell(name),
            party: cell(party),
            votes: cell(votes),
            outcome: cell(outcome),
        }
    }

    #[test]
    fn columns_in_any_order() {
        let h = header(&["constituency", "outcome", " candidate_votes", "candidate_name", "candidate_party"]);
        let cols = ColumnIndices::from_header(&h, "x.csv").unwrap();
        let cells = ["NA-1", "win", "100", "Anna", "PTI"];
        let r = cols.extract(2, |idx| cells.get(idx).map(|s| s.to_string()));
        assert_eq!(r, row(2, "Anna", "PTI", "100", "win"));
    }

    #[test]
    fn missing_column_is_malformed() {
        let h = header(&["candidate_name", "candidate_party", "outcome"]);
        let res = ColumnIndices::from_header(&h, "x.csv");
        assert!(matches!(res, Err(ChartError::SourceMalformed { .. })));
    }

    #[test]
    fn vote_counts() {
        assert_eq!(parse_votes("1234"), Some(1234));
        assert_eq!(parse_votes(" 1234.0 "), Some(1234));
        assert_eq!(parse_votes("12.5"), None);
        assert_eq!(parse_votes("-3"), None);
        assert_eq!(parse_votes("many"), None);
        assert_eq!(parse_votes("NaN"), None);
    }

    #[test]
    fn cleaning() {
        let mut incomplete = row(4, "Clara", "PPP", "", "lose");
        incomplete.votes = None;
        let rows = vec![
            row(2, "Anna", "  PTI ", "100", "win"),
            row(3, "Bob", "   ", "50", "lose"),
            incomplete,
            row(5, "Dan", "PML-N", "", "lose"),
            row(6, "Eve", "PML-N", "70.0", "WIN"),
        ];
        let loaded = clean_rows("x.csv", rows).unwrap();
        assert_eq!(loaded.dropped, 3);
        assert_eq!(
            loaded.records,
            vec![
                ElectionRecord::new("Anna", "PTI", 100, "win"),
                ElectionRecord::new("Eve", "PML-N", 70, "WIN"),
            ]
        );
    }

    #[test]
    fn vote_total_overflow_is_malformed() {
        let max = u64::MAX.to_string();
        let rows = vec![
            row(2, "Anna", "A", max.as_str(), "win"),
            row(3, "Bob", "A", "1", "lose"),
        ];
        let res = clean_rows("x.csv", rows);
        assert!(matches!(res, Err(ChartError::SourceMalformed { .. })));

        // The largest total that fits is accepted.
        let rows = vec![
            row(2, "Anna", "A", max.as_str(), "win"),
            row(3, "Bob", "B", "0", "lose"),
        ];
        let loaded = clean_rows("x.csv", rows).unwrap();
        let summary = run_summary(&loaded.records, &SummaryRules::DEFAULT_RULES);
        assert_eq!(summary.party_votes.total(), u64::MAX);
    }

    #[test]
    fn bad_vote_count_is_malformed() {
        let rows = vec![row(2, "Anna", "PTI", "1,000", "win")];
        let res = clean_rows("x.csv", rows);
        assert!(matches!(res, Err(ChartError::SourceMalformed { .. })));
    }
}
