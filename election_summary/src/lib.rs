/*!
Summaries of first-past-the-post election results.

The input is a flat list of [`ElectionRecord`]s, one per candidate. This crate
derives from it the views that are usually charted after an election:

- the total number of votes per party ([`compute_party_vote_totals`])
- the vote share of the leading parties, the rest being grouped in an
  `Others` bucket ([`compute_pie_summary`])
- the number of seats won by each party ([`compute_party_seat_counts`])
- the candidates with the most votes ([`compute_top_candidates`])

```
use election_summary::*;

let records = vec![
    ElectionRecord::new("Anna", "A", 100, "win"),
    ElectionRecord::new("Bob", "B", 50, "Win"),
    ElectionRecord::new("Clara", "A", 30, "lose"),
];
let summary = run_summary(&records, &SummaryRules::DEFAULT_RULES);
assert_eq!(summary.party_votes.get("A"), Some(130));
assert_eq!(summary.seats.get("A"), Some(1));
```

The sum of all the votes must fit in a `u64`; callers reading untrusted
files are expected to check it.

All the orderings are deterministic: ties are resolved by the order in
which the parties or the candidates first appear in the input.
*/

mod config;
use log::{debug, info};

use std::collections::HashMap;

pub use crate::config::*;

/// Sums the amounts per party.
///
/// The result is sorted by decreasing amount. Parties with the same amount keep
/// the order in which they were first seen.
fn tally_by_party<'a>(items: impl Iterator<Item = (&'a str, u64)>) -> Vec<(String, u64)> {
    let mut positions: HashMap<&'a str, usize> = HashMap::new();
    let mut tally: Vec<(String, u64)> = Vec::new();
    for (party, amount) in items {
        match positions.get(party) {
            Some(idx) => {
                tally[*idx].1 += amount;
            }
            None => {
                positions.insert(party, tally.len());
                tally.push((party.to_string(), amount));
            }
        }
    }
    // sort_by is stable
    tally.sort_by(|(_, a), (_, b)| b.cmp(a));
    tally
}

/// Total number of votes for each party, largest first.
pub fn compute_party_vote_totals(records: &[ElectionRecord]) -> PartyVoteTotals {
    let entries = tally_by_party(records.iter().map(|r| (r.party.as_str(), r.votes)));
    debug!(
        "compute_party_vote_totals: {} records -> {} parties",
        records.len(),
        entries.len()
    );
    PartyVoteTotals { entries }
}

/// Keeps the `top_k` first parties and merges all the other ones into the
/// `Others` bucket.
///
/// The sum of the votes is preserved. The `Others` bucket is present even if
/// there are not more than `top_k` parties, in which case it is zero.
pub fn compute_pie_summary(party_vote_totals: &PartyVoteTotals, top_k: usize) -> PieSummary {
    let top = party_vote_totals.head(top_k).to_vec();
    let others: u64 = party_vote_totals
        .entries
        .iter()
        .skip(top.len())
        .map(|(_, v)| *v)
        .sum();
    debug!(
        "compute_pie_summary: top_k: {} kept: {} others: {}",
        top_k,
        top.len(),
        others
    );
    PieSummary { top, others }
}

/// Number of winning candidates for each party.
///
/// Only the records with a `win` outcome (in any case) are considered, so a
/// party without any winner is absent from the result.
pub fn compute_party_seat_counts(records: &[ElectionRecord]) -> PartySeatCounts {
    let entries = tally_by_party(
        records
            .iter()
            .filter(|r| r.is_win())
            .map(|r| (r.party.as_str(), 1)),
    );
    PartySeatCounts { entries }
}

/// The `top_n` records with the most votes, in decreasing order.
///
/// Candidates with the same number of votes stay in their input order.
pub fn compute_top_candidates(records: &[ElectionRecord], top_n: usize) -> Vec<ElectionRecord> {
    let mut sorted: Vec<&ElectionRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.votes.cmp(&a.votes));
    sorted.into_iter().take(top_n).cloned().collect()
}

/// Computes all the views for a set of records.
///
/// Arguments:
/// * `records` the cleaned records of the election
/// * `rules` the sizes of the truncated views
pub fn run_summary(records: &[ElectionRecord], rules: &SummaryRules) -> ElectionSummary {
    info!(
        "run_summary: Processing {} records, rules: {:?}",
        records.len(),
        rules
    );
    let party_votes = compute_party_vote_totals(records);
    let vote_share = compute_pie_summary(&party_votes, rules.top_pie_parties);
    let seats = compute_party_seat_counts(records);
    let top_candidates = compute_top_candidates(records, rules.top_candidates);

    info!(
        "run_summary: {} parties, {} votes in total, {} seats won by {} parties",
        party_votes.len(),
        party_votes.total(),
        seats.total(),
        seats.len()
    );
    for (party, votes) in party_votes.head(rules.top_bar_parties) {
        debug!("run_summary: {:>12} {}", votes, party);
    }

    ElectionSummary {
        party_votes,
        vote_share,
        seats,
        top_candidates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn rec(name: &str, party: &str, votes: u64, outcome: &str) -> ElectionRecord {
        ElectionRecord::new(name, party, votes, outcome)
    }

    fn sample() -> Vec<ElectionRecord> {
        vec![
            rec("c1", "PTI", 120_000, "win"),
            rec("c2", "PML-N", 98_000, "lose"),
            rec("c3", "PPP", 45_000, "WIN"),
            rec("c4", "PTI", 30_000, "lose"),
            rec("c5", "IND", 98_000, "Win"),
            rec("c6", "MQM", 12_000, "lose"),
            rec("c7", "PML-N", 150_000, "win"),
            rec("c8", "JUI", 7_000, "lose"),
            rec("c9", "TLP", 7_000, "lose"),
            rec("c10", "ANP", 3_000, "win"),
        ]
    }

    fn assert_non_increasing(values: &[u64]) {
        for w in values.windows(2) {
            assert!(w[0] >= w[1], "not sorted: {:?}", values);
        }
    }

    #[test]
    fn party_votes_scenario() {
        init();
        let records = vec![
            rec("x", "A", 100, "win"),
            rec("y", "B", 50, "win"),
            rec("z", "A", 30, "lose"),
        ];
        let totals = compute_party_vote_totals(&records);
        assert_eq!(
            totals.entries,
            vec![("A".to_string(), 130), ("B".to_string(), 50)]
        );
        let seats = compute_party_seat_counts(&records);
        assert_eq!(
            seats.entries,
            vec![("A".to_string(), 1), ("B".to_string(), 1)]
        );
    }

    #[test]
    fn party_votes_conserves_sum_and_is_sorted() {
        let records = sample();
        let totals = compute_party_vote_totals(&records);
        let expected: u64 = records.iter().map(|r| r.votes).sum();
        assert_eq!(totals.total(), expected);
        let values: Vec<u64> = totals.entries.iter().map(|(_, v)| *v).collect();
        assert_non_increasing(&values);
        assert_eq!(totals.entries[0], ("PML-N".to_string(), 248_000));
    }

    #[test]
    fn party_votes_ties_keep_first_seen_order() {
        let records = vec![
            rec("a", "Z", 10, "lose"),
            rec("b", "Y", 10, "lose"),
            rec("c", "X", 20, "lose"),
            rec("d", "W", 10, "lose"),
        ];
        let totals = compute_party_vote_totals(&records);
        let names: Vec<&str> = totals.entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["X", "Z", "Y", "W"]);
    }

    #[test]
    fn party_names_are_case_sensitive() {
        let records = vec![rec("a", "ppp", 1, "win"), rec("b", "PPP", 2, "win")];
        let totals = compute_party_vote_totals(&records);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals.get("ppp"), Some(1));
    }

    #[test]
    fn empty_input() {
        let summary = run_summary(&[], &SummaryRules::DEFAULT_RULES);
        assert!(summary.party_votes.is_empty());
        assert!(summary.seats.is_empty());
        assert!(summary.top_candidates.is_empty());
        assert_eq!(
            summary.vote_share.slices(),
            vec![(OTHERS_LABEL.to_string(), 0)]
        );
    }

    #[test]
    fn pie_scenario() {
        let totals = PartyVoteTotals {
            entries: vec![
                ("A".to_string(), 100),
                ("B".to_string(), 50),
                ("C".to_string(), 30),
                ("D".to_string(), 20),
            ],
        };
        let pie = compute_pie_summary(&totals, 2);
        assert_eq!(
            pie.slices(),
            vec![
                ("A".to_string(), 100),
                ("B".to_string(), 50),
                ("Others".to_string(), 50)
            ]
        );
    }

    #[test]
    fn pie_shape_and_conservation() {
        let totals = compute_party_vote_totals(&sample());
        for top_k in 0..=totals.len() {
            let pie = compute_pie_summary(&totals, top_k);
            assert_eq!(pie.len(), top_k + 1);
            assert_eq!(pie.slices().len(), top_k + 1);
            assert_eq!(pie.total(), totals.total());
        }
    }

    #[test]
    fn pie_with_few_parties_keeps_empty_others() {
        let totals = compute_party_vote_totals(&[rec("a", "A", 5, "win"), rec("b", "B", 3, "lose")]);
        let pie = compute_pie_summary(&totals, 6);
        assert_eq!(pie.top.len(), 2);
        assert_eq!(pie.others, 0);
        assert_eq!(pie.slices().last(), Some(&("Others".to_string(), 0)));
    }

    #[test]
    fn seats_only_contain_winners() {
        let records = sample();
        let seats = compute_party_seat_counts(&records);
        assert!(seats.entries.iter().all(|(_, c)| *c >= 1));
        for (party, _) in seats.entries.iter() {
            assert!(records.iter().any(|r| &r.party == party && r.is_win()));
        }
        // Parties without any win are absent, not zero.
        assert_eq!(seats.get("MQM"), None);
        assert_eq!(seats.get("JUI"), None);
        assert_eq!(seats.total(), 5);
        // All tied at one seat: first-seen order among the winners.
        let names: Vec<&str> = seats.entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["PTI", "PPP", "IND", "PML-N", "ANP"]);
    }

    #[test]
    fn seats_outcome_is_case_insensitive_but_exact() {
        let records = vec![
            rec("a", "A", 1, "WiN"),
            rec("b", "A", 1, "winner"),
            rec("c", "B", 1, " win"),
            rec("d", "B", 1, "win"),
            rec("e", "B", 1, "win"),
        ];
        let seats = compute_party_seat_counts(&records);
        assert_eq!(
            seats.entries,
            vec![("B".to_string(), 2), ("A".to_string(), 1)]
        );
    }

    #[test]
    fn top_candidates_sorted_and_truncated() {
        let records = sample();
        let top = compute_top_candidates(&records, 3);
        let names: Vec<&str> = top.iter().map(|r| r.candidate_name.as_str()).collect();
        // c2 and c5 are tied: c2 comes first in the input.
        assert_eq!(names, vec!["c7", "c1", "c2"]);

        let all = compute_top_candidates(&records, 10);
        assert_eq!(all.len(), 10);
        let values: Vec<u64> = all.iter().map(|r| r.votes).collect();
        assert_non_increasing(&values);
    }

    #[test]
    fn top_candidates_with_fewer_records() {
        let records = vec![rec("a", "A", 1, "lose"), rec("b", "B", 2, "win")];
        let top = compute_top_candidates(&records, 10);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].candidate_name, "b");
    }

    #[test]
    fn top_candidates_is_stable() {
        let records = vec![
            rec("first", "A", 10, "lose"),
            rec("big", "B", 99, "win"),
            rec("second", "C", 10, "lose"),
            rec("third", "A", 10, "lose"),
        ];
        let top = compute_top_candidates(&records, 4);
        let names: Vec<&str> = top.iter().map(|r| r.candidate_name.as_str()).collect();
        assert_eq!(names, vec!["big", "first", "second", "third"]);

        // Moving the unique maximum around does not change the order of the ties.
        let permuted = vec![
            records[0].clone(),
            records[2].clone(),
            records[3].clone(),
            records[1].clone(),
        ];
        assert_eq!(compute_top_candidates(&permuted, 4), top);
    }

    #[test]
    fn pipeline_is_idempotent() {
        let records = sample();
        let rules = SummaryRules {
            top_pie_parties: 3,
            top_candidates: 4,
            top_bar_parties: 2,
        };
        let s1 = run_summary(&records, &rules);
        let s2 = run_summary(&records, &rules);
        assert_eq!(s1, s2);
        assert_eq!(s1.vote_share.len(), 4);
        assert_eq!(s1.top_candidates.len(), 4);
        // The bar limit does not truncate the tables themselves.
        assert_eq!(s1.party_votes.len(), 8);
    }

    #[test]
    fn rules_are_independent() {
        let records = sample();
        let small = SummaryRules {
            top_candidates: 1,
            ..SummaryRules::DEFAULT_RULES
        };
        let s_small = run_summary(&records, &small);
        let s_default = run_summary(&records, &SummaryRules::default());
        assert_eq!(s_small.top_candidates.len(), 1);
        assert_eq!(s_default.top_candidates.len(), 10);
        assert_eq!(s_small.party_votes, s_default.party_votes);
    }
}
