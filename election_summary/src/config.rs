// ********* Input data structures ***********

/// The label of the synthetic entry that collects the parties left out of a
/// top-K selection.
pub const OTHERS_LABEL: &str = "Others";

/// The outcome value (compared without case) that marks a won seat.
pub const WIN_OUTCOME: &str = "win";

/// One row of the results table: a candidate running for a party in a
/// constituency.
///
/// All the fields are required. Rows that miss one of them are excluded by the
/// readers before they reach this library.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct ElectionRecord {
    pub candidate_name: String,
    /// Already trimmed of surrounding whitespace.
    pub party: String,
    pub votes: u64,
    /// Free-form outcome. Only `win` (in any case) has a meaning.
    pub outcome: String,
}

impl ElectionRecord {
    pub fn new(candidate_name: &str, party: &str, votes: u64, outcome: &str) -> ElectionRecord {
        ElectionRecord {
            candidate_name: candidate_name.to_string(),
            party: party.to_string(),
            votes,
            outcome: outcome.to_string(),
        }
    }

    pub fn is_win(&self) -> bool {
        self.outcome.to_lowercase() == WIN_OUTCOME
    }
}

// ******** Output data structures *********

/// Total votes per party, in descending order of votes.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PartyVoteTotals {
    pub entries: Vec<(String, u64)>,
}

impl PartyVoteTotals {
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, v)| *v).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The first `n` parties (or all of them if there are fewer).
    pub fn head(&self, n: usize) -> &[(String, u64)] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn get(&self, party: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(name, _)| name == party)
            .map(|(_, v)| *v)
    }
}

/// The vote share: the leading parties followed by a single `Others` bucket.
///
/// The `Others` bucket is always present, even when it is empty, so that the
/// consumers get a fixed shape.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PieSummary {
    pub top: Vec<(String, u64)>,
    pub others: u64,
}

impl PieSummary {
    /// All the slices, `Others` last.
    pub fn slices(&self) -> Vec<(String, u64)> {
        let mut res = self.top.clone();
        res.push((OTHERS_LABEL.to_string(), self.others));
        res
    }

    pub fn len(&self) -> usize {
        self.top.len() + 1
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn total(&self) -> u64 {
        self.top.iter().map(|(_, v)| *v).sum::<u64>() + self.others
    }
}

/// Number of won seats per party, in descending order.
/// A party without any seat is not listed.
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct PartySeatCounts {
    pub entries: Vec<(String, u64)>,
}

impl PartySeatCounts {
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, v)| *v).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn head(&self, n: usize) -> &[(String, u64)] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn get(&self, party: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(name, _)| name == party)
            .map(|(_, v)| *v)
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct ElectionSummary {
    pub party_votes: PartyVoteTotals,
    pub vote_share: PieSummary,
    pub seats: PartySeatCounts,
    pub top_candidates: Vec<ElectionRecord>,
}

// ********* Configuration **********

/// The sizes of the truncated views.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct SummaryRules {
    /// Number of parties with their own slice in the vote share. The other
    /// parties are merged into `Others`.
    pub top_pie_parties: usize,
    pub top_candidates: usize,
    /// Number of parties displayed in the votes and seats charts. This only
    /// affects the presentation: the full tables are always computed.
    pub top_bar_parties: usize,
}

impl SummaryRules {
    pub const DEFAULT_RULES: SummaryRules = SummaryRules {
        top_pie_parties: 6,
        top_candidates: 10,
        top_bar_parties: 15,
    };
}

impl Default for SummaryRules {
    fn default() -> Self {
        SummaryRules::DEFAULT_RULES
    }
}
