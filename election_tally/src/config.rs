// ********* Input data structures ***********

use snafu::Snafu;

use crate::weight::VoteWeight;

/// A weighted ranking of candidates, as cast by one or more voters.
///
/// In most cases, it is easier to go through the [`crate::builder::Builder`], which
/// checks the ballots and assembles them into a [`crate::BallotSet`].
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Ballot {
    /// Candidates, most preferred first. May be empty.
    pub ranking: Vec<String>,
    /// The number of voters who cast this exact ranking. Strictly positive.
    pub weight: VoteWeight,
}

// ******** Output data structures *********

/// Where the votes of a candidate went when they left the candidate's pile.
///
/// For an eliminated candidate this is their whole tally; for an elected candidate
/// under STV this is the surplus above the quota.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct TransferStats {
    pub name: String,
    pub transfers: Vec<(String, VoteWeight)>,
    pub exhausted: VoteWeight,
}

impl TransferStats {
    /// The total weight that left the candidate.
    pub fn total(&self) -> VoteWeight {
        self.transfers.iter().map(|(_, w)| w).sum::<VoteWeight>() + self.exhausted.clone()
    }
}

/// The head-to-head comparison of the two weakest candidates in a bottoms-up
/// two-round election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PairwiseStats {
    pub first: (String, VoteWeight),
    pub second: (String, VoteWeight),
    /// Usually one candidate. Both when they are tied head-to-head and on the tally
    /// and every tied candidate is eliminated.
    pub losers: Vec<String>,
}

/// Statistics for one round
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RoundStats {
    pub round: u32,
    /// The tally of every continuing candidate, in candidate order.
    pub tally: Vec<(String, VoteWeight)>,
    /// Cumulative exhausted weight at the time of the tally.
    pub exhausted: VoteWeight,
    /// The Droop quota of this round (STV only).
    pub quota: Option<VoteWeight>,
    /// Elected candidates, in order of election. Transfers are surplus transfers.
    pub tally_results_elected: Vec<TransferStats>,
    pub tally_result_eliminated: Vec<TransferStats>,
    pub pairwise: Option<PairwiseStats>,
}

impl RoundStats {
    pub(crate) fn new(round: u32, tally: Vec<(String, VoteWeight)>, exhausted: VoteWeight) -> Self {
        RoundStats {
            round,
            tally,
            exhausted,
            quota: None,
            tally_results_elected: Vec::new(),
            tally_result_eliminated: Vec::new(),
            pairwise: None,
        }
    }

    /// Sum of the tallies of the continuing candidates.
    pub fn active_weight(&self) -> VoteWeight {
        self.tally.iter().map(|(_, w)| w).sum()
    }
}

/// The outcome of a single-winner elimination election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VotingResult {
    pub winner: String,
    /// The winner's tally must be strictly above this weight in the final round:
    /// half of the non-exhausted weight.
    pub threshold: VoteWeight,
    pub round_stats: Vec<RoundStats>,
}

/// An elected candidate in a multi-seat election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ElectedCandidate {
    pub name: String,
    pub round: u32,
    /// The weight that stays with the candidate: the quota when elected by quota,
    /// the full tally when elected by default.
    pub retained: VoteWeight,
    pub by_default: bool,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct StvResult {
    /// In order of election.
    pub elected: Vec<ElectedCandidate>,
    pub seats: u32,
    pub round_stats: Vec<RoundStats>,
}

impl StvResult {
    pub fn winners(&self) -> Vec<String> {
        self.elected.iter().map(|e| e.name.clone()).collect()
    }
}

/// One step of a divisor method: the seat that went to the highest quotient.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SeatAward {
    /// 1-based
    pub seat: u32,
    pub party: String,
    pub divisor: u64,
    pub quotient: VoteWeight,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Apportionment {
    /// Every party with its votes and seats, sorted by party name.
    pub parties: Vec<(String, VoteWeight, u32)>,
    pub awards: Vec<SeatAward>,
}

impl Apportionment {
    pub fn seats_of(&self, party: &str) -> Option<u32> {
        self.parties
            .iter()
            .find(|(name, _, _)| name == party)
            .map(|(_, _, seats)| *seats)
    }

    pub fn total_seats(&self) -> u32 {
        self.parties.iter().map(|(_, _, s)| *s).sum()
    }
}

/// Errors that prevent an election from being tabulated.
#[derive(Eq, PartialEq, Debug, Clone, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum VotingErrors {
    #[snafu(display("Malformed input: {reason}"))]
    MalformedInput { reason: String },

    #[snafu(display("Empty election: {reason}"))]
    EmptyElection { reason: String },

    #[snafu(display("Invalid seat count {seats}: {reason}"))]
    InvalidSeatCount { seats: u32, reason: String },

    #[snafu(display("No unique winner: {} remain tied", tied.join(", ")))]
    NoUniqueWinner { tied: Vec<String> },
}

// ********* Configuration **********

/// How to pick among candidates tied for the lowest tally.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TieBreakMode {
    /// Eliminate every tied candidate in the same round. If nobody would be left,
    /// the election has no unique winner.
    EliminateAll,
    /// Eliminate the tied candidate whose name sorts last.
    UseCandidateOrder,
    /// Eliminate the tied candidate that comes first in a seeded permutation.
    /// The permutation is derived from a SHA-256 digest of the seed, the round
    /// number and the candidate name, so it is reproducible but hard to guess.
    Random(u32),
}

/// The two single-winner elimination flavours.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum EliminationMode {
    /// Eliminate the lowest candidate(s) every round.
    Standard,
    /// Bottoms-up two-round: the two lowest candidates face each other head-to-head
    /// and the loser is eliminated.
    BottomsUpTwoRound,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteRules {
    pub tiebreak_mode: TieBreakMode,
}

impl VoteRules {
    pub const DEFAULT_RULES: VoteRules = VoteRules {
        tiebreak_mode: TieBreakMode::EliminateAll,
    };
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ApportionmentRules {
    /// Requests for more seats than this are rejected.
    pub max_seats: u32,
}

impl ApportionmentRules {
    pub const DEFAULT_RULES: ApportionmentRules = ApportionmentRules { max_seats: 10_000 };
}
