use log::debug;
use snafu::ensure;

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::config::*;
use crate::weight::VoteWeight;

/// A validated collection of ballots, ready to be tabulated.
///
/// The candidates are all the names that appear on at least one ballot. They are
/// kept in lexical order, which is the order used in every tally and report.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct BallotSet {
    ballots: Vec<Ballot>,
    candidates: Vec<String>,
    total: VoteWeight,
}

impl BallotSet {
    pub fn new(ballots: Vec<Ballot>) -> Result<BallotSet, VotingErrors> {
        for (idx, b) in ballots.iter().enumerate() {
            check_ballot(idx, b)?;
        }
        ensure!(
            !ballots.is_empty(),
            EmptyElectionSnafu {
                reason: "no ballots were cast"
            }
        );
        let candidates: BTreeSet<&String> = ballots.iter().flat_map(|b| b.ranking.iter()).collect();
        ensure!(
            !candidates.is_empty(),
            EmptyElectionSnafu {
                reason: "no candidate is ranked on any ballot"
            }
        );
        let candidates: Vec<String> = candidates.into_iter().cloned().collect();
        let total: VoteWeight = ballots.iter().map(|b| &b.weight).sum();
        debug!(
            "BallotSet::new: {} ballots, candidates: {:?}, total weight: {}",
            ballots.len(),
            candidates,
            total
        );
        Ok(BallotSet {
            ballots,
            candidates,
            total,
        })
    }

    pub fn ballots(&self) -> &[Ballot] {
        &self.ballots
    }

    /// In lexical order.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn total_weight(&self) -> &VoteWeight {
        &self.total
    }
}

/// Checks a single ballot. `idx` is only used to build the error message.
pub(crate) fn check_ballot(idx: usize, ballot: &Ballot) -> Result<(), VotingErrors> {
    ensure!(
        ballot.weight.is_positive(),
        MalformedInputSnafu {
            reason: format!(
                "ballot {}: count must be positive, got {}",
                idx, ballot.weight
            )
        }
    );
    let mut seen: HashSet<&str> = HashSet::new();
    for name in ballot.ranking.iter() {
        ensure!(
            !name.is_empty(),
            MalformedInputSnafu {
                reason: format!("ballot {}: empty candidate name", idx)
            }
        );
        ensure!(
            seen.insert(name.as_str()),
            MalformedInputSnafu {
                reason: format!("ballot {}: candidate {:?} is ranked more than once", idx, name)
            }
        );
    }
    Ok(())
}

/// The votes received by each party in a party-list election.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct PartyVoteMap {
    // Sorted by party name.
    parties: Vec<(String, VoteWeight)>,
}

impl PartyVoteMap {
    pub fn new(entries: Vec<(String, VoteWeight)>) -> Result<PartyVoteMap, VotingErrors> {
        ensure!(
            !entries.is_empty(),
            EmptyElectionSnafu {
                reason: "no party is running"
            }
        );
        let mut parties: BTreeMap<String, VoteWeight> = BTreeMap::new();
        for (name, votes) in entries {
            ensure!(
                !name.is_empty(),
                MalformedInputSnafu {
                    reason: "empty party name"
                }
            );
            ensure!(
                !votes.is_negative(),
                MalformedInputSnafu {
                    reason: format!("party {:?}: negative vote total {}", name, votes)
                }
            );
            ensure!(
                !parties.contains_key(&name),
                MalformedInputSnafu {
                    reason: format!("party {:?} is listed more than once", name)
                }
            );
            parties.insert(name, votes);
        }
        Ok(PartyVoteMap {
            parties: parties.into_iter().collect(),
        })
    }

    /// Sorted by party name.
    pub fn parties(&self) -> &[(String, VoteWeight)] {
        &self.parties
    }

    pub fn total_votes(&self) -> VoteWeight {
        self.parties.iter().map(|(_, v)| v).sum()
    }
}
