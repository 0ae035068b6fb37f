pub use crate::config::*;

use crate::ballot::{check_ballot, BallotSet};
use crate::weight::VoteWeight;

/// A builder for adding votes.
///
/// Every ballot is checked as soon as it is added, so that errors point at the
/// offending ballot.
///
/// ```
/// use election_tally::builder::Builder;
/// use election_tally::{VoteWeight, VotingErrors};
///
/// let mut builder = Builder::new();
/// builder.add_vote_simple(&["Anna", "Bob"])?;
/// builder.add_vote(&["Bob"], VoteWeight::parse_decimal("2.5").unwrap())?;
///
/// let ballots = builder.build()?;
/// assert_eq!(ballots.candidates(), &["Anna", "Bob"]);
///
/// # Ok::<(), VotingErrors>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    _votes: Vec<Ballot>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder { _votes: Vec::new() }
    }

    /// Adds a vote cast by a single voter.
    pub fn add_vote_simple<S: AsRef<str>>(&mut self, candidates: &[S]) -> Result<(), VotingErrors> {
        self.add_vote(candidates, VoteWeight::from_integer(1))
    }

    /// Adds a vote, with a weight attached to it.
    ///
    /// candidates: the list of choices made by the voter, in order. The list may be
    /// empty, in which case the ballot is exhausted from the first round.
    pub fn add_vote<S: AsRef<str>>(
        &mut self,
        candidates: &[S],
        weight: VoteWeight,
    ) -> Result<(), VotingErrors> {
        self.add_ballot(Ballot {
            ranking: candidates.iter().map(|s| s.as_ref().to_string()).collect(),
            weight,
        })
    }

    pub fn add_ballot(&mut self, ballot: Ballot) -> Result<(), VotingErrors> {
        check_ballot(self._votes.len(), &ballot)?;
        self._votes.push(ballot);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self._votes.len()
    }

    pub fn is_empty(&self) -> bool {
        self._votes.is_empty()
    }

    pub fn build(self) -> Result<BallotSet, VotingErrors> {
        BallotSet::new(self._votes)
    }
}
