// Round machinery shared by the elimination and STV engines.

use log::debug;
use snafu::ensure;

use std::collections::{BTreeMap, BTreeSet};

use crate::ballot::BallotSet;
use crate::config::*;
use crate::weight::VoteWeight;

/// Candidates are numbered in lexical order of their names, so ordering by id is
/// ordering by name.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Ord, PartialOrd)]
pub(crate) struct CandidateId(pub(crate) u32);

pub(crate) type Tally = BTreeMap<CandidateId, VoteWeight>;

// A ballot during tabulation. The ranking itself never changes: only the cursor moves
// past candidates that stopped running, and the weight shrinks after a surplus transfer.
#[derive(Eq, PartialEq, Debug, Clone)]
pub(crate) struct VoteInternal {
    ranks: Vec<CandidateId>,
    weight: VoteWeight,
    // Index of the current preference. Equal to ranks.len() once exhausted.
    cursor: usize,
}

impl VoteInternal {
    fn current(&self) -> Option<CandidateId> {
        self.ranks.get(self.cursor).copied()
    }

    fn advance(&mut self, continuing: &BTreeSet<CandidateId>) -> Option<CandidateId> {
        while let Some(cid) = self.ranks.get(self.cursor) {
            if continuing.contains(cid) {
                return Some(*cid);
            }
            self.cursor += 1;
        }
        None
    }

    fn position(&self, cid: CandidateId) -> Option<usize> {
        self.ranks.iter().position(|c| *c == cid)
    }
}

/// Where the votes of one candidate went.
#[derive(Eq, PartialEq, Debug, Clone)]
pub(crate) struct Transfer {
    pub(crate) to: Tally,
    pub(crate) exhausted: VoteWeight,
}

/// The round state of a ranked election.
pub(crate) struct Contest {
    names: Vec<String>,
    votes: Vec<VoteInternal>,
    total: VoteWeight,
}

impl Contest {
    pub(crate) fn new(ballots: &BallotSet) -> Contest {
        let names: Vec<String> = ballots.candidates().to_vec();
        let ids: BTreeMap<&str, CandidateId> = names
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.as_str(), CandidateId(idx as u32)))
            .collect();
        let votes: Vec<VoteInternal> = ballots
            .ballots()
            .iter()
            .map(|b| VoteInternal {
                ranks: b
                    .ranking
                    .iter()
                    .filter_map(|name| ids.get(name.as_str()).copied())
                    .collect(),
                weight: b.weight.clone(),
                cursor: 0,
            })
            .collect();
        Contest {
            names,
            votes,
            total: ballots.total_weight().clone(),
        }
    }

    pub(crate) fn candidates(&self) -> BTreeSet<CandidateId> {
        (0..self.names.len() as u32).map(CandidateId).collect()
    }

    pub(crate) fn name(&self, cid: CandidateId) -> &str {
        &self.names[cid.0 as usize]
    }

    pub(crate) fn names(&self, cids: &[CandidateId]) -> Vec<String> {
        cids.iter().map(|cid| self.name(*cid).to_string()).collect()
    }

    pub(crate) fn total(&self) -> &VoteWeight {
        &self.total
    }

    /// The current tally. Every continuing candidate gets an entry, even without votes.
    pub(crate) fn tally(&self, continuing: &BTreeSet<CandidateId>) -> Tally {
        let mut tally: Tally = continuing
            .iter()
            .map(|cid| (*cid, VoteWeight::zero()))
            .collect();
        for v in self.votes.iter() {
            if let Some(w) = v.current().and_then(|cid| tally.get_mut(&cid)) {
                *w += &v.weight;
            }
        }
        tally
    }

    /// The weight of all the ballots that have no preference left.
    pub(crate) fn exhausted(&self) -> VoteWeight {
        self.votes
            .iter()
            .filter(|v| v.current().is_none())
            .map(|v| &v.weight)
            .sum()
    }

    /// Moves every ballot sitting with `from` to its next continuing preference.
    ///
    /// `from` must already be removed from `continuing`. With `scale = (numer, denom)`,
    /// each ballot only carries `numer / denom` of its weight along (surplus transfer);
    /// the rest stays with `from`.
    pub(crate) fn transfer(
        &mut self,
        from: CandidateId,
        continuing: &BTreeSet<CandidateId>,
        scale: Option<(&VoteWeight, &VoteWeight)>,
    ) -> Transfer {
        let mut to: Tally = BTreeMap::new();
        let mut exhausted = VoteWeight::zero();
        for v in self.votes.iter_mut() {
            if v.current() != Some(from) {
                continue;
            }
            if let Some((numer, denom)) = scale {
                v.weight = v.weight.scale(numer, denom);
            }
            match v.advance(continuing) {
                Some(next) => {
                    *to.entry(next).or_insert_with(VoteWeight::zero) += &v.weight;
                }
                None => {
                    exhausted += &v.weight;
                }
            }
        }
        debug!(
            "transfer: from {:?}: to {:?}, exhausted {}",
            self.name(from),
            to,
            exhausted
        );
        Transfer { to, exhausted }
    }

    /// The weight of the ballots that rank `x` above `y`, and `y` above `x`.
    ///
    /// Only ballots ranking both candidates express a preference between them.
    pub(crate) fn pairwise(&self, x: CandidateId, y: CandidateId) -> (VoteWeight, VoteWeight) {
        let mut score_x = VoteWeight::zero();
        let mut score_y = VoteWeight::zero();
        for v in self.votes.iter() {
            if let (Some(px), Some(py)) = (v.position(x), v.position(y)) {
                if px < py {
                    score_x += &v.weight;
                } else {
                    score_y += &v.weight;
                }
            }
        }
        (score_x, score_y)
    }

    pub(crate) fn named_tally(&self, tally: &Tally) -> Vec<(String, VoteWeight)> {
        tally
            .iter()
            .map(|(cid, w)| (self.name(*cid).to_string(), w.clone()))
            .collect()
    }

    pub(crate) fn transfer_stats(&self, from: CandidateId, transfer: Transfer) -> TransferStats {
        TransferStats {
            name: self.name(from).to_string(),
            transfers: transfer
                .to
                .into_iter()
                .filter(|(_, w)| !w.is_zero())
                .map(|(cid, w)| (self.name(cid).to_string(), w))
                .collect(),
            exhausted: transfer.exhausted,
        }
    }

    /// Orders candidates for elimination under the given tie-break mode: the first
    /// element is the one to eliminate.
    pub(crate) fn elimination_order(
        &self,
        cids: &[CandidateId],
        tiebreak: TieBreakMode,
        round: u32,
    ) -> Vec<CandidateId> {
        let mut res = cids.to_vec();
        match tiebreak {
            TieBreakMode::EliminateAll | TieBreakMode::UseCandidateOrder => {
                // The candidate that sorts last goes first.
                res.sort_by(|a, b| b.cmp(a));
            }
            TieBreakMode::Random(seed) => {
                res.sort_by_cached_key(|cid| {
                    sha256::digest(format!("{:08}{:08}{}", seed, round, self.name(*cid)))
                });
            }
        }
        res
    }

    /// Candidates sorted by increasing tally. Equal tallies follow the elimination order.
    pub(crate) fn lowest_first(
        &self,
        tally: &Tally,
        tiebreak: TieBreakMode,
        round: u32,
    ) -> Vec<CandidateId> {
        let cids: Vec<CandidateId> = tally.keys().copied().collect();
        let order = self.elimination_order(&cids, tiebreak, round);
        let rank: BTreeMap<CandidateId, usize> =
            order.iter().enumerate().map(|(idx, cid)| (*cid, idx)).collect();
        let mut res = cids;
        res.sort_by(|a, b| tally[a].cmp(&tally[b]).then(rank[a].cmp(&rank[b])));
        res
    }

    /// The candidates to eliminate: the lowest one, or every lowest one under
    /// [`TieBreakMode::EliminateAll`].
    ///
    /// Fails with `NoUniqueWinner` if eliminating a tied group would leave fewer than
    /// `min_survivors` candidates.
    pub(crate) fn find_eliminated_candidates(
        &self,
        tally: &Tally,
        tiebreak: TieBreakMode,
        round: u32,
        min_survivors: usize,
    ) -> Result<Vec<CandidateId>, VotingErrors> {
        let min_count: Option<&VoteWeight> = tally.values().min();
        let all_smallest: Vec<CandidateId> = tally
            .iter()
            .filter(|(_, w)| Some(*w) == min_count)
            .map(|(cid, _)| *cid)
            .collect();
        debug!(
            "find_eliminated_candidates: all_smallest: {:?}",
            self.names(&all_smallest)
        );
        if all_smallest.len() <= 1 {
            return Ok(all_smallest);
        }
        match tiebreak {
            TieBreakMode::EliminateAll => {
                ensure!(
                    tally.len() - all_smallest.len() >= min_survivors,
                    NoUniqueWinnerSnafu {
                        tied: self.names(&all_smallest)
                    }
                );
                Ok(all_smallest)
            }
            _ => {
                let mut order = self.elimination_order(&all_smallest, tiebreak, round);
                order.truncate(1);
                Ok(order)
            }
        }
    }
}
