use log::{debug, info};
use snafu::ensure;

use std::collections::BTreeSet;

use crate::ballot::BallotSet;
use crate::config::*;
use crate::round::{CandidateId, Contest, Tally};
use crate::weight::VoteWeight;

/// Runs a multi-seat single transferable vote election.
///
/// The quota is the Droop quota of the non-exhausted weight, recomputed every round.
/// The surplus of an elected candidate is transferred with fractional (Gregory)
/// weights: every ballot carries `surplus / total` of its weight to its next
/// preference. Eliminated candidates transfer their ballots at full weight.
pub fn run_stv(
    ballots: &BallotSet,
    seats: u32,
    rules: &VoteRules,
) -> Result<StvResult, VotingErrors> {
    ensure!(
        seats > 0,
        InvalidSeatCountSnafu {
            seats,
            reason: "at least one seat must be filled"
        }
    );
    let num_candidates = ballots.candidates().len();
    ensure!(
        seats as usize <= num_candidates,
        InvalidSeatCountSnafu {
            seats,
            reason: format!("only {} candidates are running", num_candidates)
        }
    );
    info!(
        "run_stv: {} seats, {} ballots, candidates: {:?}, rules: {:?}",
        seats,
        ballots.ballots().len(),
        ballots.candidates(),
        rules
    );

    let mut contest = Contest::new(ballots);
    let mut continuing: BTreeSet<CandidateId> = contest.candidates();
    let mut elected: Vec<ElectedCandidate> = Vec::new();
    let mut round_stats: Vec<RoundStats> = Vec::new();

    while elected.len() < seats as usize {
        let round_id = round_stats.len() as u32 + 1;
        let seats_left = seats as usize - elected.len();
        let tally = contest.tally(&continuing);
        let exhausted = contest.exhausted();
        let quota = droop_quota(contest.total(), &exhausted, seats);
        let mut stats = RoundStats::new(round_id, contest.named_tally(&tally), exhausted);
        stats.quota = Some(quota.clone());
        info!(
            "Round {} (quota {}): tally: {:?}, exhausted: {}",
            round_id, quota, stats.tally, stats.exhausted
        );

        let reaching = find_elected_candidates(&contest, &tally, &quota, rules, round_id, seats_left);
        if !reaching.is_empty() {
            // Elected candidates stop receiving votes, including from each other.
            for cid in reaching.iter() {
                continuing.remove(cid);
            }
            for cid in reaching {
                let total = tally[&cid].clone();
                let surplus = &total - &quota;
                debug!(
                    "Round {}: {} elected with {}, surplus {}",
                    round_id,
                    contest.name(cid),
                    total,
                    surplus
                );
                let transfer = contest.transfer(cid, &continuing, Some((&surplus, &total)));
                let es = contest.transfer_stats(cid, transfer);
                info!(
                    "Round {}: {} elected, surplus {} transferred: {:?}, {} exhausted",
                    round_id, es.name, surplus, es.transfers, es.exhausted
                );
                stats.tally_results_elected.push(es);
                elected.push(ElectedCandidate {
                    name: contest.name(cid).to_string(),
                    round: round_id,
                    retained: quota.clone(),
                    by_default: false,
                });
            }
        } else if continuing.len() <= seats_left {
            // Nobody can be eliminated anymore: whoever is left fills the remaining seats.
            let rest = contest.lowest_first(&tally, rules.tiebreak_mode, round_id);
            for cid in rest {
                let name = contest.name(cid).to_string();
                info!("Round {}: {} elected by default", round_id, name);
                stats.tally_results_elected.push(TransferStats {
                    name: name.clone(),
                    transfers: Vec::new(),
                    exhausted: VoteWeight::zero(),
                });
                elected.push(ElectedCandidate {
                    name,
                    round: round_id,
                    retained: tally[&cid].clone(),
                    by_default: true,
                });
                continuing.remove(&cid);
            }
        } else {
            let eliminated = contest.find_eliminated_candidates(
                &tally,
                rules.tiebreak_mode,
                round_id,
                seats_left,
            )?;
            for cid in eliminated.iter() {
                continuing.remove(cid);
            }
            for cid in eliminated {
                let transfer = contest.transfer(cid, &continuing, None);
                let es = contest.transfer_stats(cid, transfer);
                info!(
                    "Round {}: {} eliminated: {:?}, {} exhausted",
                    round_id, es.name, es.transfers, es.exhausted
                );
                stats.tally_result_eliminated.push(es);
            }
        }
        round_stats.push(stats);
    }

    Ok(StvResult {
        elected,
        seats,
        round_stats,
    })
}

/// floor(non-exhausted weight / (seats + 1)) + 1
pub fn droop_quota(total: &VoteWeight, exhausted: &VoteWeight, seats: u32) -> VoteWeight {
    (total - exhausted).div_integer(seats as u64 + 1).floor() + VoteWeight::from_integer(1)
}

// Candidates at or above the quota, highest tally first, at most `seats_left` of them.
fn find_elected_candidates(
    contest: &Contest,
    tally: &Tally,
    quota: &VoteWeight,
    rules: &VoteRules,
    round_id: u32,
    seats_left: usize,
) -> Vec<CandidateId> {
    let mut res: Vec<CandidateId> = contest
        .lowest_first(tally, rules.tiebreak_mode, round_id)
        .into_iter()
        .rev()
        .filter(|cid| tally[cid] >= *quota)
        .collect();
    res.truncate(seats_left);
    res
}
