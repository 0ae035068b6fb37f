use log::{debug, info};
use snafu::ensure;

use std::collections::BTreeSet;

use crate::ballot::BallotSet;
use crate::config::*;
use crate::round::{CandidateId, Contest, Tally};
use crate::weight::VoteWeight;

/// Runs a single-winner instant-runoff election.
///
/// Arguments:
/// * `ballots` the validated ballots
/// * `mode` standard elimination of the weakest candidate, or bottoms-up two-round
/// * `rules` the tie-break policy
///
/// A candidate wins as soon as their tally is strictly above half of the weight that
/// is not exhausted, or when they are the last one running.
pub fn run_voting_stats(
    ballots: &BallotSet,
    mode: EliminationMode,
    rules: &VoteRules,
) -> Result<VotingResult, VotingErrors> {
    info!(
        "Processing {:?} ballots, candidates: {:?}, mode: {:?}, rules: {:?}",
        ballots.ballots().len(),
        ballots.candidates(),
        mode,
        rules
    );
    let mut contest = Contest::new(ballots);
    let mut continuing: BTreeSet<CandidateId> = contest.candidates();
    let mut round_stats: Vec<RoundStats> = Vec::new();

    // Every round either finds a winner or eliminates at least one candidate.
    loop {
        let round_id = round_stats.len() as u32 + 1;
        let tally = contest.tally(&continuing);
        let exhausted = contest.exhausted();
        let threshold = get_threshold(&tally);
        let mut stats = RoundStats::new(round_id, contest.named_tally(&tally), exhausted);
        info!(
            "Round {} (majority above {}): tally: {:?}, exhausted: {}",
            round_id, threshold, stats.tally, stats.exhausted
        );

        if let Some(winner) = find_winner(&tally, &threshold) {
            let name = contest.name(winner).to_string();
            info!("Round {}: {} elected", round_id, name);
            stats.tally_results_elected.push(TransferStats {
                name: name.clone(),
                transfers: Vec::new(),
                exhausted: VoteWeight::zero(),
            });
            round_stats.push(stats);
            return Ok(VotingResult {
                winner: name,
                threshold,
                round_stats,
            });
        }

        let eliminated: Vec<CandidateId> = match mode {
            EliminationMode::Standard => {
                contest.find_eliminated_candidates(&tally, rules.tiebreak_mode, round_id, 1)?
            }
            EliminationMode::BottomsUpTwoRound => {
                let (losers, pairwise) =
                    find_bottoms_up_losers(&contest, &tally, rules.tiebreak_mode, round_id)?;
                stats.pairwise = Some(pairwise);
                losers
            }
        };
        debug!(
            "Round {}: eliminated_candidates: {:?}",
            round_id,
            contest.names(&eliminated)
        );

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
        round_stats.push(stats);
    }
}

/// Half of the non-exhausted weight. A winner must be strictly above it.
fn get_threshold(tally: &Tally) -> VoteWeight {
    tally.values().sum::<VoteWeight>().div_integer(2)
}

fn find_winner(tally: &Tally, threshold: &VoteWeight) -> Option<CandidateId> {
    // Only one candidate. It is the winner by any standard.
    if tally.len() == 1 {
        return tally.keys().next().copied();
    }
    tally
        .iter()
        .find(|(_, count)| *count > threshold)
        .map(|(cid, _)| *cid)
}

// The two weakest candidates face each other; the one that fewer ballots prefer is
// eliminated. Equal pairwise scores fall back to the round tally, then to the tie-break.
// Under eliminateAll a complete tie removes both, as long as another candidate remains.
fn find_bottoms_up_losers(
    contest: &Contest,
    tally: &Tally,
    tiebreak: TieBreakMode,
    round_id: u32,
) -> Result<(Vec<CandidateId>, PairwiseStats), VotingErrors> {
    let lowest = contest.lowest_first(tally, tiebreak, round_id);
    let (x, y) = (lowest[0], lowest[1]);
    let (score_x, score_y) = contest.pairwise(x, y);
    debug!(
        "find_bottoms_up_losers: {}: {} vs {}: {}",
        contest.name(x),
        score_x,
        contest.name(y),
        score_y
    );
    let losers = if score_x < score_y {
        vec![x]
    } else if score_y < score_x {
        vec![y]
    } else if tally[&x] != tally[&y] {
        // Sorted by increasing tally.
        vec![x]
    } else if tiebreak == TieBreakMode::EliminateAll {
        let tied = vec![x.min(y), x.max(y)];
        ensure!(
            tally.len() > tied.len(),
            NoUniqueWinnerSnafu {
                tied: contest.names(&tied)
            }
        );
        tied
    } else {
        vec![x]
    };
    Ok((
        losers.clone(),
        PairwiseStats {
            first: (contest.name(x).to_string(), score_x),
            second: (contest.name(y).to_string(), score_y),
            losers: contest.names(&losers),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;
    use proptest::prelude::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn ballots(votes: &[(Vec<&str>, u64)]) -> BallotSet {
        let mut builder = Builder::new();
        for (ranking, count) in votes {
            builder
                .add_vote(ranking, VoteWeight::from_integer(*count))
                .unwrap();
        }
        builder.build().unwrap()
    }

    fn w(n: u64) -> VoteWeight {
        VoteWeight::from_integer(n)
    }

    fn tally(entries: &[(&str, u64)]) -> Vec<(String, VoteWeight)> {
        entries.iter().map(|(n, c)| (n.to_string(), w(*c))).collect()
    }

    fn irv(bs: &BallotSet) -> Result<VotingResult, VotingErrors> {
        run_voting_stats(bs, EliminationMode::Standard, &VoteRules::DEFAULT_RULES)
    }

    fn btr(bs: &BallotSet) -> Result<VotingResult, VotingErrors> {
        run_voting_stats(
            bs,
            EliminationMode::BottomsUpTwoRound,
            &VoteRules::DEFAULT_RULES,
        )
    }

    #[test]
    fn majority_in_first_round() {
        init();
        let bs = ballots(&[(vec!["A", "B"], 3), (vec!["B", "A"], 2)]);
        for res in [irv(&bs).unwrap(), btr(&bs).unwrap()] {
            assert_eq!(res.winner, "A");
            assert_eq!(res.round_stats.len(), 1);
            assert_eq!(res.round_stats[0].tally, tally(&[("A", 3), ("B", 2)]));
        }
    }

    #[test]
    fn elimination_transfers_votes() {
        init();
        let bs = ballots(&[
            (vec!["A", "C"], 2),
            (vec!["B", "C"], 3),
            (vec!["C", "A"], 4),
        ]);
        let res = irv(&bs).unwrap();
        assert_eq!(res.winner, "C");
        assert_eq!(res.round_stats.len(), 2);
        let r1 = &res.round_stats[0];
        assert_eq!(r1.tally, tally(&[("A", 2), ("B", 3), ("C", 4)]));
        assert_eq!(
            r1.tally_result_eliminated,
            vec![TransferStats {
                name: "A".to_string(),
                transfers: vec![("C".to_string(), w(2))],
                exhausted: w(0),
            }]
        );
        assert_eq!(res.round_stats[1].tally, tally(&[("B", 3), ("C", 6)]));
    }

    #[test]
    fn empty_rankings_are_exhausted_from_the_start() {
        init();
        let bs = ballots(&[(vec!["A"], 2), (vec!["B"], 1), (vec![], 10)]);
        let res = irv(&bs).unwrap();
        assert_eq!(res.winner, "A");
        assert_eq!(res.round_stats[0].exhausted, w(10));
        assert_eq!(res.threshold, VoteWeight::from_ratio(3, 2));
    }

    #[test]
    fn ties_for_last_are_eliminated_together() {
        init();
        let bs = ballots(&[
            (vec!["A", "D"], 1),
            (vec!["B", "D"], 1),
            (vec!["C"], 3),
            (vec!["D"], 2),
        ]);
        let res = irv(&bs).unwrap();
        let r1 = &res.round_stats[0];
        let names: Vec<&str> = r1
            .tally_result_eliminated
            .iter()
            .map(|es| es.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(res.round_stats[1].tally, tally(&[("C", 3), ("D", 4)]));
        assert_eq!(res.winner, "D");
    }

    #[test]
    fn full_tie_has_no_unique_winner() {
        init();
        let bs = ballots(&[(vec!["A"], 2), (vec!["B"], 2)]);
        assert_eq!(
            irv(&bs).unwrap_err(),
            VotingErrors::NoUniqueWinner {
                tied: vec!["A".to_string(), "B".to_string()]
            }
        );
        // Tied head-to-head and on the tally, with nobody left to win.
        assert!(matches!(
            btr(&bs),
            Err(VotingErrors::NoUniqueWinner { .. })
        ));
    }

    #[test]
    fn full_tie_resolved_by_candidate_order() {
        init();
        let bs = ballots(&[(vec!["A"], 2), (vec!["B"], 2)]);
        let rules = VoteRules {
            tiebreak_mode: TieBreakMode::UseCandidateOrder,
        };
        let res = run_voting_stats(&bs, EliminationMode::Standard, &rules).unwrap();
        assert_eq!(res.winner, "A");
        let res = run_voting_stats(&bs, EliminationMode::BottomsUpTwoRound, &rules).unwrap();
        assert_eq!(res.winner, "A");
    }

    #[test]
    fn single_candidate_wins_without_majority() {
        init();
        let bs = ballots(&[(vec!["A"], 1), (vec![], 5)]);
        let res = irv(&bs).unwrap();
        assert_eq!(res.winner, "A");
        assert_eq!(res.round_stats.len(), 1);
    }

    #[test]
    fn bottoms_up_spares_the_condorcet_candidate() {
        init();
        // B is everybody's second choice: plain IRV eliminates it first, while the
        // bottoms-up runoff against C keeps it.
        let bs = ballots(&[
            (vec!["A", "B", "C"], 4),
            (vec!["C", "B", "A"], 4),
            (vec!["B", "A", "C"], 3),
        ]);
        let res = irv(&bs).unwrap();
        assert_eq!(res.round_stats[0].tally_result_eliminated[0].name, "B");
        assert_eq!(res.winner, "A");

        let res = btr(&bs).unwrap();
        let pairwise = res.round_stats[0].pairwise.clone().unwrap();
        assert_eq!(pairwise.first, ("B".to_string(), w(7)));
        assert_eq!(pairwise.second, ("C".to_string(), w(4)));
        assert_eq!(pairwise.losers, vec!["C".to_string()]);
        assert_eq!(res.round_stats[1].tally, tally(&[("A", 4), ("B", 7)]));
        assert_eq!(res.winner, "B");
    }

    #[test]
    fn bottoms_up_pairwise_tie_falls_back_to_tally() {
        init();
        // No ballot ranks both A and B, so the head-to-head is 0-0 and the lower
        // tally loses.
        let bs = ballots(&[
            (vec!["A", "C"], 2),
            (vec!["B", "C"], 3),
            (vec!["C", "A"], 4),
        ]);
        let res = btr(&bs).unwrap();
        let pairwise = res.round_stats[0].pairwise.clone().unwrap();
        assert_eq!(pairwise.first, ("A".to_string(), w(0)));
        assert_eq!(pairwise.second, ("B".to_string(), w(0)));
        assert_eq!(pairwise.losers, vec!["A".to_string()]);
        assert_eq!(res.round_stats[1].tally, tally(&[("B", 3), ("C", 6)]));
        assert_eq!(res.winner, "C");
    }

    #[test]
    fn bottom_two_tied_are_eliminated_together() {
        init();
        let bs = ballots(&[
            (vec!["A", "C"], 2),
            (vec!["B", "C"], 2),
            (vec!["C"], 3),
            (vec!["D"], 4),
        ]);
        let res = btr(&bs).unwrap();
        let r1 = &res.round_stats[0];
        assert_eq!(
            r1.pairwise.clone().unwrap().losers,
            vec!["A".to_string(), "B".to_string()]
        );
        let names: Vec<&str> = r1
            .tally_result_eliminated
            .iter()
            .map(|es| es.name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(res.round_stats[1].tally, tally(&[("C", 7), ("D", 4)]));
        assert_eq!(res.winner, "C");
        assert_eq!(res.winner, irv(&bs).unwrap().winner);
    }

    #[test]
    fn bottoms_up_full_tie_follows_the_tiebreak_mode() {
        init();
        // A and B are 1-1 head-to-head and 2-2 on the tally.
        let bs = ballots(&[
            (vec!["A", "B"], 1),
            (vec!["B", "A"], 1),
            (vec!["A"], 1),
            (vec!["B"], 1),
            (vec!["C"], 3),
        ]);
        let rules = VoteRules {
            tiebreak_mode: TieBreakMode::UseCandidateOrder,
        };
        let res = run_voting_stats(&bs, EliminationMode::BottomsUpTwoRound, &rules).unwrap();
        let pairwise = res.round_stats[0].pairwise.clone().unwrap();
        assert_eq!(pairwise.first.1, w(1));
        assert_eq!(pairwise.second.1, w(1));
        assert_eq!(pairwise.losers, vec!["B".to_string()]);
        assert_eq!(res.round_stats[1].tally, tally(&[("A", 3), ("C", 3)]));
        assert_eq!(res.round_stats[1].exhausted, w(1));
        assert_eq!(res.winner, "A");

        let res = btr(&bs).unwrap();
        assert_eq!(
            res.round_stats[0].pairwise.clone().unwrap().losers,
            vec!["A".to_string(), "B".to_string()]
        );
        assert_eq!(res.round_stats[1].tally, tally(&[("C", 3)]));
        assert_eq!(res.round_stats[1].exhausted, w(4));
        assert_eq!(res.winner, "C");
    }

    #[test]
    fn repeated_runs_are_identical() {
        let bs = ballots(&[
            (vec!["A", "B"], 1),
            (vec!["B", "C"], 1),
            (vec!["C", "A"], 1),
            (vec!["D"], 1),
        ]);
        let rules = VoteRules {
            tiebreak_mode: TieBreakMode::Random(7),
        };
        let first = run_voting_stats(&bs, EliminationMode::Standard, &rules);
        let second = run_voting_stats(&bs, EliminationMode::Standard, &rules);
        assert_eq!(first, second);
    }

    fn arb_ballots() -> impl Strategy<Value = Vec<(Vec<&'static str>, u64)>> {
        let ranking = Just(vec!["A", "B", "C", "D", "E"])
            .prop_shuffle()
            .prop_flat_map(|r| (0..=r.len()).prop_map(move |n| r[..n].to_vec()));
        prop::collection::vec((ranking, 1u64..20), 1..30)
    }

    proptest! {
        #[test]
        fn weight_is_conserved(votes in arb_ballots(), btr_mode in any::<bool>()) {
            prop_assume!(votes.iter().any(|(r, _)| !r.is_empty()));
            let bs = ballots(&votes);
            let mode = if btr_mode { EliminationMode::BottomsUpTwoRound } else { EliminationMode::Standard };
            let rules = VoteRules { tiebreak_mode: TieBreakMode::UseCandidateOrder };
            let res = run_voting_stats(&bs, mode, &rules).unwrap();
            for rs in res.round_stats.iter() {
                prop_assert_eq!(rs.active_weight() + rs.exhausted.clone(), bs.total_weight().clone());
            }
        }

        #[test]
        fn first_round_majority_wins_immediately(votes in arb_ballots()) {
            prop_assume!(votes.iter().any(|(r, _)| !r.is_empty()));
            let bs = ballots(&votes);
            let first = irv(&bs);
            if let Ok(res) = first {
                let r1 = &res.round_stats[0];
                let active = r1.active_weight();
                if let Some((name, _)) = r1.tally.iter().find(|(_, c)| c.mul_integer(2) > active) {
                    prop_assert_eq!(&res.winner, name);
                    prop_assert_eq!(res.round_stats.len(), 1);
                    prop_assert_eq!(&btr(&bs).unwrap().winner, name);
                }
            }
        }
    }
}
