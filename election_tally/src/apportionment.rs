use log::{debug, info};
use snafu::ensure;

use crate::ballot::PartyVoteMap;
use crate::config::*;
use crate::weight::VoteWeight;

/// Allocates seats with the Sainte-Laguë (Webster) divisor method.
///
/// Seats are handed out one at a time to the party with the highest quotient
/// `votes / (2 * seats_won + 1)`. Quotients are exact, and equal quotients go to the
/// party whose name sorts first. Parties without votes never get a seat.
pub fn run_sainte_lague(
    votes: &PartyVoteMap,
    seats: u32,
    rules: &ApportionmentRules,
) -> Result<Apportionment, VotingErrors> {
    ensure!(
        seats > 0,
        InvalidSeatCountSnafu {
            seats,
            reason: "at least one seat must be allocated"
        }
    );
    ensure!(
        seats <= rules.max_seats,
        InvalidSeatCountSnafu {
            seats,
            reason: format!("at most {} seats can be allocated", rules.max_seats)
        }
    );
    ensure!(
        votes.total_votes().is_positive(),
        InvalidSeatCountSnafu {
            seats,
            reason: "no party received any vote"
        }
    );
    info!(
        "run_sainte_lague: {} seats, parties: {:?}",
        seats,
        votes.parties()
    );

    let parties = votes.parties();
    let mut won: Vec<u32> = vec![0; parties.len()];
    let mut awards: Vec<SeatAward> = Vec::new();
    for seat in 1..=seats {
        let mut best: Option<(usize, u64, VoteWeight)> = None;
        for (idx, (_, party_votes)) in parties.iter().enumerate() {
            if !party_votes.is_positive() {
                continue;
            }
            let divisor = 2 * won[idx] as u64 + 1;
            let quotient = party_votes.div_integer(divisor);
            // Parties are sorted by name: on equal quotients, the earlier one keeps it.
            match &best {
                Some((_, _, best_quotient)) if quotient <= *best_quotient => {}
                _ => best = Some((idx, divisor, quotient)),
            }
        }
        let (idx, divisor, quotient) = match best {
            Some(b) => b,
            None => {
                return InvalidSeatCountSnafu {
                    seats,
                    reason: "no party received any vote",
                }
                .fail()
            }
        };
        debug!(
            "run_sainte_lague: seat {} -> {} (votes / {} = {})",
            seat, parties[idx].0, divisor, quotient
        );
        won[idx] += 1;
        awards.push(SeatAward {
            seat,
            party: parties[idx].0.clone(),
            divisor,
            quotient,
        });
    }

    let parties: Vec<(String, VoteWeight, u32)> = parties
        .iter()
        .zip(won)
        .map(|((name, v), s)| (name.clone(), v.clone(), s))
        .collect();
    info!("run_sainte_lague: allocation: {:?}", parties);
    Ok(Apportionment { parties, awards })
}
