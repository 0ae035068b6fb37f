/*!
Tabulation of ranked-choice and party-list elections.

Three families of counts are supported:
* instant-runoff voting for a single seat ([run_voting_stats]), with an optional
  bottoms-up two-round elimination ([EliminationMode::BottomsUpTwoRound]),
* single transferable vote for several seats ([run_stv]), using a Droop quota and
  fractional surplus transfers,
* Sainte-Laguë apportionment of seats between parties ([run_sainte_lague]).

All the arithmetic on votes is exact: weights are rational numbers, so that transfers
of fractional surpluses never lose or create votes.

See the [manual] for the details of each method.
*/

mod apportionment;
mod ballot;
pub mod builder;
mod config;
mod irv;
pub mod manual;
mod round;
mod stv;
mod weight;

pub use crate::config::*;
pub use apportionment::run_sainte_lague;
pub use ballot::{BallotSet, PartyVoteMap};
pub use irv::run_voting_stats;
pub use stv::{droop_quota, run_stv};
pub use weight::VoteWeight;
