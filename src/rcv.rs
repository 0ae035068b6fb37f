use log::{debug, info, warn};

use election_tally::*;
use snafu::{prelude::*, Snafu};

use std::fs;

use serde_json::json;
use serde_json::Map as JSMap;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::args::Args;
use crate::rcv::config_reader::*;
use crate::rcv::io_json::*;

pub mod config_reader;
pub mod io_json;
pub mod report;

#[derive(Debug, Snafu)]
pub enum RcvError {
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing the JSON file {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error serializing the summary"))]
    SerializingJson { source: serde_json::Error },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("{source}"))]
    Tabulation { source: VotingErrors },
    #[snafu(display("Difference detected between the calculated summary and the reference {path}"))]
    ReferenceMismatch { path: String },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type RcvResult<T> = Result<T, RcvError>;

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Method {
    Irv,
    BtrIrv,
    Stv,
    SainteLague,
}

impl Method {
    pub fn name(&self) -> &'static str {
        match self {
            Method::Irv => "irv",
            Method::BtrIrv => "btr-irv",
            Method::Stv => "stv",
            Method::SainteLague => "sainte-lague",
        }
    }
}

/// Picks the method from its name or one of its aliases. Without a name, the shape of
/// the input and the number of seats decide.
pub fn select_method(
    method: Option<&str>,
    seats: u32,
    input: &ElectionInput,
) -> RcvResult<Method> {
    match method {
        Some("irv") => Ok(Method::Irv),
        Some("btr-irv") | Some("btr") | Some("b2") => Ok(Method::BtrIrv),
        Some("stv") => Ok(Method::Stv),
        Some("sainte-lague") | Some("webster") | Some("pr") => Ok(Method::SainteLague),
        None | Some("default") => match input {
            ElectionInput::Proportional(_) => Ok(Method::SainteLague),
            ElectionInput::Ranked(_) if seats > 1 => Ok(Method::Stv),
            ElectionInput::Ranked(_) => Ok(Method::BtrIrv),
        },
        Some(x) => whatever!("Unknown method {:?}", x),
    }
}

/// The result of one of the tabulation methods.
#[derive(Eq, PartialEq, Debug, Clone)]
pub enum Outcome {
    SingleWinner(VotingResult),
    MultiWinner(StvResult),
    Seats(Apportionment),
}

pub fn tabulate(
    input: &ElectionInput,
    method: Method,
    seats: u32,
    config: &RcvConfig,
) -> RcvResult<Outcome> {
    if seats == 0 {
        return Err(VotingErrors::InvalidSeatCount {
            seats,
            reason: "at least one seat must be filled".to_string(),
        })
        .context(TabulationSnafu {});
    }
    match (method, input) {
        (Method::Irv | Method::BtrIrv, ElectionInput::Ranked(ballots)) => {
            if seats != 1 {
                return Err(VotingErrors::InvalidSeatCount {
                    seats,
                    reason: format!("{} fills a single seat", method.name()),
                })
                .context(TabulationSnafu {});
            }
            let rules = validate_rules(config)?;
            let mode = if method == Method::Irv {
                EliminationMode::Standard
            } else {
                EliminationMode::BottomsUpTwoRound
            };
            let res = run_voting_stats(ballots, mode, &rules).context(TabulationSnafu {})?;
            Ok(Outcome::SingleWinner(res))
        }
        (Method::Stv, ElectionInput::Ranked(ballots)) => {
            let rules = validate_rules(config)?;
            let res = run_stv(ballots, seats, &rules).context(TabulationSnafu {})?;
            Ok(Outcome::MultiWinner(res))
        }
        (Method::SainteLague, ElectionInput::Proportional(votes)) => {
            let rules = validate_apportionment_rules(config)?;
            let res = run_sainte_lague(votes, seats, &rules).context(TabulationSnafu {})?;
            Ok(Outcome::Seats(res))
        }
        (m, ElectionInput::Ranked(_)) => Err(VotingErrors::MalformedInput {
            reason: format!("{} needs party votes, found ranked ballots", m.name()),
        })
        .context(TabulationSnafu {}),
        (m, ElectionInput::Proportional(_)) => Err(VotingErrors::MalformedInput {
            reason: format!("{} needs ranked ballots, found party votes", m.name()),
        })
        .context(TabulationSnafu {}),
    }
}

fn transfers_to_json(ts: &TransferStats) -> JSMap<String, JSValue> {
    let mut transfers: JSMap<String, JSValue> = JSMap::new();
    for (name, count) in ts.transfers.iter() {
        transfers.insert(name.clone(), json!(count.to_string()));
    }
    if ts.exhausted.is_positive() {
        transfers.insert("exhausted".to_string(), json!(ts.exhausted.to_string()));
    }
    transfers
}

fn round_stats_to_json(round_stats: &[RoundStats]) -> Vec<JSValue> {
    let mut l: Vec<JSValue> = Vec::new();
    for round_stat in round_stats.iter() {
        let mut tally: JSMap<String, JSValue> = JSMap::new();
        for (name, count) in round_stat.tally.iter() {
            tally.insert(name.clone(), json!(count.to_string()));
        }

        let mut tally_results: Vec<JSValue> = Vec::new();
        for elim_stats in round_stat.tally_result_eliminated.iter() {
            tally_results.push(json!({
                "eliminated": elim_stats.name,
                "transfers": transfers_to_json(elim_stats)
            }));
        }
        for elect_stats in round_stat.tally_results_elected.iter() {
            tally_results.push(json!({
                "elected": elect_stats.name,
                "transfers": transfers_to_json(elect_stats)
            }));
        }

        let mut js = json!({
            "round": round_stat.round,
            "tally": tally,
            "exhausted": round_stat.exhausted.to_string(),
            "tallyResults": tally_results
        });
        match &round_stat.quota {
            Some(q) => js["quota"] = json!(q.to_string()),
            None => {
                js["threshold"] = json!(round_stat.active_weight().div_integer(2).to_string())
            }
        }
        if let Some(p) = &round_stat.pairwise {
            let mut pairwise: JSMap<String, JSValue> = JSMap::new();
            for (name, score) in [&p.first, &p.second] {
                pairwise.insert(name.clone(), json!(score.to_string()));
            }
            js["pairwise"] = JSValue::Object(pairwise);
        }
        l.push(js);
    }
    l
}

fn build_summary_js(config: &RcvConfig, method: Method, seats: u32, outcome: &Outcome) -> JSValue {
    let mut c = OutputConfig {
        contest: config.contest_name.clone(),
        method: method.name().to_string(),
        seats,
        tiebreak_mode: config
            .tiebreak_mode
            .clone()
            .unwrap_or_else(|| "eliminateAll".to_string()),
        threshold: None,
    };
    match outcome {
        Outcome::SingleWinner(res) => {
            c.threshold = Some(res.threshold.to_string());
            json!({"config": c, "results": round_stats_to_json(&res.round_stats)})
        }
        Outcome::MultiWinner(res) => {
            json!({"config": c, "results": round_stats_to_json(&res.round_stats)})
        }
        Outcome::Seats(res) => {
            let mut seats_js: JSMap<String, JSValue> = JSMap::new();
            for (party, _, s) in res.parties.iter() {
                seats_js.insert(party.clone(), json!(s));
            }
            let awards: Vec<JSValue> = res
                .awards
                .iter()
                .map(|a| {
                    json!({
                        "seat": a.seat,
                        "party": a.party,
                        "divisor": a.divisor,
                        "quotient": a.quotient.to_string()
                    })
                })
                .collect();
            json!({"config": c, "seats": seats_js, "awards": awards})
        }
    }
}

fn render_outcome(input: &ElectionInput, outcome: &Outcome) -> String {
    let total = match input {
        ElectionInput::Ranked(ballots) => ballots.total_weight().clone(),
        ElectionInput::Proportional(votes) => votes.total_votes(),
    };
    match outcome {
        Outcome::SingleWinner(res) => report::format_voting_result(&total, res),
        Outcome::MultiWinner(res) => report::format_stv_result(&total, res),
        Outcome::Seats(res) => report::format_apportionment(res),
    }
}

fn write_summary(out: &str, pretty_js_stats: &str) -> RcvResult<()> {
    if out == "stdout" {
        println!("{}", pretty_js_stats);
    } else {
        info!("Writing the summary to {}", out);
        fs::write(out, pretty_js_stats).context(WritingSummarySnafu { path: out })?;
    }
    Ok(())
}

fn check_reference(path: &str, pretty_js_stats: &str) -> RcvResult<()> {
    let summary_ref = read_summary(path)?;
    let pretty_js_summary_ref =
        serde_json::to_string_pretty(&summary_ref).context(SerializingJsonSnafu {})?;
    if pretty_js_summary_ref != pretty_js_stats {
        warn!("Found differences with the reference string");
        print_diff(pretty_js_summary_ref.as_str(), pretty_js_stats, "\n");
        return ReferenceMismatchSnafu { path }.fail();
    }
    Ok(())
}

pub fn run_election(args: &Args) -> RcvResult<()> {
    let config = match &args.config {
        Some(path) => read_config(path)?,
        None => RcvConfig::default(),
    };
    let input = read_election(&args.input)?;
    let method = select_method(args.method.as_deref(), args.seats, &input)?;
    info!(
        "run_election: method: {:?}, seats: {}, config: {:?}",
        method, args.seats, config
    );

    let outcome = tabulate(&input, method, args.seats, &config)?;
    debug!("run_election: outcome: {:?}", outcome);
    println!("{}", render_outcome(&input, &outcome));

    let result_js = build_summary_js(&config, method, args.seats, &outcome);
    let pretty_js_stats =
        serde_json::to_string_pretty(&result_js).context(SerializingJsonSnafu {})?;

    if let Some(out) = &args.out {
        write_summary(out, &pretty_js_stats)?;
    }
    // The reference summary, if provided for comparison
    if let Some(reference) = &args.reference {
        check_reference(reference, &pretty_js_stats)?;
    }
    Ok(())
}
