use crate::rcv::*;

use serde::{Deserialize, Serialize};

/// The optional rules file. All the fields may be omitted.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct RcvConfig {
    #[serde(rename = "contestName")]
    pub contest_name: Option<String>,
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: Option<String>,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<String>,
    #[serde(rename = "maxSeats")]
    pub max_seats: Option<u32>,
}

/// The `config` entry of the summary.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub contest: Option<String>,
    pub method: String,
    pub seats: u32,
    #[serde(rename = "tiebreakMode")]
    pub tiebreak_mode: String,
    pub threshold: Option<String>,
}

pub fn read_config(path: &str) -> RcvResult<RcvConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: RcvConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    info!("read_config: {:?}", config);
    Ok(config)
}

pub fn validate_rules(config: &RcvConfig) -> RcvResult<VoteRules> {
    let tiebreak_mode = match config.tiebreak_mode.as_deref() {
        None | Some("eliminateAll") => TieBreakMode::EliminateAll,
        Some("useCandidateOrder") => TieBreakMode::UseCandidateOrder,
        Some("random") => {
            let seed = match config.random_seed.as_ref().map(|s| s.trim().parse::<u32>()) {
                Some(Ok(x)) => x,
                x => {
                    whatever!(
                        "Tiebreak mode random needs a numeric randomSeed, got {:?}",
                        x
                    )
                }
            };
            TieBreakMode::Random(seed)
        }
        Some(x) => {
            whatever!("Unknown tiebreak mode {:?}", x)
        }
    };
    Ok(VoteRules { tiebreak_mode })
}

pub fn validate_apportionment_rules(config: &RcvConfig) -> RcvResult<ApportionmentRules> {
    match config.max_seats {
        None => Ok(ApportionmentRules::DEFAULT_RULES),
        Some(0) => whatever!("maxSeats must be at least 1"),
        Some(max_seats) => Ok(ApportionmentRules { max_seats }),
    }
}

/// Reads a summary written by a previous run, for comparison.
pub fn read_summary(path: &str) -> RcvResult<JSValue> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_summary: {:?}", js);
    Ok(js)
}
