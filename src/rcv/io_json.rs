use crate::rcv::*;

use election_tally::builder::Builder;

/// The content of an election file, once its shape has been recognized.
#[derive(Debug, Clone)]
pub enum ElectionInput {
    /// An array of ranked ballots.
    Ranked(BallotSet),
    /// An object mapping each party to its votes.
    Proportional(PartyVoteMap),
}

pub fn read_election(path: &str) -> RcvResult<ElectionInput> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    parse_election(&js).context(TabulationSnafu {})
}

pub fn parse_election(js: &JSValue) -> Result<ElectionInput, VotingErrors> {
    match js {
        JSValue::Array(l) => parse_ballots(l).map(ElectionInput::Ranked),
        JSValue::Object(m) => parse_party_votes(m).map(ElectionInput::Proportional),
        _ => Err(malformed(
            "expected an array of ballots or an object of party votes".to_string(),
        )),
    }
}

fn malformed(reason: String) -> VotingErrors {
    VotingErrors::MalformedInput { reason }
}

fn parse_ballots(l: &[JSValue]) -> Result<BallotSet, VotingErrors> {
    let mut builder = Builder::new();
    for (idx, elt) in l.iter().enumerate() {
        let obj = elt
            .as_object()
            .ok_or_else(|| malformed(format!("ballot {}: expected an object", idx)))?;
        let ranking = match obj.get("ranking") {
            Some(JSValue::Array(names)) => names
                .iter()
                .map(|n| {
                    n.as_str().map(|s| s.to_string()).ok_or_else(|| {
                        malformed(format!(
                            "ballot {}: ranking must only contain strings, found {}",
                            idx, n
                        ))
                    })
                })
                .collect::<Result<Vec<String>, VotingErrors>>()?,
            Some(x) => {
                return Err(malformed(format!(
                    "ballot {}: ranking must be an array, found {}",
                    idx, x
                )))
            }
            None => return Err(malformed(format!("ballot {}: missing ranking", idx))),
        };
        let weight = match obj.get("count") {
            None => VoteWeight::from_integer(1),
            Some(c) => read_number(c)
                .ok_or_else(|| malformed(format!("ballot {}: count must be a number", idx)))?,
        };
        builder.add_ballot(Ballot { ranking, weight })?;
    }
    debug!("parse_ballots: {} ballots", builder.len());
    builder.build()
}

fn parse_party_votes(m: &JSMap<String, JSValue>) -> Result<PartyVoteMap, VotingErrors> {
    let mut entries: Vec<(String, VoteWeight)> = Vec::new();
    for (party, votes) in m.iter() {
        let w = read_number(votes).ok_or_else(|| {
            malformed(format!("party {:?}: votes must be a number, found {}", party, votes))
        })?;
        entries.push((party.clone(), w));
    }
    PartyVoteMap::new(entries)
}

// JSON numbers are read exactly, from their textual form.
fn read_number(js: &JSValue) -> Option<VoteWeight> {
    match js {
        JSValue::Number(n) => VoteWeight::parse_decimal(&n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> Result<ElectionInput, VotingErrors> {
        parse_election(&serde_json::from_str(s).unwrap())
    }

    fn ranked(s: &str) -> BallotSet {
        match parse(s).unwrap() {
            ElectionInput::Ranked(b) => b,
            x => panic!("expected ballots, got {:?}", x),
        }
    }

    #[test]
    fn ballots_with_counts() {
        let ballots = ranked(
            r#"[{"count": 3, "ranking": ["B", "A"]}, {"ranking": ["C"]}, {"count": 0.5, "ranking": []}]"#,
        );
        assert_eq!(ballots.candidates(), &["A", "B", "C"]);
        assert_eq!(ballots.ballots().len(), 3);
        assert_eq!(ballots.ballots()[1].weight, VoteWeight::from_integer(1));
        assert_eq!(ballots.total_weight(), &VoteWeight::from_ratio(9, 2));
    }

    #[test]
    fn party_votes() {
        match parse(r#"{"Reds": 120, "Blues": 0, "Greens": 2.5}"#).unwrap() {
            ElectionInput::Proportional(p) => {
                let names: Vec<&str> = p.parties().iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["Blues", "Greens", "Reds"]);
                assert_eq!(p.parties()[1].1, VoteWeight::from_ratio(5, 2));
            }
            x => panic!("expected party votes, got {:?}", x),
        }
    }

    fn assert_malformed(s: &str) {
        assert!(
            matches!(parse(s), Err(VotingErrors::MalformedInput { .. })),
            "{} should be rejected",
            s
        );
    }

    #[test]
    fn malformed_inputs() {
        assert_malformed("3");
        assert_malformed(r#"["A"]"#);
        assert_malformed(r#"[{"count": 2}]"#);
        assert_malformed(r#"[{"ranking": "A"}]"#);
        assert_malformed(r#"[{"ranking": ["A", 3]}]"#);
        assert_malformed(r#"[{"ranking": ["A", "B", "A"]}]"#);
        assert_malformed(r#"[{"count": -1, "ranking": ["A"]}]"#);
        assert_malformed(r#"[{"count": 0, "ranking": ["A"]}]"#);
        assert_malformed(r#"[{"count": "2", "ranking": ["A"]}]"#);
        assert_malformed(r#"{"A": -3}"#);
        assert_malformed(r#"{"A": "many"}"#);
    }

    #[test]
    fn empty_inputs() {
        assert!(matches!(parse("[]"), Err(VotingErrors::EmptyElection { .. })));
        assert!(matches!(
            parse(r#"[{"ranking": []}]"#),
            Err(VotingErrors::EmptyElection { .. })
        ));
        assert!(matches!(parse("{}"), Err(VotingErrors::EmptyElection { .. })));
    }

    #[test]
    fn reads_the_fixture() {
        let path = format!("{}/tests/data/irv_elimination.json", env!("CARGO_MANIFEST_DIR"));
        match read_election(&path).unwrap() {
            ElectionInput::Ranked(b) => assert_eq!(b.candidates(), &["A", "B", "C"]),
            x => panic!("expected ballots, got {:?}", x),
        }
        assert!(matches!(
            read_election("/nonexistent/election.json"),
            Err(RcvError::OpeningJson { .. })
        ));
    }
}
