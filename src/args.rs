use clap::Parser;

/// This is an election tabulation program for ranked-choice and party-list votes.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The file containing the election data in JSON format: an array of
    /// ranked ballots, or an object mapping each party to its votes.
    #[clap(value_parser)]
    pub input: String,

    /// (irv, btr-irv, stv or sainte-lague) The tabulation method. The aliases btr and b2
    /// stand for btr-irv, webster and pr for sainte-lague. Defaults to btr-irv for one
    /// seat, stv for several seats, and sainte-lague for party votes.
    #[clap(short, long, value_parser)]
    pub method: Option<String>,

    /// (default 1) The number of seats to fill.
    #[clap(short, long, value_parser, default_value_t = 1)]
    pub seats: u32,

    /// (file path, optional) A JSON file with the rules of the election: tie-break mode,
    /// random seed, maximum number of seats and contest name.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the election will be written
    /// in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the outcome of an election in JSON format. If
    /// provided, rcvplus will check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
