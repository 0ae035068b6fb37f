use clap::Parser;
use log::{debug, LevelFilter};
use snafu::ErrorCompat;

mod args;
mod rcv;

fn main() {
    let args = args::Args::parse();

    let mut logger = env_logger::Builder::from_default_env();
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();
    debug!("args: {:?}", args);

    if let Err(e) = rcv::run_election(&args) {
        eprintln!("An error occured: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            debug!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
