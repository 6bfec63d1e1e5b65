use linklens_core::init_logging;

mod cli;

use crate::cli::Cli;

fn main() {
    // Initialize logging as early as possible.
    init_logging();

    if let Err(err) = Cli::run_from_args() {
        eprintln!("linklens error: {:#}", err);
        std::process::exit(1);
    }
}
