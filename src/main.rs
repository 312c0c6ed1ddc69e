use clap::Parser;
use sqldb_table::cli::{self, parsers::CliParser};

fn main() {
    env_logger::init();

    let parser = CliParser::parse();
    if let Err(message) = cli::run(parser.command) {
        eprintln!("{}", message);
        std::process::exit(1);
    }
}
