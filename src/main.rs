use std::io;

use bidstore::cli::{Args, CliError, Session};
use bidstore::logger::initialize_logger;
use clap::Parser;

fn main() -> Result<(), CliError> {
    initialize_logger();
    let args = Args::parse();

    let mut session = Session::new(&args, io::stdin().lock(), io::stdout().lock())?;
    session.run()
}
