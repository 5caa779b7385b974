use clap::Parser;
use std::process::ExitCode;
use tcpsweep::cli::{self, Args};
use tcpsweep::{logging, output};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(args.verbose, args.quiet);

    match cli::execute(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
