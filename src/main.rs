use std::{io, process::exit};
use log::error;
use modules::config::get_arguments;
use modules::dynamo::Dynamo;
use modules::loader::{exit_code, run};
use modules::utility::setup_logger;

mod modules;

#[tokio::main(basic_scheduler)]
async fn main() {
    // usage errors print to stderr and exit with 1, --help and --version exit with 0
    let (filename, config) = get_arguments().unwrap_or_else(|error| error.exit());

    if let Err(error) = setup_logger(&config) {
        eprintln!("Cannot set up logging: {}", error);
        exit(1);
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = run(&config, &filename, Dynamo::connect, &mut out).await;
    match &result {
        Ok(report) if report.has_failures() => error!("Failed items: {}", report.failed.join(", ")),
        Ok(_) => {}
        Err(error) => eprintln!("{}", error),
    }

    exit(exit_code(&config, &result));
}
