#[macro_use]
extern crate log;

use std::process::ExitCode;

use clap::Parser as _;
use jtl_reporter::error::find_report_error;

mod cli;

const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
const CRATE_VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = cli::CliArgs::parse();
    info!("{CRATE_NAME} {CRATE_VERSION}");

    let config = args.into_config();
    debug!("Using config: {config:?}");

    match jtl_reporter::generate_report(&config) {
        Ok(output) => {
            info!(
                "Summarized {} records across {} labels into {} charts",
                output.records,
                output.summary.len(),
                output.charts.len()
            );
            println!("Report generated in '{}'", output.report_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            debug!("Report failed: {e:?}");
            match find_report_error(&e) {
                Some(report_error) => eprintln!("Error: {report_error}"),
                None => eprintln!("Error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}
