use std::process::ExitCode;

use pl0c_drv::{cli::Cli, config::Config, error::DriverError, init_logging, session};

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    init_logging(cli.verbose);

    let config = Config::from_cli(cli);
    match session::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}

fn report(err: &DriverError) {
    eprintln!("error: {err}");
}
