use clap::Parser;
use compat_cli::{execute, init_logging, parse_exit_code, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return ExitCode::from(parse_exit_code(&err));
        }
    };
    init_logging(&cli);
    ExitCode::from(execute(&cli))
}
