use std::process::ExitCode;

fn main() -> ExitCode {
    petrate_cli::run()
}
