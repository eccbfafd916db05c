use std::process::ExitCode;

fn main() -> ExitCode {
    arborist::cli::run()
}
