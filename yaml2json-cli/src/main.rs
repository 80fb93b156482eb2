// These Clippy lints are disabled because this is a CLI binary, not a library:
// - print_stderr: failures are reported to the user on stderr.
// - exit: Calling `std::process::exit()` is standard for CLI apps to signal failure to the shell.
#![allow(clippy::print_stderr, clippy::exit)]

mod cli;
mod logging;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
