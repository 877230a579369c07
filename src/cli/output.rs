//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::exitcode;

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print plain output (no color, for data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Join `parts` with spaces and report them.
///
/// With `kill` the message is fatal and the process exits with
/// [`exitcode::SOFTWARE`]; otherwise it is printed as a warning and returned.
pub fn log(parts: &[&str], kill: bool) -> String {
    let msg = parts.join(" ");
    if kill {
        fatal(&msg, exitcode::SOFTWARE);
    }
    warning(&msg);
    msg
}

/// Print error and exit with `code`.
pub fn fatal(msg: &(impl std::fmt::Display + ?Sized), code: i32) -> ! {
    error(msg);
    std::process::exit(code)
}
