use std::io::{self, BufRead, Write};

use plexwatch_core::prelude::*;

const QUESTION: &str = "Do you want to overwrite the cached configuration? [y/N]: ";

/// Console confirmation for replacing cached credentials.
pub fn confirm_on_console(_cached: &ServerCredentials, _provided: &ServerCredentials) -> bool {
    let stdin = io::stdin();
    let stdout = io::stdout();
    ask_overwrite(stdin.lock(), stdout.lock())
}

/// Repeats the question until it reads `y` or `n`. An empty answer or a
/// closed input counts as `n`.
pub fn ask_overwrite<R: BufRead, W: Write>(mut input: R, mut output: W) -> bool {
    let mut line = String::new();
    loop {
        if write!(output, "{QUESTION}").and_then(|_| output.flush()).is_err() {
            return false;
        }
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => return false,
            Ok(_) => {}
        }
        match line.trim().to_ascii_lowercase().as_str() {
            "y" => return true,
            "n" | "" => return false,
            _ => continue,
        }
    }
}
