use std::{env, process};

use oikos_core::cli::{self, output};

fn main() {
    let invocation = match cli::parse(env::args().skip(1)) {
        Ok(invocation) => invocation,
        Err(err) => {
            output::error(&err);
            eprintln!("{}", cli::usage());
            process::exit(2);
        }
    };

    if let Err(err) = cli::run(invocation) {
        output::error(format!("Error: {err}"));
        process::exit(1);
    }
}
