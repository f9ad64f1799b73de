//! Emolox command-line driver.
//!
//! `emolox <command> <filename>` reads the file and runs one pipeline
//! stage: `tokenize` prints the token stream, `parse` prints the
//! s-expression form of each statement, `evaluate` evaluates a single
//! expression, and `run` executes the program.
//!
//! Exit codes: 0 success, 1 usage or file errors, 65 scan or parse
//! errors, 70 runtime errors.

use std::env;
use std::fs;
use std::io;
use std::process;

use anyhow::{self, Context};

use emolox::interpreter::{Interpreter, LoxError};

fn main() -> Result<(), anyhow::Error> {
    let mut args = env::args().skip(1);
    let (command, filename) = match (args.next(), args.next()) {
        (Some(command), Some(filename)) => (command, filename),
        _ => {
            eprintln!("Usage: emolox <tokenize|parse|evaluate|run> <filename>");
            process::exit(1);
        }
    };

    let source =
        fs::read_to_string(&filename).with_context(|| format!("failed to read {}", filename))?;

    let mut stdout = io::stdout();
    let result = {
        let mut interp = Interpreter::new(&mut stdout);
        match command.as_str() {
            "tokenize" => interp.tokenize(&source),
            "parse" => interp.parse(&source),
            "evaluate" => interp.evaluate(&source),
            "run" => interp.run(&source),
            _ => {
                eprintln!("Unknown command: {}", command);
                process::exit(1);
            }
        }
    };

    match result {
        Ok(()) => Ok(()),
        Err(LoxError::Parse(diags)) => {
            for diag in &diags {
                eprintln!("{}", diag);
            }
            process::exit(65);
        }
        Err(LoxError::Runtime(e)) => {
            // Program mode surfaces runtime failures on stdout; the
            // single-expression mode keeps stdout clean.
            if command == "run" {
                println!("{}", e);
            } else {
                eprintln!("{}", e);
            }
            process::exit(70);
        }
        Err(LoxError::Io(e)) => Err(e.into()),
    }
}
