use std::env;
use std::fs;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::process::exit;

use akane::Interpreter;

/// Number of parser trace entries reported after a parse failure.
const PARSE_TRACE_THRESHOLD: usize = 61;

fn main() {
    let args: Vec<String> = env::args().collect();

    let mut script: Option<String> = None;
    for arg in &args[1..] {
        match arg.as_str() {
            "--version" | "-v" => {
                println!("akane");
                return;
            }
            // Accepted for compatibility; does not alter evaluation.
            "--verbose" | "-V" => {}
            _ => {
                if script.is_none() {
                    script = Some(arg.clone());
                }
            }
        }
    }

    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    let akane_home = PathBuf::from(home).join(".akane");

    let (input, file_name) = match script {
        Some(path) => match fs::read_to_string(&path) {
            Ok(contents) => (contents, path),
            Err(_) => {
                println!("can't open file {}, aborting", path);
                exit(1);
            }
        },
        None => {
            if io::stdin().is_terminal() {
                akane::repl::run_repl();
                return;
            }
            let mut buffer = String::new();
            if io::stdin().read_to_string(&mut buffer).is_err() {
                println!("can't read STDIN, aborting");
                exit(1);
            }
            (buffer, "STDIN".to_string())
        }
    };

    let mut interpreter = Interpreter::new(&akane_home, &file_name);
    match interpreter.run(&input) {
        Ok(_) => {
            print!("{}", interpreter.output());
        }
        Err(err) if err.kind.is_parse() => {
            println!("Error parsing script {}", file_name);
            println!("{}", err);
            println!("last statements from the parser:");
            println!();
            let trace = interpreter.parse_trace();
            let start = trace.len().saturating_sub(PARSE_TRACE_THRESHOLD);
            for entry in &trace[start..] {
                println!("\t{}", entry);
            }
            exit(1);
        }
        Err(err) => {
            print!("{}", interpreter.output());
            eprintln!("{}", err);
            if !err.backtrace.is_empty() {
                eprintln!("{}", err.backtrace);
            }
            exit(1);
        }
    }
}
