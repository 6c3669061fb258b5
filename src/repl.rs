use crate::builtins;
use crate::environment::Environment;
use std::io::{self, BufRead, Write};

/// Interactive loop over standard input with a persistent root environment.
pub fn start() {
    start_with(&builtins::global_environment());
}

/// Interactive loop that evaluates every line in `env`.
pub fn start_with(env: &Environment) {
    println!("Tern Interpreter v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'exit' or press Ctrl+D to quit");
    println!();

    let stdin = io::stdin();
    let mut lines = stdin.lock();

    loop {
        print!("> ");
        if let Err(error) = io::stdout().flush() {
            tracing::warn!(%error, "failed to flush prompt");
        }

        let mut line = String::new();
        match lines.read_line(&mut line) {
            Ok(0) => {
                // EOF reached (Ctrl+D or piped input ended)
                println!();
                break;
            }
            Ok(_) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "exit" || line == "quit" {
                    println!("Goodbye!");
                    break;
                }

                run_repl_command(line, env);
            }
            Err(error) => {
                eprintln!("Error reading input: {}", error);
                break;
            }
        }
    }
}

fn run_repl_command(source: &str, env: &Environment) {
    match crate::parse_and_evaluate(source, env) {
        Ok(value) => println!("{}", value),
        Err(error) => error.report(source, None),
    }
}
