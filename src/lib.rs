// Tern Language Interpreter Library
//
// Core pipeline for the Tern scripting language: source text is tokenized,
// parsed into a syntax tree, and evaluated by a tree-walking interpreter
// over a lexically scoped environment chain.

// Public modules
pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod value;

// Re-export commonly used items
pub use ast::{Expr, Program, Stmt};
pub use builtins::{global_environment, global_environment_with_output};
pub use environment::{Environment, EnvironmentError};
pub use error::{ErrorKind, Span, TernError};
pub use evaluator::{evaluate, Evaluator};
pub use lexer::{tokenize, Lexer, Token, TokenKind};
pub use parser::{parse, Parser};
pub use value::{NativeFunction, Value};

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;

/// Tokenize, parse and evaluate `source` against `env`.
pub fn parse_and_evaluate(source: &str, env: &Environment) -> Result<Value, TernError> {
    let tokens = tokenize(source)?;
    let program = parse(tokens)?;
    tracing::trace!(%program, "evaluating program");
    evaluate(&program, env)
}
