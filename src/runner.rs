use crate::builtins;
use crate::environment::Environment;
use crate::error::TernError;
use crate::value::Value;

/// Runs a whole script against a fresh root environment, reporting any
/// error against the source before returning it.
pub fn run(source: &str, filename: Option<&str>) -> Result<Value, TernError> {
    run_in(source, filename, &builtins::global_environment())
}

/// Like [`run`], but evaluates in the caller's environment so bindings
/// survive for a following REPL session.
pub fn run_in(source: &str, filename: Option<&str>, env: &Environment) -> Result<Value, TernError> {
    let result = crate::parse_and_evaluate(source, env);
    if let Err(ref error) = result {
        tracing::debug!(kind = ?error.kind, "script failed");
        error.report(source, filename);
    }
    result
}
