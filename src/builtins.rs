use crate::environment::Environment;
use crate::error::{Span, TernError};
use crate::value::{NativeFunction, Value};
use std::cell::RefCell;
use std::io::{self, Write};
use std::rc::Rc;

/// Shared output sink for `print`.
pub type Output = Rc<RefCell<dyn Write>>;

/// Root environment with `true`, `false`, `null` and a `print` that writes
/// to standard output.
pub fn global_environment() -> Environment {
    global_environment_with_output(Rc::new(RefCell::new(io::stdout())))
}

/// Root environment whose `print` writes to `output`.
pub fn global_environment_with_output(output: Output) -> Environment {
    let env = Environment::new();
    let bindings = [
        ("true", Value::Boolean(true), true),
        ("false", Value::Boolean(false), true),
        ("null", Value::Null, true),
        ("print", Value::NativeFunction(print_function(output)), false),
    ];

    for (name, value, constant) in bindings {
        // Fresh scope, so declaring can only fail on a duplicate in this table.
        if let Err(error) = env.declare(name, value, constant) {
            tracing::error!(%error, "failed to bind builtin");
        }
    }

    env
}

/// Writes the display form of each argument, space separated, then a newline.
pub fn print_function(output: Output) -> NativeFunction {
    NativeFunction::new("print", move |args, _env| {
        let line = args
            .iter()
            .map(|arg| arg.to_string())
            .collect::<Vec<_>>()
            .join(" ");

        let mut out = output.borrow_mut();
        writeln!(out, "{}", line)
            .and_then(|_| out.flush())
            .map_err(|io_error| {
                // Placeholder span; the evaluator moves it to the call site.
                TernError::runtime_error(
                    Span::new(0, 0),
                    format!("print failed to write output: {}", io_error),
                )
            })?;

        Ok(Value::Null)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn literal_bindings_are_constant() {
        let env = global_environment();
        assert_eq!(env.get("true").unwrap(), Value::Boolean(true));
        assert_eq!(env.get("false").unwrap(), Value::Boolean(false));
        assert_eq!(env.get("null").unwrap(), Value::Null);
        assert!(env.is_constant("true"));
        assert!(env.is_constant("null"));
        assert!(!env.is_constant("print"));
    }

    #[test]
    fn print_writes_space_separated_line() {
        let buffer = Rc::new(RefCell::new(Vec::<u8>::new()));
        let env = global_environment_with_output(buffer.clone());

        let print = match env.get("print").unwrap() {
            Value::NativeFunction(native) => native,
            other => panic!("expected native function, got {:?}", other),
        };
        let result = (print.call)(
            &[Value::String("hi".to_string()), Value::Number(3.0), Value::Null],
            &env,
        )
        .unwrap();

        assert_eq!(result, Value::Null);
        assert_eq!(String::from_utf8(buffer.borrow().clone()).unwrap(), "hi 3 null\n");
    }
}
