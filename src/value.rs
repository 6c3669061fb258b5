use crate::ast::Stmt;
use crate::environment::Environment;
use crate::error::TernError;
use indexmap::IndexMap;
use std::fmt;
use std::rc::Rc;

/// Insertion-ordered property map backing object values.
pub type ObjectMap = IndexMap<String, Value>;

/// Host callable signature: evaluated arguments plus the calling environment.
pub type NativeFn = dyn Fn(&[Value], &Environment) -> Result<Value, TernError>;

#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    String(String),
    Boolean(bool),
    Null,
    /// Objects are shared; equality is by identity.
    Object(Rc<ObjectMap>),
    Function(Rc<FunctionValue>),
    NativeFunction(NativeFunction),
}

/// A user function together with the environment it was declared in.
#[derive(Debug)]
pub struct FunctionValue {
    pub name: String,
    pub parameters: Vec<String>,
    pub body: Rc<Vec<Stmt>>,
    pub closure: Environment,
}

#[derive(Clone)]
pub struct NativeFunction {
    pub name: String,
    pub call: Rc<NativeFn>,
}

impl NativeFunction {
    pub fn new<F>(name: &str, call: F) -> Self
    where
        F: Fn(&[Value], &Environment) -> Result<Value, TernError> + 'static,
    {
        Self {
            name: name.to_string(),
            call: Rc::new(call),
        }
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Value {
    pub fn object(properties: ObjectMap) -> Self {
        Value::Object(Rc::new(properties))
    }

    /// Falsy values are `false`, `0`, `NaN`, `""` and `null`.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::String(s) => !s.is_empty(),
            Value::Object(_) | Value::Function(_) | Value::NativeFunction(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::Null => "null",
            Value::Object(_) => "object",
            Value::Function(_) => "function",
            Value::NativeFunction(_) => "native function",
        }
    }

    /// Strict equality: same tag and same value, identity for reference values.
    pub fn strict_equals(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(l), Value::Number(r)) => l == r,
            (Value::String(l), Value::String(r)) => l == r,
            (Value::Boolean(l), Value::Boolean(r)) => l == r,
            (Value::Null, Value::Null) => true,
            (Value::Object(l), Value::Object(r)) => Rc::ptr_eq(l, r),
            (Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
            (Value::NativeFunction(l), Value::NativeFunction(r)) => Rc::ptr_eq(&l.call, &r.call),
            _ => false,
        }
    }

    fn fmt_nested(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "'{}'", s),
            other => write!(f, "{}", other),
        }
    }
}

impl PartialEq for Value {
    /// Structural for objects so tests can compare whole values.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Object(l), Value::Object(r)) => {
                Rc::ptr_eq(l, r)
                    || (l.len() == r.len()
                        && l.iter()
                            .zip(r.iter())
                            .all(|((lk, lv), (rk, rv))| lk == rk && lv == rv))
            }
            _ => self.strict_equals(other),
        }
    }
}

pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 {
            "Infinity".to_string()
        } else {
            "-Infinity".to_string()
        }
    } else if n == 0.0 {
        // Covers negative zero.
        "0".to_string()
    } else if n.abs() >= 1e21 || n.abs() < 1e-6 {
        // `{:e}` gives `1e23` and `1.5e-7`; the exponent always carries a sign.
        let formatted = format!("{:e}", n);
        match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        }
    } else {
        format!("{}", n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Null => write!(f, "null"),
            Value::Object(properties) => {
                if properties.is_empty() {
                    return write!(f, "{{}}");
                }
                write!(f, "{{ ")?;
                for (i, (key, value)) in properties.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: ", key)?;
                    value.fmt_nested(f)?;
                }
                write!(f, " }}")
            }
            Value::Function(function) => write!(f, "[Function {}]", function.name),
            Value::NativeFunction(native) => write!(f, "[NativeFunction {}]", native.name),
        }
    }
}
