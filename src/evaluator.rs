use crate::ast::{BinaryOp, ComparisonOp, Expr, LogicalOp, Program, Stmt, UnaryOp};
use crate::builtins;
use crate::environment::{Environment, EnvironmentError};
use crate::error::{Span, TernError};
use crate::value::{FunctionValue, ObjectMap, Value};
use std::cmp::Ordering;
use std::rc::Rc;

/// Evaluate `program` in `env`.
pub fn evaluate(program: &Program, env: &Environment) -> Result<Value, TernError> {
    Evaluator::with_environment(env.clone()).evaluate_program(program)
}

/// Tree-walking evaluator. Holds only the root environment; every other
/// scope is created and dropped during evaluation.
pub struct Evaluator {
    environment: Environment,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl Evaluator {
    /// An evaluator over a fresh root environment with the builtins bound.
    pub fn new() -> Self {
        Self {
            environment: builtins::global_environment(),
        }
    }

    pub fn with_environment(environment: Environment) -> Self {
        Self { environment }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn evaluate_program(&self, program: &Program) -> Result<Value, TernError> {
        let mut last = Value::Null;
        for statement in &program.statements {
            last = self.evaluate_statement(statement, &self.environment)?;
        }
        Ok(last)
    }

    pub fn evaluate_statement(&self, stmt: &Stmt, env: &Environment) -> Result<Value, TernError> {
        match stmt {
            Stmt::Expression { expr, .. } => self.evaluate_expression(expr, env),
            Stmt::VariableDeclaration {
                identifier,
                value,
                constant,
                span,
            } => {
                let value = match value {
                    Some(expr) => self.evaluate_expression(expr, env)?,
                    None => Value::Null,
                };
                env.declare(identifier, value, *constant)
                    .map_err(|error| environment_error(error, span))
            }
            Stmt::FunctionDeclaration {
                name,
                parameters,
                body,
                span,
            } => {
                let function = Value::Function(Rc::new(FunctionValue {
                    name: name.clone(),
                    parameters: parameters.clone(),
                    body: Rc::clone(body),
                    closure: env.clone(),
                }));
                env.declare(name, function, true)
                    .map_err(|error| environment_error(error, span))?;
                Ok(Value::Null)
            }
            Stmt::If {
                condition,
                body,
                else_ifs,
                else_body,
                ..
            } => {
                if self.evaluate_expression(condition, env)?.is_truthy() {
                    return self.evaluate_block(body, env);
                }

                for branch in else_ifs {
                    if self.evaluate_expression(&branch.condition, env)?.is_truthy() {
                        return self.evaluate_block(&branch.body, env);
                    }
                }

                match else_body {
                    Some(else_body) => self.evaluate_block(else_body, env),
                    None => Ok(Value::Null),
                }
            }
        }
    }

    /// Runs `statements` in one fresh child scope of `env` and yields the
    /// value of the last one.
    fn evaluate_block(&self, statements: &[Stmt], env: &Environment) -> Result<Value, TernError> {
        let scope = Environment::with_parent(env);
        tracing::trace!(statements = statements.len(), "entering block scope");
        self.evaluate_sequence(statements, &scope)
    }

    fn evaluate_sequence(
        &self,
        statements: &[Stmt],
        env: &Environment,
    ) -> Result<Value, TernError> {
        let mut last = Value::Null;
        for statement in statements {
            last = self.evaluate_statement(statement, env)?;
        }
        Ok(last)
    }

    pub fn evaluate_expression(&self, expr: &Expr, env: &Environment) -> Result<Value, TernError> {
        match expr {
            Expr::NumericLiteral { value, .. } => Ok(Value::Number(*value)),
            Expr::StringLiteral { value, .. } => Ok(Value::String(value.clone())),
            Expr::Identifier { symbol, span } => env
                .get(symbol)
                .map_err(|error| environment_error(error, span)),
            Expr::Binary {
                left,
                operator,
                right,
                span,
            } => {
                let left_val = self.evaluate_expression(left, env)?;
                let right_val = self.evaluate_expression(right, env)?;
                evaluate_binary_op(*operator, left_val, right_val, span)
            }
            Expr::Unary {
                operator, operand, ..
            } => {
                let operand_val = self.evaluate_expression(operand, env)?;
                match operator {
                    UnaryOp::Not => Ok(Value::Boolean(!operand_val.is_truthy())),
                }
            }
            Expr::Logical {
                left,
                operator,
                right,
                ..
            } => {
                // Both sides are always evaluated; there is no short-circuit.
                let left_val = self.evaluate_expression(left, env)?;
                let right_val = self.evaluate_expression(right, env)?;
                let result = match operator {
                    LogicalOp::And => left_val.is_truthy() && right_val.is_truthy(),
                    LogicalOp::Or => left_val.is_truthy() || right_val.is_truthy(),
                };
                Ok(Value::Boolean(result))
            }
            Expr::Comparison {
                left,
                operator,
                right,
                ..
            } => {
                let left_val = self.evaluate_expression(left, env)?;
                let right_val = self.evaluate_expression(right, env)?;
                Ok(Value::Boolean(evaluate_comparison(
                    *operator, &left_val, &right_val,
                )))
            }
            Expr::Assignment {
                assignee,
                value,
                span,
            } => {
                let name = match assignee.as_ref() {
                    Expr::Identifier { symbol, .. } => symbol,
                    other => {
                        return Err(TernError::runtime_error_with_help(
                            other.span().clone(),
                            format!("Invalid assignment target '{}'", other),
                            "Only variables can be assigned to. Example: x = 10".to_string(),
                        ));
                    }
                };
                let value = self.evaluate_expression(value, env)?;
                env.assign(name, value)
                    .map_err(|error| environment_error(error, span))
            }
            Expr::Object { properties, .. } => {
                let mut object = ObjectMap::new();
                for property in properties {
                    let value = self.evaluate_expression(&property.value, env)?;
                    // Later duplicates overwrite the value but keep the first position.
                    object.insert(property.key.clone(), value);
                }
                Ok(Value::object(object))
            }
            Expr::Member {
                object,
                property,
                span,
            } => {
                let object_value = self.evaluate_expression(object, env)?;
                match object_value {
                    Value::Object(properties) => properties.get(property).cloned().ok_or_else(|| {
                        TernError::runtime_error(
                            span.clone(),
                            format!("Member not found: {}", property),
                        )
                    }),
                    other => Err(TernError::runtime_error_with_help(
                        object.span().clone(),
                        format!("Cannot access member of non-object: {}", other.type_name()),
                        format!(
                            "'{}' evaluates to a {}, which has no members.",
                            object,
                            other.type_name()
                        ),
                    )),
                }
            }
            Expr::Call { caller, args, span } => {
                let mut arg_values = Vec::with_capacity(args.len());
                for arg in args {
                    arg_values.push(self.evaluate_expression(arg, env)?);
                }
                let callee = self.evaluate_expression(caller, env)?;
                self.call_value(callee, arg_values, env, span)
            }
        }
    }

    fn call_value(
        &self,
        callee: Value,
        args: Vec<Value>,
        env: &Environment,
        span: &Span,
    ) -> Result<Value, TernError> {
        match callee {
            Value::NativeFunction(native) => {
                tracing::trace!(name = %native.name, args = args.len(), "calling native function");
                // Natives have no view of the source, so their errors point at the call.
                (native.call)(&args, env).map_err(|error| error.with_span(span.clone()))
            }
            Value::Function(function) => {
                tracing::trace!(name = %function.name, args = args.len(), "calling function");

                // Lexical scoping: the new scope hangs off the declaration site.
                let scope = Environment::with_parent(&function.closure);
                let mut args = args.into_iter();
                for parameter in &function.parameters {
                    let value = args.next().unwrap_or(Value::Null);
                    scope
                        .declare(parameter, value, false)
                        .map_err(|error| environment_error(error, span))?;
                }

                self.evaluate_sequence(&function.body, &scope)
            }
            other => Err(TernError::runtime_error_with_help(
                span.clone(),
                format!("Cannot call a value that is not a function: {}", other.type_name()),
                "Only functions declared with 'fn' and builtins such as print can be called."
                    .to_string(),
            )),
        }
    }
}

fn environment_error(error: EnvironmentError, span: &Span) -> TernError {
    let help = match &error {
        EnvironmentError::Undefined(name) => {
            format!("Declare it first: let {} = value", name)
        }
        EnvironmentError::ConstantReassignment(name) => {
            format!(
                "'{}' was declared with const or fn; use let for reassignable variables.",
                name
            )
        }
        EnvironmentError::Redeclaration(name) => {
            format!(
                "'{}' already exists in this scope; assign it with {} = value instead.",
                name, name
            )
        }
    };
    TernError::runtime_error_with_help(span.clone(), error.to_string(), help)
}

/// Arithmetic on two numbers, concatenation on two strings; any other
/// pairing yields `Null` rather than an error.
fn evaluate_binary_op(
    operator: BinaryOp,
    left: Value,
    right: Value,
    span: &Span,
) -> Result<Value, TernError> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => {
            let result = match operator {
                BinaryOp::Add => l + r,
                BinaryOp::Subtract => l - r,
                BinaryOp::Multiply => l * r,
                BinaryOp::Divide | BinaryOp::Modulo if r == 0.0 => {
                    return Err(TernError::runtime_error(
                        span.clone(),
                        "Cannot divide by 0".to_string(),
                    ));
                }
                BinaryOp::Divide => l / r,
                BinaryOp::Modulo => l % r,
            };
            Ok(Value::Number(result))
        }
        (Value::String(l), Value::String(r)) if operator == BinaryOp::Add => {
            Ok(Value::String(l + &r))
        }
        _ => Ok(Value::Null),
    }
}

fn evaluate_comparison(operator: ComparisonOp, left: &Value, right: &Value) -> bool {
    match operator {
        ComparisonOp::Equal => left.strict_equals(right),
        ComparisonOp::NotEqual => !left.strict_equals(right),
        ComparisonOp::Less => matches!(ordering(left, right), Some(Ordering::Less)),
        ComparisonOp::Greater => matches!(ordering(left, right), Some(Ordering::Greater)),
        ComparisonOp::LessEqual => matches!(
            ordering(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
        ComparisonOp::GreaterEqual => matches!(
            ordering(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

/// Numbers order numerically and strings lexicographically; nothing else orders.
fn ordering(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => l.partial_cmp(r),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    }
}
