use crate::error::Span;
use std::fmt;
use std::rc::Rc;

// Syntax tree produced once by the parser and only read afterwards.
// Function bodies sit behind `Rc` so function values can share them.

#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    VariableDeclaration {
        identifier: String,
        value: Option<Expr>,
        constant: bool,
        span: Span,
    },
    FunctionDeclaration {
        name: String,
        parameters: Vec<String>,
        body: Rc<Vec<Stmt>>,
        span: Span,
    },
    If {
        condition: Expr,
        body: Vec<Stmt>,
        else_ifs: Vec<ElseIfBranch>,
        else_body: Option<Vec<Stmt>>,
        span: Span,
    },
    Expression {
        expr: Expr,
        span: Span,
    },
}

#[derive(Debug, Clone)]
pub struct ElseIfBranch {
    pub condition: Expr,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    /// The assignee is only checked to be an identifier at evaluation time.
    Assignment {
        assignee: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    Object {
        properties: Vec<Property>,
        span: Span,
    },
    Logical {
        left: Box<Expr>,
        operator: LogicalOp,
        right: Box<Expr>,
        span: Span,
    },
    Comparison {
        left: Box<Expr>,
        operator: ComparisonOp,
        right: Box<Expr>,
        span: Span,
    },
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
        span: Span,
    },
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    Call {
        caller: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Member {
        object: Box<Expr>,
        property: String,
        span: Span,
    },
    Identifier {
        symbol: String,
        span: Span,
    },
    NumericLiteral {
        value: f64,
        span: Span,
    },
    StringLiteral {
        value: String,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Assignment { span, .. } => span,
            Expr::Object { span, .. } => span,
            Expr::Logical { span, .. } => span,
            Expr::Comparison { span, .. } => span,
            Expr::Binary { span, .. } => span,
            Expr::Unary { span, .. } => span,
            Expr::Call { span, .. } => span,
            Expr::Member { span, .. } => span,
            Expr::Identifier { span, .. } => span,
            Expr::NumericLiteral { span, .. } => span,
            Expr::StringLiteral { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Property {
    pub key: String,
    pub value: Expr,
    pub span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "+" => Some(BinaryOp::Add),
            "-" => Some(BinaryOp::Subtract),
            "*" => Some(BinaryOp::Multiply),
            "/" => Some(BinaryOp::Divide),
            "%" => Some(BinaryOp::Modulo),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    Less,
    Greater,
    LessEqual,
    GreaterEqual,
}

impl ComparisonOp {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "==" => Some(ComparisonOp::Equal),
            "!=" => Some(ComparisonOp::NotEqual),
            "<" => Some(ComparisonOp::Less),
            ">" => Some(ComparisonOp::Greater),
            "<=" => Some(ComparisonOp::LessEqual),
            ">=" => Some(ComparisonOp::GreaterEqual),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOp::Equal => "==",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::Less => "<",
            ComparisonOp::Greater => ">",
            ComparisonOp::LessEqual => "<=",
            ComparisonOp::GreaterEqual => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn from_lexeme(lexeme: &str) -> Option<Self> {
        match lexeme {
            "&&" => Some(LogicalOp::And),
            "||" => Some(LogicalOp::Or),
            _ => None,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
}

impl UnaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
        }
    }
}

// Fully parenthesized rendering, used for debug logging and tree assertions.

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Assignment {
                assignee, value, ..
            } => write!(f, "({} = {})", assignee, value),
            Expr::Object { properties, .. } => {
                write!(f, "{{")?;
                for (i, property) in properties.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", property.key, property.value)?;
                }
                if properties.is_empty() {
                    write!(f, "}}")
                } else {
                    write!(f, " }}")
                }
            }
            Expr::Logical {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator.symbol(), right),
            Expr::Comparison {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator.symbol(), right),
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator.symbol(), right),
            Expr::Unary {
                operator, operand, ..
            } => write!(f, "({}{})", operator.symbol(), operand),
            Expr::Call { caller, args, .. } => {
                write!(f, "{}(", caller)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Expr::Member {
                object, property, ..
            } => write!(f, "{}.{}", object, property),
            Expr::Identifier { symbol, .. } => write!(f, "{}", symbol),
            Expr::NumericLiteral { value, .. } => write!(f, "{}", value),
            Expr::StringLiteral { value, .. } => write!(f, "'{}'", value),
        }
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stmt::VariableDeclaration {
                identifier,
                value,
                constant,
                ..
            } => {
                let keyword = if *constant { "const" } else { "let" };
                match value {
                    Some(value) => write!(f, "{} {} = {}", keyword, identifier, value),
                    None => write!(f, "{} {};", keyword, identifier),
                }
            }
            Stmt::FunctionDeclaration {
                name,
                parameters,
                body,
                ..
            } => {
                write!(f, "fn {}({}) ", name, parameters.join(", "))?;
                write_block(f, body)
            }
            Stmt::If {
                condition,
                body,
                else_ifs,
                else_body,
                ..
            } => {
                write!(f, "if ({}) ", condition)?;
                write_block(f, body)?;
                for branch in else_ifs {
                    write!(f, " elseif ({}) ", branch.condition)?;
                    write_block(f, &branch.body)?;
                }
                if let Some(else_body) = else_body {
                    write!(f, " else ")?;
                    write_block(f, else_body)?;
                }
                Ok(())
            }
            Stmt::Expression { expr, .. } => write!(f, "{}", expr),
        }
    }
}

fn write_block(f: &mut fmt::Formatter, statements: &[Stmt]) -> fmt::Result {
    write!(f, "{{")?;
    for statement in statements {
        write!(f, " {}", statement)?;
    }
    write!(f, " }}")
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}
