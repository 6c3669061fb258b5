use crate::ast::{
    BinaryOp, ComparisonOp, ElseIfBranch, Expr, LogicalOp, Program, Property, Stmt, UnaryOp,
};
use crate::error::{Span, TernError};
use crate::lexer::{Token, TokenKind};
use std::rc::Rc;

/// Parse a token sequence into a `Program`.
pub fn parse(tokens: Vec<Token>) -> Result<Program, TernError> {
    Parser::new(tokens).parse()
}

pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        // The cursor relies on a trailing end marker to never run off the end.
        if tokens.last().map(|token| token.kind) != Some(TokenKind::EndOfInput) {
            let end = tokens.last().map(|token| token.span.end).unwrap_or(0);
            tokens.push(Token::new(
                TokenKind::EndOfInput,
                "EOF".to_string(),
                Span::new(end, end),
            ));
        }
        Self { tokens, current: 0 }
    }

    pub fn parse(&mut self) -> Result<Program, TernError> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.statement()?);
        }

        tracing::debug!(count = statements.len(), "parsed program");
        Ok(Program { statements })
    }

    fn statement(&mut self) -> Result<Stmt, TernError> {
        match self.peek().kind {
            TokenKind::Let | TokenKind::Const => self.variable_declaration(),
            TokenKind::Function => self.function_declaration(),
            TokenKind::IfStatement => self.if_statement(),
            _ => self.expression_statement(),
        }
    }

    fn variable_declaration(&mut self) -> Result<Stmt, TernError> {
        let keyword = self.advance().clone();
        let constant = keyword.kind == TokenKind::Const;

        let identifier = self
            .consume_with_help(
                TokenKind::Identifier,
                &format!("Expected identifier after '{}'", keyword.value),
                "Variable declarations name a variable: let name = value".to_string(),
            )?
            .value
            .clone();

        if self.match_kind(TokenKind::Semicolon) {
            let span = keyword.span.to(&self.previous().span);
            if constant {
                return Err(TernError::parse_error_with_help(
                    span,
                    "Must assign value to a constant variable".to_string(),
                    format!("Give the constant an initial value: const {} = value", identifier),
                ));
            }
            return Ok(Stmt::VariableDeclaration {
                identifier,
                value: None,
                constant,
                span,
            });
        }

        self.consume_with_help(
            TokenKind::Equals,
            "Expected '=' after identifier in variable declaration",
            format!(
                "Either initialize the variable (let {0} = value) \
                 or end the declaration with ';' (let {0};)",
                identifier
            ),
        )?;
        let value = self.expression()?;
        self.match_kind(TokenKind::Semicolon);

        Ok(Stmt::VariableDeclaration {
            identifier,
            value: Some(value),
            constant,
            span: keyword.span.to(&self.previous().span),
        })
    }

    fn function_declaration(&mut self) -> Result<Stmt, TernError> {
        let start_span = self.advance().span.clone();

        let name = self
            .consume_with_help(
                TokenKind::Identifier,
                "Expected function name after 'fn'",
                "Function declarations look like: fn name(a, b) { a + b }".to_string(),
            )?
            .value
            .clone();

        self.consume_with_help(
            TokenKind::OpenParen,
            "Expected '(' after function name",
            "Parameters are listed in parentheses, even when there are none: fn name() { ... }"
                .to_string(),
        )?;

        let mut parameters = Vec::new();
        if !self.check(TokenKind::CloseParen) {
            loop {
                match self.expression()? {
                    Expr::Identifier { symbol, .. } => parameters.push(symbol),
                    other => {
                        return Err(TernError::parse_error_with_help(
                            other.span().clone(),
                            format!("Function parameters must be identifiers, found '{}'", other),
                            "Parameters are plain names separated by commas: fn add(x, y) { ... }"
                                .to_string(),
                        ));
                    }
                }
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.consume_with_help(
            TokenKind::CloseParen,
            "Expected ')' after parameters",
            "Separate parameters with ',' and close the list with ')'.".to_string(),
        )?;

        let body = self.block("function body")?;

        Ok(Stmt::FunctionDeclaration {
            name,
            parameters,
            body: Rc::new(body),
            span: start_span.to(&self.previous().span),
        })
    }

    fn if_statement(&mut self) -> Result<Stmt, TernError> {
        let start_span = self.advance().span.clone();

        let condition = self.condition("if")?;
        let body = self.block("if body")?;

        let mut else_ifs = Vec::new();
        while self.match_kind(TokenKind::ElseIfStatement) {
            let condition = self.condition("elseif")?;
            let body = self.block("elseif body")?;
            else_ifs.push(ElseIfBranch { condition, body });
        }

        let else_body = if self.match_kind(TokenKind::ElseStatement) {
            Some(self.block("else body")?)
        } else {
            None
        };

        Ok(Stmt::If {
            condition,
            body,
            else_ifs,
            else_body,
            span: start_span.to(&self.previous().span),
        })
    }

    fn condition(&mut self, keyword: &str) -> Result<Expr, TernError> {
        self.consume_with_help(
            TokenKind::OpenParen,
            &format!("Expected '(' after '{}'", keyword),
            format!(
                "Conditions are wrapped in parentheses: {} (condition) {{ ... }}",
                keyword
            ),
        )?;

        if self.check(TokenKind::CloseParen) {
            return Err(TernError::parse_error_with_help(
                self.peek().span.clone(),
                format!("Empty condition in '{}'", keyword),
                "A condition must contain an expression.".to_string(),
            ));
        }

        let condition = self.expression()?;
        self.consume_with_help(
            TokenKind::CloseParen,
            &format!("Expected ')' after {} condition", keyword),
            "Every opening parenthesis '(' must have a matching closing parenthesis ')'."
                .to_string(),
        )?;
        Ok(condition)
    }

    /// `{ statement+ }`; every block must hold at least one statement.
    fn block(&mut self, context: &str) -> Result<Vec<Stmt>, TernError> {
        let open_span = self
            .consume_with_help(
                TokenKind::OpenCurly,
                &format!("Expected '{{' before {}", context),
                "Blocks are delimited by curly braces: { ... }".to_string(),
            )?
            .span
            .clone();

        let mut statements = Vec::new();
        while !self.check(TokenKind::CloseCurly) && !self.is_at_end() {
            statements.push(self.statement()?);
        }

        let close_span = self
            .consume_with_help(
                TokenKind::CloseCurly,
                &format!("Expected '}}' after {}", context),
                "Blocks must be closed with '}' after the opening '{'.".to_string(),
            )?
            .span
            .clone();

        if statements.is_empty() {
            return Err(TernError::parse_error_with_help(
                open_span.to(&close_span),
                format!("Empty {} is not allowed", context),
                "A block must contain at least one statement.".to_string(),
            ));
        }

        Ok(statements)
    }

    fn expression_statement(&mut self) -> Result<Stmt, TernError> {
        let start_span = self.peek().span.clone();
        let expr = self.expression()?;

        // Statement terminators are optional.
        self.match_kind(TokenKind::Semicolon);

        Ok(Stmt::Expression {
            expr,
            span: start_span.to(&self.previous().span),
        })
    }

    fn expression(&mut self) -> Result<Expr, TernError> {
        self.assignment()
    }

    fn assignment(&mut self) -> Result<Expr, TernError> {
        let assignee = self.object()?;

        if self.match_kind(TokenKind::Equals) {
            let equals = self.previous().clone();
            self.expect_operand(&equals)?;
            let value = self.assignment()?;
            let span = assignee.span().to(value.span());
            return Ok(Expr::Assignment {
                assignee: Box::new(assignee),
                value: Box::new(value),
                span,
            });
        }

        Ok(assignee)
    }

    fn object(&mut self) -> Result<Expr, TernError> {
        if !self.check(TokenKind::OpenCurly) {
            return self.logical();
        }

        let start_span = self.advance().span.clone();
        let mut properties = Vec::new();

        if !self.check(TokenKind::CloseCurly) {
            loop {
                let key_token = self
                    .consume_with_help(
                        TokenKind::Identifier,
                        "Expected property name in object literal",
                        "Object keys are identifiers and a trailing ',' is not allowed: \
                         { key: value }"
                            .to_string(),
                    )?
                    .clone();

                self.consume_with_help(
                    TokenKind::Colon,
                    "Expected ':' after property name",
                    format!(
                        "Object properties pair a key with a value: {{ {}: value }}",
                        key_token.value
                    ),
                )?;

                let value = self.expression()?;
                let span = key_token.span.to(value.span());
                properties.push(Property {
                    key: key_token.value,
                    value,
                    span,
                });

                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }

        let end_token = self.consume_with_help(
            TokenKind::CloseCurly,
            "Expected '}' after object properties",
            "Separate properties with ',' and close the object with '}'.".to_string(),
        )?;

        Ok(Expr::Object {
            properties,
            span: start_span.to(&end_token.span),
        })
    }

    fn logical(&mut self) -> Result<Expr, TernError> {
        let mut expr = self.comparison()?;

        while self.check(TokenKind::LogicalOperator) {
            let operator_token = self.advance().clone();
            let operator = LogicalOp::from_lexeme(&operator_token.value)
                .ok_or_else(|| unknown_operator(&operator_token))?;

            self.expect_operand(&operator_token)?;
            let right = self.comparison()?;
            let span = expr.span().to(right.span());

            expr = Expr::Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn comparison(&mut self) -> Result<Expr, TernError> {
        let mut expr = self.additive()?;

        while self.check(TokenKind::ComparisonOperator) {
            let operator_token = self.advance().clone();
            let operator = ComparisonOp::from_lexeme(&operator_token.value)
                .ok_or_else(|| unknown_operator(&operator_token))?;

            self.expect_operand(&operator_token)?;
            let right = self.additive()?;
            let span = expr.span().to(right.span());

            expr = Expr::Comparison {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn additive(&mut self) -> Result<Expr, TernError> {
        let mut expr = self.multiplicative()?;

        while self.check_operator(&["+", "-"]) {
            let operator_token = self.advance().clone();
            let operator = BinaryOp::from_lexeme(&operator_token.value)
                .ok_or_else(|| unknown_operator(&operator_token))?;

            self.expect_operand(&operator_token)?;
            let right = self.multiplicative()?;
            let span = expr.span().to(right.span());

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn multiplicative(&mut self) -> Result<Expr, TernError> {
        let mut expr = self.unary()?;

        while self.check_operator(&["*", "/", "%"]) {
            let operator_token = self.advance().clone();
            let operator = BinaryOp::from_lexeme(&operator_token.value)
                .ok_or_else(|| unknown_operator(&operator_token))?;

            self.expect_operand(&operator_token)?;
            let right = self.unary()?;
            let span = expr.span().to(right.span());

            expr = Expr::Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
                span,
            };
        }

        Ok(expr)
    }

    fn unary(&mut self) -> Result<Expr, TernError> {
        if self.check(TokenKind::UnaryOperator) {
            let operator_token = self.advance().clone();
            self.expect_operand(&operator_token)?;
            let operand = self.unary()?;
            let span = operator_token.span.to(operand.span());

            return Ok(Expr::Unary {
                operator: UnaryOp::Not,
                operand: Box::new(operand),
                span,
            });
        }

        self.call_member()
    }

    fn call_member(&mut self) -> Result<Expr, TernError> {
        let member = self.member()?;

        if self.check(TokenKind::OpenParen) {
            return self.call(member);
        }

        Ok(member)
    }

    /// Wraps `caller` in call nodes for as long as argument lists follow: `f(1)(2)`.
    fn call(&mut self, mut caller: Expr) -> Result<Expr, TernError> {
        while self.check(TokenKind::OpenParen) {
            let (args, end_span) = self.arguments()?;
            let span = caller.span().to(&end_span);
            caller = Expr::Call {
                caller: Box::new(caller),
                args,
                span,
            };
        }

        Ok(caller)
    }

    fn arguments(&mut self) -> Result<(Vec<Expr>, Span), TernError> {
        self.consume(TokenKind::OpenParen, "Expected '(' before arguments")?;

        let mut args = Vec::new();
        if !self.check(TokenKind::CloseParen) {
            loop {
                args.push(self.expression()?);
                if !self.match_kind(TokenKind::Comma) {
                    break;
                }
            }
        }

        let paren = self.consume_with_help(
            TokenKind::CloseParen,
            "Expected ')' after arguments",
            "Function calls must be closed with ')' after the arguments. Example: add(1, 2)"
                .to_string(),
        )?;
        Ok((args, paren.span.clone()))
    }

    fn member(&mut self) -> Result<Expr, TernError> {
        let mut object = self.primary()?;

        while self.match_kind(TokenKind::Period) {
            let property_token = self
                .consume_with_help(
                    TokenKind::Identifier,
                    "Expected property name after '.'",
                    "Member access requires an identifier: object.property".to_string(),
                )?
                .clone();

            let span = object.span().to(&property_token.span);
            object = Expr::Member {
                object: Box::new(object),
                property: property_token.value,
                span,
            };
        }

        Ok(object)
    }

    fn primary(&mut self) -> Result<Expr, TernError> {
        if self.is_at_end() {
            return Err(TernError::parse_error_with_help(
                self.peek().span.clone(),
                "Unexpected end of input".to_string(),
                "Expected an expression here. \
                 Check for unmatched parentheses or incomplete statements."
                    .to_string(),
            ));
        }

        let token = self.advance().clone();

        match token.kind {
            TokenKind::Identifier => Ok(Expr::Identifier {
                symbol: token.value,
                span: token.span,
            }),
            TokenKind::Number => {
                let value = token.value.parse::<f64>().map_err(|_| {
                    TernError::parse_error(
                        token.span.clone(),
                        format!("Invalid number '{}'", token.value),
                    )
                })?;
                Ok(Expr::NumericLiteral {
                    value,
                    span: token.span,
                })
            }
            TokenKind::StringLiteral => {
                let mut chars = token.value.chars();
                chars.next();
                chars.next_back();
                Ok(Expr::StringLiteral {
                    value: chars.as_str().to_string(),
                    span: token.span,
                })
            }
            TokenKind::OpenParen => {
                if self.check(TokenKind::CloseParen) {
                    return Err(TernError::parse_error_with_help(
                        token.span.to(&self.peek().span),
                        "Empty parentheses are not allowed".to_string(),
                        "Parentheses must contain an expression: (x + 1)".to_string(),
                    ));
                }

                let expr = self.expression()?;
                self.consume_with_help(
                    TokenKind::CloseParen,
                    "Expected ')' after expression",
                    "Every opening parenthesis '(' must have a matching closing parenthesis ')'."
                        .to_string(),
                )?;
                Ok(expr)
            }
            _ => {
                let help_msg = match token.kind {
                    TokenKind::CloseParen => {
                        "Found ')' without matching '('. Check for unbalanced parentheses."
                    }
                    TokenKind::CloseCurly => {
                        "Found '}' without matching '{'. Check for unbalanced braces."
                    }
                    TokenKind::ElseIfStatement | TokenKind::ElseStatement => {
                        "'elseif' and 'else' may only follow the block of an if statement."
                    }
                    TokenKind::Let
                    | TokenKind::Const
                    | TokenKind::Function
                    | TokenKind::IfStatement => {
                        "Declarations and if statements cannot be used as expressions."
                    }
                    _ => {
                        "Expected an identifier, number, string, or parenthesized expression here."
                    }
                };

                Err(TernError::parse_error_with_help(
                    token.span,
                    format!("Unexpected token '{}'", token.value),
                    help_msg.to_string(),
                ))
            }
        }
    }

    fn expect_operand(&self, operator: &Token) -> Result<(), TernError> {
        if self.is_at_end() {
            return Err(TernError::parse_error_with_help(
                operator.span.clone(),
                format!("Expected expression after '{}'", operator.value),
                "Operators require an expression on their right-hand side.".to_string(),
            ));
        }
        Ok(())
    }

    fn match_kind(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn check(&self, kind: TokenKind) -> bool {
        if self.is_at_end() {
            false
        } else {
            self.peek().kind == kind
        }
    }

    fn check_operator(&self, lexemes: &[&str]) -> bool {
        self.check(TokenKind::BinaryOperator) && lexemes.contains(&self.peek().value.as_str())
    }

    fn advance(&mut self) -> &Token {
        if !self.is_at_end() {
            self.current += 1;
            return self.previous();
        }
        self.peek()
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::EndOfInput
    }

    fn peek(&self) -> &Token {
        &self.tokens[self.current]
    }

    fn previous(&self) -> &Token {
        &self.tokens[self.current.saturating_sub(1)]
    }

    fn consume(&mut self, kind: TokenKind, message: &str) -> Result<&Token, TernError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(TernError::parse_error(
                self.error_span(),
                format!("{}, found {}", message, self.describe_current()),
            ))
        }
    }

    fn consume_with_help(
        &mut self,
        kind: TokenKind,
        message: &str,
        help: String,
    ) -> Result<&Token, TernError> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(TernError::parse_error_with_help(
                self.error_span(),
                format!("{}, found {}", message, self.describe_current()),
                help,
            ))
        }
    }

    fn error_span(&self) -> Span {
        if self.is_at_end() && self.current > 0 {
            // Point just past the last real token.
            Span::single(self.tokens[self.current - 1].span.end)
        } else {
            self.peek().span.clone()
        }
    }

    fn describe_current(&self) -> String {
        let token = self.peek();
        match token.kind {
            TokenKind::EndOfInput => "end of input".to_string(),
            _ => format!("'{}'", token.value),
        }
    }
}

fn unknown_operator(token: &Token) -> TernError {
    TernError::parse_error(
        token.span.clone(),
        format!("Unknown operator '{}'", token.value),
    )
}
