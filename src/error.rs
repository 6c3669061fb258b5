use ariadne::{Color, Fmt, Label, Report, ReportKind, Source};
use std::ops::Range;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn single(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos + 1,
        }
    }

    /// Smallest span covering both `self` and `other`.
    pub fn to(&self, other: &Span) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    LexError,
    ParseError,
    RuntimeError,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::LexError => "Lexical Error",
            ErrorKind::ParseError => "Parse Error",
            ErrorKind::RuntimeError => "Runtime Error",
        }
    }

    fn color(&self) -> Color {
        match self {
            ErrorKind::LexError => Color::Red,
            ErrorKind::ParseError => Color::Yellow,
            ErrorKind::RuntimeError => Color::Magenta,
        }
    }
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct TernError {
    pub kind: ErrorKind,
    pub span: Span,
    pub message: String,
    pub help: Option<String>,
}

impl TernError {
    pub fn new(kind: ErrorKind, span: Span, message: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: None,
        }
    }

    pub fn new_with_help(kind: ErrorKind, span: Span, message: String, help: String) -> Self {
        Self {
            kind,
            span,
            message,
            help: Some(help),
        }
    }

    pub fn lex_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::LexError, span, message)
    }

    pub fn lex_error_with_help(span: Span, message: String, help: String) -> Self {
        Self::new_with_help(ErrorKind::LexError, span, message, help)
    }

    pub fn parse_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::ParseError, span, message)
    }

    pub fn parse_error_with_help(span: Span, message: String, help: String) -> Self {
        Self::new_with_help(ErrorKind::ParseError, span, message, help)
    }

    pub fn runtime_error(span: Span, message: String) -> Self {
        Self::new(ErrorKind::RuntimeError, span, message)
    }

    pub fn runtime_error_with_help(span: Span, message: String, help: String) -> Self {
        Self::new_with_help(ErrorKind::RuntimeError, span, message, help)
    }

    /// Move the error to `span`, keeping its kind, message and help.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn is_lex_error(&self) -> bool {
        self.kind == ErrorKind::LexError
    }

    pub fn is_parse_error(&self) -> bool {
        self.kind == ErrorKind::ParseError
    }

    pub fn is_runtime_error(&self) -> bool {
        self.kind == ErrorKind::RuntimeError
    }

    /// Render the error against its source with ariadne.
    pub fn report(&self, source: &str, filename: Option<&str>) {
        let filename = filename.unwrap_or("<repl>");
        let color = self.kind.color();

        let range = self.label_range(source);
        let start = range.start;

        let mut report_builder = Report::build(ReportKind::Error, filename, start)
            .with_message(format!("{}: {}", self.kind.label().fg(color), self.message))
            .with_label(
                Label::new((filename, range))
                    .with_message(&self.message)
                    .with_color(color),
            );

        if let Some(ref help_text) = self.help {
            report_builder =
                report_builder.with_note(format!("{}: {}", "help".fg(Color::Cyan), help_text));
        }

        if let Err(io_error) = report_builder
            .finish()
            .eprint((filename, Source::from(source)))
        {
            tracing::warn!(%io_error, "failed to render diagnostic");
            eprintln!("{}: {}", self.kind.label(), self.message);
        }
    }

    // Spans count characters and may point one past the last one at end of input.
    fn label_range(&self, source: &str) -> Range<usize> {
        let end = self.span.end.min(source.chars().count());
        let start = self.span.start.min(end);
        start..end
    }
}
