use core::fmt;

use crate::token::{Pos, Source};

pub type Res<T> = Result<T, Report>;

/// Which stage of the front end rejected the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Lexical,
    Syntax,
    Semantic,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportKind::Lexical => "lexical error",
            ReportKind::Syntax => "syntax error",
            ReportKind::Semantic => "semantic error",
        };
        write!(f, "{}", s)
    }
}

/// A single diagnostic. The front end is fail-fast: the first Report raised
/// anywhere aborts the whole compilation, so there is no collection type.
#[derive(Debug, Clone)]
pub struct Report {
    pub kind: ReportKind,
    /// Raw error message without formatting. Eg. 'not declared'
    pub message: String,
    pub pos: Pos,
    pub length: usize,
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} (line {})", self.kind, self.message, self.line())
    }
}

impl Report {
    pub fn lexical(msg: &str, from: &Pos, length: usize) -> Self {
        Self::new(ReportKind::Lexical, msg, from, length)
    }

    pub fn syntax(msg: &str, from: &Pos, length: usize) -> Self {
        Self::new(ReportKind::Syntax, msg, from, length)
    }

    pub fn semantic(msg: &str, from: &Pos, to: &Pos) -> Self {
        Self::new(ReportKind::Semantic, msg, from, to.col.saturating_sub(from.col))
    }

    fn new(kind: ReportKind, msg: &str, from: &Pos, length: usize) -> Self {
        Self {
            kind,
            message: msg.to_owned(),
            pos: from.clone(),
            length,
        }
    }

    /// 1-based source line of the offending construct.
    pub fn line(&self) -> usize {
        self.pos.row + 1
    }

    /// Render the diagnostic with the offending source line and a caret
    /// marking the reported span.
    pub fn render(&self, source: &Source) -> String {
        let line = self.line();

        let line_str = source.line(self.pos.row).to_owned();
        let from = self.pos.col;

        let pad = line_str.len() - line_str.trim_start().len();
        let point_start = if from < pad { 1 } else { from - pad };

        format!(
            "{}\n{}: {}\n    |\n{:<3} |    {}\n    |    {}{}\n",
            source.filepath,
            self.kind,
            self.message,
            line,
            line_str.trim(),
            " ".repeat(point_start),
            "^".repeat(self.length.max(1)),
        )
    }
}
