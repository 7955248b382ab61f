use std::fmt;
use std::ops::Range;

use crate::span::Span;

/// A parse error with the location it was found at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub notes: Vec<String>,
    pub help: Option<String>,
}

impl Diagnostic {
    pub fn error(message: String, span: Span) -> Self {
        Self {
            message,
            span,
            notes: Vec::new(),
            help: None,
        }
    }

    pub fn with_note(mut self, note: String) -> Self {
        self.notes.push(note);
        self
    }

    pub fn with_help(mut self, help: String) -> Self {
        self.help = Some(help);
        self
    }

    /// 1-based line and column (in characters) of the span start.
    pub fn line_col(&self, source: &str) -> (usize, usize) {
        let offset = (self.span.start as usize).min(source.len());
        let before = &source[..offset];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |p| p + 1);
        let column = before[line_start..].chars().count() + 1;
        (line, column)
    }

    fn report<'a>(
        &self,
        filename: &'a str,
        source: &str,
        color: bool,
    ) -> ariadne::Report<'a, (&'a str, Range<usize>)> {
        use ariadne::{Color, Config, Label, Report, ReportKind};

        // ariadne counts in characters, spans are in bytes.
        let total = source.chars().count();
        let mut start = char_offset(source, self.span.start as usize);
        let mut end = char_offset(source, self.span.end as usize).max(start);
        // Zero-width labels get widened to one character so they show up.
        if start == end {
            if end < total {
                end += 1;
            } else if start > 0 {
                start -= 1;
            }
        }

        let mut report = Report::build(ReportKind::Error, filename, start)
            .with_config(Config::default().with_color(color))
            .with_message(&self.message)
            .with_label(
                Label::new((filename, start..end))
                    .with_message(&self.message)
                    .with_color(Color::Red),
            );

        for note in &self.notes {
            report = report.with_note(note);
        }

        if let Some(help) = &self.help {
            report = report.with_help(help);
        }

        report.finish()
    }

    /// Render the diagnostic to stderr using ariadne. Colors are used only
    /// when stderr is a terminal.
    pub fn render(&self, filename: &str, source: &str) {
        use ariadne::Source;
        use std::io::IsTerminal;

        let color = std::io::stderr().is_terminal();
        if let Err(e) = self
            .report(filename, source, color)
            .eprint((filename, Source::from(source)))
        {
            tracing::warn!("cannot render diagnostic for {}: {}", filename, e);
        }
    }

    /// Render the diagnostic without colors, for tests and logs.
    pub fn render_to_string(&self, filename: &str, source: &str) -> String {
        use ariadne::Source;

        let mut buf = Vec::new();
        if self
            .report(filename, source, false)
            .write((filename, Source::from(source)), &mut buf)
            .is_err()
        {
            return self.message.clone();
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn char_offset(source: &str, byte: usize) -> usize {
    let byte = byte.min(source.len());
    source
        .char_indices()
        .take_while(|(i, _)| *i < byte)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let span = Span::new(10, 15);
        let d = Diagnostic::error("expected `fi`".to_string(), span);
        assert_eq!(d.message, "expected `fi`");
        assert_eq!(d.span.start, 10);
        assert_eq!(d.span.end, 15);
        assert!(d.notes.is_empty());
        assert!(d.help.is_none());
    }

    #[test]
    fn test_chained_builders() {
        let d = Diagnostic::error("unexpected `done`".to_string(), Span::new(0, 4))
            .with_note("note 1".to_string())
            .with_help("help text".to_string())
            .with_note("note 2".to_string());
        assert_eq!(d.notes, vec!["note 1", "note 2"]);
        assert_eq!(d.help.as_deref(), Some("help text"));
    }

    #[test]
    fn test_line_col() {
        let source = "echo a\nif b; then\n  c\n";
        let d = Diagnostic::error("x".to_string(), Span::point(source.len() as u32));
        assert_eq!(d.line_col(source), (4, 1));
        let d = Diagnostic::error("x".to_string(), Span::new(10, 11));
        assert_eq!(d.line_col(source), (2, 4));
    }

    #[test]
    fn test_line_col_counts_characters() {
        let source = "é é x";
        let d = Diagnostic::error("x".to_string(), Span::new(6, 7));
        assert_eq!(d.line_col(source), (1, 5));
    }

    #[test]
    fn test_char_offset_handles_multibyte() {
        assert_eq!(char_offset("aé b", 4), 3);
        assert_eq!(char_offset("abc", 99), 3);
    }

    #[test]
    fn test_render_to_string_mentions_message_and_file() {
        let source = "if a; then\n  echo\n";
        let d = Diagnostic::error("expected `fi`".to_string(), Span::point(source.len() as u32))
            .with_help("close the `if` with `fi`".to_string());
        let out = d.render_to_string("script.elv", source);
        assert!(out.contains("expected `fi`"), "{}", out);
        assert!(out.contains("script.elv"), "{}", out);
        assert!(out.contains("close the `if` with `fi`"), "{}", out);
    }

    #[test]
    fn test_render_does_not_panic() {
        let source = "for x in a b\n";
        let d = Diagnostic::error("expected `do`".to_string(), Span::new(12, 13))
            .with_note("`for` loops end with `done`".to_string());
        d.render("test.elv", source);
    }
}
