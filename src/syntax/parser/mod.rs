//! Scannerless recursive-descent parser for pre-0.7 Elvish.
//!
//! The parser is lossless: every byte of input ends up in some leaf of the
//! returned tree. It stops at the first error.

mod control;
mod expr;


use crate::diagnostic::Diagnostic;
use crate::span::Span;
use crate::tree::{ControlKind, Node, NodeKind, Role, SyntaxTree};

const MAX_NESTING_DEPTH: u32 = 256;

/// Keywords that end a chunk nested in a control construct.
const CLOSING_KEYWORDS: &[&str] = &[
    "then", "elif", "else", "fi", "do", "done", "except", "finally", "tried",
];

pub(crate) type PResult<T> = Result<T, Diagnostic>;

/// Parse a whole script. `name` is only recorded in the returned tree.
pub fn parse(name: &str, source: &str) -> Result<SyntaxTree, Diagnostic> {
    let mut parser = Parser::new(source);
    let root = parser.parse_chunk()?;
    parser.expect_eof()?;
    Ok(SyntaxTree {
        name: name.to_string(),
        source: source.to_string(),
        root,
    })
}

/// Which characters a bareword may contain at the current position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ExprCtx {
    Normal,
    /// Assignment targets and option names: `=` ends the word.
    Lhs,
    /// Inside `{a,b}`: `,` separates items.
    Braced,
}

pub(crate) struct Parser<'src> {
    source: &'src str,
    bytes: &'src [u8],
    pos: usize,
    depth: u32,
}

impl<'src> Parser<'src> {
    pub(crate) fn new(source: &'src str) -> Self {
        Self {
            source,
            bytes: source.as_bytes(),
            pos: 0,
            depth: 0,
        }
    }

    // --- Chunks, pipelines, forms ---

    pub(crate) fn parse_chunk(&mut self) -> PResult<Node> {
        self.nested(|p| {
            let start = p.pos;
            let mut children = Vec::new();
            loop {
                match p.peek() {
                    None | Some(b')' | b'}' | b']') => break,
                    Some(b'\n' | b';') => children.push(p.sep(1)),
                    Some(b'#') => children.push(p.comment()),
                    _ => {
                        if let Some(spaces) = p.spaces() {
                            children.push(spaces);
                            continue;
                        }
                        if p.at_closing_keyword() {
                            break;
                        }
                        children.push(p.parse_pipeline()?.with_role(Role::Pipeline));
                    }
                }
            }
            Ok(Node::new(NodeKind::Chunk, p.span_from(start), children))
        })
    }

    fn parse_pipeline(&mut self) -> PResult<Node> {
        let start = self.pos;
        let mut children = vec![self.parse_form()?.with_role(Role::Form)];
        loop {
            let n = self.spaces_len(self.pos);
            if self.byte_at(self.pos + n) != Some(b'|') {
                break;
            }
            if n > 0 {
                children.push(self.sep(n));
            }
            children.push(self.sep(1));
            loop {
                if self.peek() == Some(b'\n') {
                    children.push(self.sep(1));
                } else if let Some(spaces) = self.spaces() {
                    children.push(spaces);
                } else {
                    break;
                }
            }
            if !self.at_compound_start(ExprCtx::Normal) {
                return Err(self.error_here(format!(
                    "expected a command after `|`, found {}",
                    self.describe_here()
                )));
            }
            children.push(self.parse_form()?.with_role(Role::Form));
        }
        Ok(Node::new(NodeKind::Pipeline, self.span_from(start), children))
    }

    fn parse_form(&mut self) -> PResult<Node> {
        let start = self.pos;
        let mut children = Vec::new();

        if let Some(kind) = ControlKind::from_leader(self.word_at(self.pos)) {
            children.push(self.parse_control(kind)?.with_role(Role::Control));
            return Ok(Node::new(NodeKind::Form, self.span_from(start), children));
        }

        while let Some(assignment) = self.try_parse_assignment()? {
            children.push(assignment.with_role(Role::Assignment));
            if !self.space_before_element(&mut children) {
                return Ok(Node::new(NodeKind::Form, self.span_from(start), children));
            }
        }

        if !self.at_compound_start(ExprCtx::Normal) {
            return Err(self.error_here(format!(
                "expected a command, found {}",
                self.describe_here()
            )));
        }
        children.push(self.parse_compound(ExprCtx::Normal)?.with_role(Role::Head));

        while self.space_before_element(&mut children) {
            let element = if self.at_redir(self.pos) {
                self.parse_redir()?.with_role(Role::Redir)
            } else if self.peek() == Some(b'&') {
                self.parse_map_pair(false)?.with_role(Role::Opt)
            } else {
                self.parse_compound(ExprCtx::Normal)?.with_role(Role::Arg)
            };
            children.push(element);
        }
        Ok(Node::new(NodeKind::Form, self.span_from(start), children))
    }

    /// Consume the whitespace before the next form element, but only if an
    /// element actually follows. Forms never end in whitespace.
    fn space_before_element(&mut self, children: &mut Vec<Node>) -> bool {
        let n = self.spaces_len(self.pos);
        let next = self.pos + n;
        let follows = self.at_redir(next)
            || self.byte_at(next) == Some(b'&')
            || (n > 0 && self.at_compound_start_at(next, ExprCtx::Normal));
        if !follows {
            return false;
        }
        if n > 0 {
            children.push(self.sep(n));
        }
        true
    }

    /// `lhs=value`. Backtracks and returns `None` when the upcoming text is
    /// not an assignment.
    fn try_parse_assignment(&mut self) -> PResult<Option<Node>> {
        let start = self.pos;
        let starts_target = match self.peek() {
            Some(b'{') => !self.at_lambda_brace(),
            Some(b) => expr::is_bareword_byte(b, ExprCtx::Lhs),
            None => false,
        };
        if !starts_target {
            return Ok(None);
        }
        let target = match self.parse_indexing(ExprCtx::Lhs) {
            Ok(target) if self.peek() == Some(b'=') => target,
            _ => {
                self.pos = start;
                return Ok(None);
            }
        };
        let eq = self.sep(1);
        if !self.at_compound_start(ExprCtx::Normal) {
            return Err(self
                .error_here(format!(
                    "expected a value after `=`, found {}",
                    self.describe_here()
                ))
                .with_help("assignments are written without spaces: `name=value`".to_string()));
        }
        let value = self.parse_compound(ExprCtx::Normal)?;
        Ok(Some(Node::new(
            NodeKind::Assignment,
            self.span_from(start),
            vec![target.with_role(Role::Target), eq, value.with_role(Role::Value)],
        )))
    }

    fn expect_eof(&mut self) -> PResult<()> {
        if self.at_eof() {
            return Ok(());
        }
        let word = self.word_at(self.pos);
        let diag = self.error_here(format!("unexpected {}", self.describe_here()));
        Err(match word {
            "then" | "elif" | "else" | "fi" => diag.with_help(format!(
                "`{}` is only valid inside `if ...; then ...; fi`",
                word
            )),
            "do" | "done" => diag.with_help(format!(
                "`{}` is only valid inside a `for` or `while` loop",
                word
            )),
            "except" | "finally" | "tried" => diag.with_help(format!(
                "`{}` is only valid inside `try ...; tried`",
                word
            )),
            _ => diag,
        })
    }

    // --- Lexical helpers ---

    /// Run `f` one nesting level deeper, failing past `MAX_NESTING_DEPTH`.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> PResult<T>) -> PResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(self
                .error_here("nesting depth exceeded (maximum 256 levels)".to_string())
                .with_help("split deeply nested code into separate functions".to_string()));
        }
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }

    fn peek(&self) -> Option<u8> {
        self.byte_at(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.byte_at(self.pos + offset)
    }

    fn byte_at(&self, at: usize) -> Option<u8> {
        self.bytes.get(at).copied()
    }

    fn at_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    fn span_from(&self, start: usize) -> Span {
        Span::new(start as u32, self.pos as u32)
    }

    /// Consume `len` bytes as a separator leaf.
    fn sep(&mut self, len: usize) -> Node {
        let start = self.pos;
        self.pos += len;
        Node::sep(self.span_from(start))
    }

    /// Length of the run of inline whitespace starting at `from`. A
    /// backslash before a newline continues the line and counts as space.
    fn spaces_len(&self, from: usize) -> usize {
        let mut at = from;
        loop {
            match self.byte_at(at) {
                Some(b' ' | b'\t' | b'\r') => at += 1,
                Some(b'\\') if self.byte_at(at + 1) == Some(b'\n') => at += 2,
                _ => return at - from,
            }
        }
    }

    fn spaces(&mut self) -> Option<Node> {
        let n = self.spaces_len(self.pos);
        (n > 0).then(|| self.sep(n))
    }

    /// Whitespace including newlines, as one separator. Used inside
    /// brackets where newlines carry no meaning.
    fn spaces_and_newlines(&mut self) -> Option<Node> {
        let start = self.pos;
        loop {
            let n = self.spaces_len(self.pos);
            if n > 0 {
                self.pos += n;
            } else if self.peek() == Some(b'\n') {
                self.pos += 1;
            } else {
                break;
            }
        }
        (self.pos > start).then(|| Node::sep(self.span_from(start)))
    }

    fn comment(&mut self) -> Node {
        let start = self.pos;
        while !matches!(self.peek(), None | Some(b'\n')) {
            self.pos += 1;
        }
        Node::sep(self.span_from(start))
    }

    /// The bareword starting at `at`, or `""`.
    fn word_at(&self, at: usize) -> &'src str {
        let at = at.min(self.bytes.len());
        let mut end = at;
        while let Some(b) = self.byte_at(end) {
            if !expr::is_bareword_byte(b, ExprCtx::Normal) {
                break;
            }
            end += 1;
        }
        &self.source[at..end]
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.word_at(self.pos) == keyword
    }

    fn at_closing_keyword(&self) -> bool {
        CLOSING_KEYWORDS.contains(&self.word_at(self.pos))
    }

    /// Consume a keyword the caller has already matched.
    fn keyword(&mut self, keyword: &str) -> Node {
        debug_assert!(self.at_keyword(keyword));
        self.sep(keyword.len())
    }

    fn describe_here(&self) -> String {
        let word = self.word_at(self.pos);
        if !word.is_empty() {
            return format!("`{}`", word);
        }
        match self.source[self.pos.min(self.source.len())..].chars().next() {
            None => "end of input".to_string(),
            Some('\n') => "newline".to_string(),
            Some(c) => format!("`{}`", c),
        }
    }

    /// The character at the current position, or an empty span at EOF.
    fn span_here(&self) -> Span {
        let len = self.source[self.pos.min(self.source.len())..]
            .chars()
            .next()
            .map_or(0, char::len_utf8);
        Span::new(self.pos as u32, (self.pos + len) as u32)
    }

    fn error_here(&self, message: String) -> Diagnostic {
        Diagnostic::error(message, self.span_here())
    }

    fn line_of(&self, offset: usize) -> usize {
        self.source[..offset.min(self.source.len())].matches('\n').count() + 1
    }
}
