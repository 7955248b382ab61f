use super::{ExprCtx, PResult, Parser};
use crate::diagnostic::Diagnostic;
use crate::span::Span;
use crate::tree::{Node, NodeKind, PrimaryKind, Role};

pub(super) fn is_bareword_byte(b: u8, ctx: ExprCtx) -> bool {
    match b {
        b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' => true,
        b'-' | b'_' | b':' | b'%' | b'+' | b'.' | b'/' | b'@' | b'!' => true,
        b',' => ctx != ExprCtx::Braced,
        b'=' => ctx == ExprCtx::Normal,
        _ => b >= 0x80,
    }
}

fn is_variable_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'~') || b >= 0x80
}

impl Parser<'_> {
    pub(super) fn at_compound_start(&self, ctx: ExprCtx) -> bool {
        self.at_compound_start_at(self.pos, ctx)
    }

    pub(super) fn at_compound_start_at(&self, at: usize, ctx: ExprCtx) -> bool {
        match self.byte_at(at) {
            Some(b'\'' | b'"' | b'$' | b'*' | b'?' | b'~' | b'(' | b'[' | b'{') => true,
            Some(b) => is_bareword_byte(b, ctx),
            None => false,
        }
    }

    /// `{` followed by whitespace opens a lambda; otherwise a braced list.
    pub(super) fn at_lambda_brace(&self) -> bool {
        matches!(self.peek_at(1), Some(b' ' | b'\t' | b'\r' | b'\n'))
    }

    /// An optional fd number followed by `<` or `>`.
    pub(super) fn at_redir(&self, at: usize) -> bool {
        let mut at = at;
        while self.byte_at(at).is_some_and(|b| b.is_ascii_digit()) {
            at += 1;
        }
        matches!(self.byte_at(at), Some(b'<' | b'>'))
    }

    pub(super) fn parse_compound(&mut self, ctx: ExprCtx) -> PResult<Node> {
        let start = self.pos;
        let mut children = Vec::new();
        while self.at_compound_start(ctx) {
            children.push(self.parse_indexing(ctx)?);
        }
        if children.is_empty() {
            return Err(self.error_here(format!(
                "expected an expression, found {}",
                self.describe_here()
            )));
        }
        Ok(Node::new(NodeKind::Compound, self.span_from(start), children))
    }

    pub(super) fn parse_indexing(&mut self, ctx: ExprCtx) -> PResult<Node> {
        let start = self.pos;
        let mut children = vec![self.nested(|p| p.parse_primary(ctx))?];
        while self.peek() == Some(b'[') {
            let open = self.sep(1);
            let open_span = open.span;
            children.push(open);
            children.push(self.parse_array()?.with_role(Role::Index));
            children.push(self.expect_close(b']', open_span)?);
        }
        Ok(Node::new(NodeKind::Indexing, self.span_from(start), children))
    }

    fn parse_primary(&mut self, ctx: ExprCtx) -> PResult<Node> {
        let start = self.pos;
        match self.peek() {
            Some(b'\'') => self.parse_single_quoted(),
            Some(b'"') => self.parse_double_quoted(),
            Some(b'$') => self.parse_variable(),
            Some(b'*') => {
                while self.peek() == Some(b'*') {
                    self.pos += 1;
                }
                Ok(self.primary_leaf(PrimaryKind::Wildcard, start))
            }
            Some(b'?') if self.peek_at(1) == Some(b'(') => {
                self.parse_capture(PrimaryKind::ExceptionCapture, 2)
            }
            Some(b'?') => {
                self.pos += 1;
                Ok(self.primary_leaf(PrimaryKind::Wildcard, start))
            }
            Some(b'~') => {
                self.pos += 1;
                Ok(self.primary_leaf(PrimaryKind::Tilde, start))
            }
            Some(b'(') => self.parse_capture(PrimaryKind::OutputCapture, 1),
            Some(b'[') => self.parse_bracketed(),
            Some(b'{') if self.at_lambda_brace() => {
                let open = self.sep(1);
                self.parse_lambda_body(start, vec![open])
            }
            Some(b'{') => self.parse_braced(),
            Some(b) if is_bareword_byte(b, ctx) => {
                while self.peek().is_some_and(|b| is_bareword_byte(b, ctx)) {
                    self.pos += 1;
                }
                Ok(self.primary_leaf(PrimaryKind::Bareword, start))
            }
            _ => Err(self.error_here(format!(
                "expected an expression, found {}",
                self.describe_here()
            ))),
        }
    }

    fn primary_leaf(&self, kind: PrimaryKind, start: usize) -> Node {
        Node::leaf(NodeKind::Primary(kind), self.span_from(start))
    }

    fn parse_single_quoted(&mut self) -> PResult<Node> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek() {
                None => {
                    return Err(Diagnostic::error(
                        "unterminated single-quoted string".to_string(),
                        Span::new(start as u32, start as u32 + 1),
                    ))
                }
                // '' is an escaped quote
                Some(b'\'') if self.peek_at(1) == Some(b'\'') => self.pos += 2,
                Some(b'\'') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        Ok(self.primary_leaf(PrimaryKind::SingleQuoted, start))
    }

    fn parse_double_quoted(&mut self) -> PResult<Node> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek() {
                Some(b'"') => {
                    self.pos += 1;
                    break;
                }
                Some(b'\\') if self.peek_at(1).is_some() => self.pos += 2,
                Some(_) => self.pos += 1,
                None => {
                    return Err(Diagnostic::error(
                        "unterminated double-quoted string".to_string(),
                        Span::new(start as u32, start as u32 + 1),
                    ))
                }
            }
        }
        Ok(self.primary_leaf(PrimaryKind::DoubleQuoted, start))
    }

    /// `$name` or `$@name`.
    fn parse_variable(&mut self) -> PResult<Node> {
        let start = self.pos;
        self.pos += 1;
        if self.peek() == Some(b'@') {
            self.pos += 1;
        }
        let name_start = self.pos;
        while self.peek().is_some_and(is_variable_byte) {
            self.pos += 1;
        }
        if self.pos == name_start {
            return Err(Diagnostic::error(
                "variable name must not be empty".to_string(),
                self.span_from(start),
            ));
        }
        Ok(self.primary_leaf(PrimaryKind::Variable, start))
    }

    /// `(chunk)` or `?(chunk)`; `open_len` is the length of the opener.
    fn parse_capture(&mut self, kind: PrimaryKind, open_len: usize) -> PResult<Node> {
        let start = self.pos;
        let open = self.sep(open_len);
        let open_span = open.span;
        let body = self.parse_chunk()?;
        let close = self.expect_close(b')', open_span)?;
        Ok(Node::new(
            NodeKind::Primary(kind),
            self.span_from(start),
            vec![open, body, close],
        ))
    }

    /// `[...]`: a list, a map, or the parameter list of a lambda.
    fn parse_bracketed(&mut self) -> PResult<Node> {
        let start = self.pos;
        let open = self.sep(1);
        let open_span = open.span;
        if self.peek() == Some(b'&') {
            return self.parse_map(start, open);
        }
        let items = self.parse_array()?;
        let close = self.expect_close(b']', open_span)?;
        if self.peek() == Some(b'{') {
            let brace = self.sep(1);
            return self.parse_lambda_body(
                start,
                vec![open, items.with_role(Role::Params), close, brace],
            );
        }
        Ok(Node::new(
            NodeKind::Primary(PrimaryKind::List),
            self.span_from(start),
            vec![open, items, close],
        ))
    }

    /// Parses the lambda body after its opening `{`, which is the last
    /// node in `children`.
    fn parse_lambda_body(&mut self, start: usize, mut children: Vec<Node>) -> PResult<Node> {
        let open_span = children.last().map_or(Span::point(start as u32), |n| n.span);
        children.push(self.parse_chunk()?.with_role(Role::Body));
        children.push(self.expect_close(b'}', open_span)?);
        Ok(Node::new(
            NodeKind::Primary(PrimaryKind::Lambda),
            self.span_from(start),
            children,
        ))
    }

    fn parse_map(&mut self, start: usize, open: Node) -> PResult<Node> {
        let open_span = open.span;
        let mut children = vec![open];
        loop {
            if let Some(spaces) = self.spaces_and_newlines() {
                children.push(spaces);
            } else if self.peek() == Some(b'&') {
                children.push(self.parse_map_pair(true)?.with_role(Role::Item));
            } else {
                break;
            }
        }
        children.push(self.expect_close(b']', open_span)?);
        Ok(Node::new(
            NodeKind::Primary(PrimaryKind::Map),
            self.span_from(start),
            children,
        ))
    }

    /// `&key=value`. A bare `&` is only valid as the empty map `[&]`.
    pub(super) fn parse_map_pair(&mut self, allow_bare: bool) -> PResult<Node> {
        let start = self.pos;
        let mut children = vec![self.sep(1)];
        if !self.at_compound_start(ExprCtx::Lhs) {
            if allow_bare {
                return Ok(Node::new(NodeKind::MapPair, self.span_from(start), children));
            }
            return Err(self.error_here(format!(
                "expected an option name after `&`, found {}",
                self.describe_here()
            )));
        }
        children.push(self.parse_compound(ExprCtx::Lhs)?);
        if self.peek() == Some(b'=') {
            children.push(self.sep(1));
            if self.at_compound_start(ExprCtx::Normal) {
                children.push(self.parse_compound(ExprCtx::Normal)?.with_role(Role::Value));
            }
        }
        Ok(Node::new(NodeKind::MapPair, self.span_from(start), children))
    }

    /// `{a,b}` or `{a b}`.
    fn parse_braced(&mut self) -> PResult<Node> {
        let start = self.pos;
        let open = self.sep(1);
        let open_span = open.span;
        let mut children = vec![open];
        loop {
            match self.peek() {
                Some(b'}') => {
                    children.push(self.sep(1));
                    break;
                }
                Some(b',') => children.push(self.sep(1)),
                None => return Err(unclosed(b'{', open_span)),
                _ => {
                    if let Some(spaces) = self.spaces_and_newlines() {
                        children.push(spaces);
                    } else if self.at_compound_start(ExprCtx::Braced) {
                        children
                            .push(self.parse_compound(ExprCtx::Braced)?.with_role(Role::Item));
                    } else {
                        return Err(self.error_here(format!(
                            "unexpected {} in braced list",
                            self.describe_here()
                        )));
                    }
                }
            }
        }
        Ok(Node::new(
            NodeKind::Primary(PrimaryKind::Braced),
            self.span_from(start),
            children,
        ))
    }

    /// Whitespace-separated compounds, as found in lists and indices.
    pub(super) fn parse_array(&mut self) -> PResult<Node> {
        let start = self.pos;
        let mut children = Vec::new();
        loop {
            if let Some(spaces) = self.spaces_and_newlines() {
                children.push(spaces);
            } else if self.at_compound_start(ExprCtx::Normal) {
                children.push(self.parse_compound(ExprCtx::Normal)?.with_role(Role::Item));
            } else {
                break;
            }
        }
        Ok(Node::new(NodeKind::Array, self.span_from(start), children))
    }

    /// `[fd](<|>|>>|<>) [&]target`
    pub(super) fn parse_redir(&mut self) -> PResult<Node> {
        let start = self.pos;
        let mut children = Vec::new();
        let digits = self.bytes[self.pos..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        if digits > 0 {
            children.push(self.sep(digits));
        }
        let op_len = match (self.peek(), self.peek_at(1)) {
            (Some(b'>'), Some(b'>')) | (Some(b'<'), Some(b'>')) => 2,
            _ => 1,
        };
        children.push(self.sep(op_len));
        if let Some(spaces) = self.spaces() {
            children.push(spaces);
        }
        if self.peek() == Some(b'&') {
            children.push(self.sep(1));
        }
        if !self.at_compound_start(ExprCtx::Normal) {
            return Err(self.error_here(format!(
                "expected a redirection target, found {}",
                self.describe_here()
            )));
        }
        children.push(self.parse_compound(ExprCtx::Normal)?.with_role(Role::Value));
        Ok(Node::new(NodeKind::Redir, self.span_from(start), children))
    }

    pub(super) fn expect_close(&mut self, close: u8, open_span: Span) -> PResult<Node> {
        if self.peek() == Some(close) {
            return Ok(self.sep(1));
        }
        let open = &self.source[open_span.range()];
        Err(self
            .error_here(format!(
                "expected `{}`, found {}",
                close as char,
                self.describe_here()
            ))
            .with_note(format!(
                "`{}` opened on line {} is never closed",
                open,
                self.line_of(open_span.start as usize)
            )))
    }
}

fn unclosed(open: u8, open_span: Span) -> Diagnostic {
    Diagnostic::error(format!("unclosed `{}`", open as char), open_span)
}
