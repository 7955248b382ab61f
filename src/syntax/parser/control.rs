use super::{ExprCtx, PResult, Parser};
use crate::diagnostic::Diagnostic;
use crate::span::Span;
use crate::tree::{ControlKind, Node, NodeKind, Role};

impl Parser<'_> {
    /// Parse a control construct starting at its leader keyword.
    ///
    /// Keywords, the separators that belong to the construct itself and
    /// the whitespace around the `for` variable are all direct children,
    /// interleaved with the chunks and expressions in source order.
    pub(super) fn parse_control(&mut self, kind: ControlKind) -> PResult<Node> {
        let start = self.pos;
        let mut children = vec![self.keyword(kind.leader())];
        match kind {
            ControlKind::If => self.parse_if(&mut children, start)?,
            ControlKind::While => self.parse_while(&mut children, start)?,
            ControlKind::For => self.parse_for(&mut children, start)?,
            ControlKind::Try => self.parse_try(&mut children)?,
        }
        children.push(self.expect_keyword(kind.terminator(), kind, start)?);
        Ok(Node::new(
            NodeKind::Control(kind),
            self.span_from(start),
            children,
        ))
    }

    // if a; then b; elif c; then d; else e; fi
    fn parse_if(&mut self, children: &mut Vec<Node>, start: usize) -> PResult<()> {
        children.push(self.parse_condition()?);
        children.push(self.expect_keyword("then", ControlKind::If, start)?);
        children.push(self.parse_chunk()?.with_role(Role::Body));
        while self.at_keyword("elif") {
            children.push(self.keyword("elif"));
            children.push(self.parse_condition()?);
            children.push(self.expect_keyword("then", ControlKind::If, start)?);
            children.push(self.parse_chunk()?.with_role(Role::Body));
        }
        self.parse_else(children)
    }

    // while a; do b; else c; done
    fn parse_while(&mut self, children: &mut Vec<Node>, start: usize) -> PResult<()> {
        children.push(self.parse_condition()?);
        children.push(self.expect_keyword("do", ControlKind::While, start)?);
        children.push(self.parse_chunk()?.with_role(Role::Body));
        self.parse_else(children)
    }

    // for x in a b c; do d; else e; done
    fn parse_for(&mut self, children: &mut Vec<Node>, start: usize) -> PResult<()> {
        match self.spaces() {
            Some(spaces) if self.at_compound_start(ExprCtx::Lhs) => children.push(spaces),
            _ => {
                return Err(self.error_here(format!(
                    "expected a variable name after `for`, found {}",
                    self.describe_here()
                )))
            }
        }
        children.push(self.parse_indexing(ExprCtx::Lhs)?.with_role(Role::Iterator));
        match self.spaces() {
            Some(spaces) if self.at_keyword("in") => {
                children.push(spaces);
                children.push(self.keyword("in"));
            }
            _ => {
                return Err(self
                    .error_here(format!("expected `in`, found {}", self.describe_here()))
                    .with_help("old-style loops are written `for x in a b c; do ...; done`".to_string()))
            }
        }
        children.push(self.parse_for_array()?.with_role(Role::Array));
        children.push(self.expect_keyword("do", ControlKind::For, start)?);
        children.push(self.parse_chunk()?.with_role(Role::Body));
        self.parse_else(children)
    }

    // try a; except e; b; else c; finally d; tried
    fn parse_try(&mut self, children: &mut Vec<Node>) -> PResult<()> {
        children.push(self.parse_chunk()?.with_role(Role::Body));
        if self.at_keyword("except") {
            children.push(self.keyword("except"));
            let n = self.spaces_len(self.pos);
            if n > 0 && self.at_compound_start_at(self.pos + n, ExprCtx::Lhs) {
                children.push(self.sep(n));
                children.push(self.parse_indexing(ExprCtx::Lhs)?.with_role(Role::ExceptVar));
            }
            // The separator ending the `except` line belongs to the
            // construct, not to the body.
            if matches!(self.peek(), Some(b'\n' | b';')) {
                children.push(self.sep(1));
            }
            children.push(self.parse_chunk()?.with_role(Role::ExceptBody));
        }
        self.parse_else(children)?;
        if self.at_keyword("finally") {
            children.push(self.keyword("finally"));
            children.push(self.parse_chunk()?.with_role(Role::FinallyBody));
        }
        Ok(())
    }

    fn parse_else(&mut self, children: &mut Vec<Node>) -> PResult<()> {
        if self.at_keyword("else") {
            children.push(self.keyword("else"));
            children.push(self.parse_chunk()?.with_role(Role::ElseBody));
        }
        Ok(())
    }

    /// A chunk that must contain at least one pipeline.
    fn parse_condition(&mut self) -> PResult<Node> {
        let chunk = self.parse_chunk()?;
        if !chunk.children.iter().any(|c| c.kind == NodeKind::Pipeline) {
            let span = if chunk.span.is_empty() {
                self.span_here()
            } else {
                chunk.span
            };
            return Err(Diagnostic::error("expected a condition".to_string(), span));
        }
        Ok(chunk.with_role(Role::Condition))
    }

    /// The list after `for x in`. It takes in the separators and whitespace
    /// up to `do`, which only ends the list after a separator.
    fn parse_for_array(&mut self) -> PResult<Node> {
        let start = self.pos;
        let mut children = Vec::new();
        let mut after_sep = false;
        loop {
            if matches!(self.peek(), Some(b'\n' | b';')) {
                children.push(self.sep(1));
                after_sep = true;
            } else if let Some(spaces) = self.spaces() {
                children.push(spaces);
            } else if after_sep && self.at_keyword("do") {
                break;
            } else if self.at_compound_start(ExprCtx::Normal) {
                children.push(self.parse_compound(ExprCtx::Normal)?.with_role(Role::Item));
                after_sep = false;
            } else {
                break;
            }
        }
        Ok(Node::new(NodeKind::Array, self.span_from(start), children))
    }

    fn expect_keyword(
        &mut self,
        keyword: &'static str,
        kind: ControlKind,
        start: usize,
    ) -> PResult<Node> {
        if self.at_keyword(keyword) {
            return Ok(self.keyword(keyword));
        }
        let leader = kind.leader();
        let mut diag = self
            .error_here(format!(
                "expected `{}`, found {}",
                keyword,
                self.describe_here()
            ))
            .with_note(format!(
                "`{}` on line {} starts here",
                leader,
                self.line_of(start)
            ));
        if keyword == kind.terminator() {
            diag = diag.with_help(format!("close the `{}` with `{}`", leader, keyword));
        }
        Err(self.anchor_at_last_token(diag))
    }

    /// Point a diagnostic raised at end of input at the last non-blank
    /// character instead, which reads better when a terminator is missing.
    fn anchor_at_last_token(&self, diag: Diagnostic) -> Diagnostic {
        if !self.at_eof() || !diag.span.is_empty() {
            return diag;
        }
        let end = self.source.trim_end().len();
        let start = self.source[..end]
            .char_indices()
            .last()
            .map_or(0, |(i, _)| i);
        Diagnostic {
            span: Span::new(start as u32, end as u32),
            ..diag
        }
    }
}
