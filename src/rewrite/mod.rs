//! Rewrites a pre-0.7 syntax tree into 0.7 source text.
//!
//! Everything outside control constructs and assignment-only forms is
//! re-emitted byte for byte. Inside a control construct:
//!
//! ```text
//! for x in a b; do echo $x; done    =>  for x [a b] { echo $x; }
//! if a; then b; else c; fi           =>  if (a) { b; } else { c; }
//! ```

mod trim;

#[cfg(test)]
mod tests;

use crate::tree::{Node, NodeKind, Role, SyntaxTree};

use trim::trim_chunk;

/// Old-grammar tokens with no counterpart in the new grammar.
const SUPPRESSED: &[&str] = &["\n", ";", "in", "do", "done", "then", "fi", "tried"];

/// Keywords that survive but need a space before them once the closing
/// brace of the previous body is glued to them.
const SPACE_PREFIXED: &[&str] = &["elif", "else", "except", "finally"];

/// Rewrite a whole parsed script.
pub fn rewrite(tree: &SyntaxTree) -> String {
    let mut ctx = RewriteCtx::new(&tree.source);
    ctx.emit_node(&tree.root);
    ctx.output
}

struct RewriteCtx<'src> {
    source: &'src str,
    output: String,
}

impl<'src> RewriteCtx<'src> {
    fn new(source: &'src str) -> Self {
        Self {
            source,
            output: String::with_capacity(source.len() + source.len() / 8),
        }
    }

    fn emit_node(&mut self, node: &Node) {
        if node.is_control() {
            self.emit_control(node);
        } else if node.is_assignment_only() {
            self.emit_assignments(node);
        } else if node.is_leaf() {
            let text = node.text(self.source);
            // `?(` lost its `?` in the new grammar.
            self.output.push_str(if text == "?(" { "(" } else { text });
        } else {
            self.emit_children(&node.children);
        }
    }

    fn emit_children(&mut self, children: &[Node]) {
        for child in children {
            self.emit_node(child);
        }
    }

    fn emit_control(&mut self, ctrl: &Node) {
        for child in &ctrl.children {
            let text = child.text(self.source);
            // Only tokens are matched: a body consisting of a lone newline
            // still gets its braces.
            if child.is_leaf() && SUPPRESSED.contains(&text) {
                continue;
            }
            if child.is_leaf() && SPACE_PREFIXED.contains(&text) {
                self.output.push(' ');
                self.output.push_str(text);
                continue;
            }
            match child.role {
                Role::Array => self.emit_iteration_list(child),
                Role::Condition => {
                    self.output.push_str(" (");
                    self.emit_children(trim_chunk(child, self.source));
                    self.output.push(')');
                }
                _ if child.is_chunk() => {
                    self.output.push_str(" {");
                    if child.role == Role::ExceptBody {
                        self.output.push('\n');
                    }
                    self.emit_node(child);
                    self.output.push('}');
                }
                _ => self.emit_node(child),
            }
        }
    }

    /// `a  b\n c` => `[a b c]`
    fn emit_iteration_list(&mut self, array: &Node) {
        assert_eq!(
            array.kind,
            NodeKind::Array,
            "iteration source of a control node must be an array, found {:?}",
            array.kind
        );
        self.output.push('[');
        for (i, item) in array.fields(Role::Item).enumerate() {
            if i > 0 {
                self.output.push(' ');
            }
            self.emit_node(item);
        }
        self.output.push(']');
    }

    /// `a=1 {b,c}=(f)` => `a = 1; b c = (f)`
    fn emit_assignments(&mut self, form: &Node) {
        for (i, assignment) in form.fields(Role::Assignment).enumerate() {
            if i > 0 {
                self.output.push_str("; ");
            }
            if let Some(targets) = assignment.braced_targets() {
                for (j, target) in targets.enumerate() {
                    if j > 0 {
                        self.output.push(' ');
                    }
                    self.emit_node(target);
                }
            } else if let Some(target) = assignment.field(Role::Target) {
                self.emit_node(target);
            }
            self.output.push_str(" = ");
            if let Some(value) = assignment.field(Role::Value) {
                self.emit_node(value);
            }
        }
    }
}
