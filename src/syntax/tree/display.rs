//! Indented debugging view of a syntax tree (`--dump-tree`).

use std::fmt::Write;

use super::{Node, NodeKind, Role, SyntaxTree};

impl SyntaxTree {
    /// Render the tree one node per line, children indented under their
    /// parent. Leaves show their text; roles other than `Plain` are shown
    /// after the kind.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        dump_node(&mut out, &self.root, &self.source, 0);
        out
    }
}

fn dump_node(out: &mut String, node: &Node, source: &str, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    out.push_str(&kind_label(node.kind));
    if node.role != Role::Plain {
        let _ = write!(out, " <{:?}>", node.role);
    }
    if node.is_leaf() {
        let _ = write!(out, " {:?}", node.text(source));
    }
    out.push('\n');
    for child in &node.children {
        dump_node(out, child, source, depth + 1);
    }
}

fn kind_label(kind: NodeKind) -> String {
    match kind {
        NodeKind::Control(k) => format!("Control({})", k.leader()),
        NodeKind::Primary(p) => format!("{:?}", p),
        other => format!("{:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::parser::parse;

    #[test]
    fn test_dump_shows_roles_and_leaf_text() {
        let tree = parse("t", "a=1").unwrap();
        let dump = tree.dump();
        let lines: Vec<&str> = dump.lines().collect();
        assert_eq!(lines[0], "Chunk");
        assert_eq!(lines[1], "  Pipeline <Pipeline>");
        assert_eq!(lines[2], "    Form <Form>");
        assert_eq!(lines[3], "      Assignment <Assignment>");
        assert_eq!(lines[4], "        Indexing <Target>");
        assert_eq!(lines[5], "          Bareword \"a\"");
        assert_eq!(lines[6], "        Sep \"=\"");
        assert_eq!(lines[7], "        Compound <Value>");
    }

    #[test]
    fn test_dump_labels_control_by_leader() {
        let tree = parse("t", "while a; do b; done").unwrap();
        assert!(tree.dump().contains("Control(while)"));
    }
}
