use super::*;
use crate::parser::parse;
use crate::span::Span;
use crate::tree::{ControlKind, NodeKind, PrimaryKind};

/// Helper: parse old-grammar source and rewrite it.
fn upgrade(source: &str) -> String {
    let tree = parse("test.elv", source).unwrap_or_else(|d| panic!("parse error: {}", d));
    rewrite(&tree)
}

// --- Untouched text ---

#[test]
fn test_plain_commands_unchanged() {
    let src = "echo hello | wc -l\n";
    assert_eq!(upgrade(src), src);
}

#[test]
fn test_expressions_unchanged() {
    let src = r#"each [x]{ echo $x } [a b]
put [&k=v] 'q''s' "d\"q" ~/x *.go 2>&1 >out
"#;
    assert_eq!(upgrade(src), src);
}

#[test]
fn test_comments_unchanged() {
    let src = "# leading\necho a # trailing\n\n";
    assert_eq!(upgrade(src), src);
}

#[test]
fn test_keywords_outside_controls_unchanged() {
    let src = "echo in do done then fi tried\n";
    assert_eq!(upgrade(src), src);
}

#[test]
fn test_empty_source() {
    assert_eq!(upgrade(""), "");
}

// --- Control constructs ---

#[test]
fn test_if_inline() {
    assert_eq!(upgrade("if a; then b; fi"), "if (a) { b; }");
}

#[test]
fn test_if_multiline() {
    assert_eq!(upgrade("if a\nthen\n  b\nfi\n"), "if (a) {\n  b\n}\n");
}

#[test]
fn test_newline_only_body_keeps_braces() {
    assert_eq!(upgrade("if a; then\nfi"), "if (a) {\n}");
}

#[test]
fn test_if_elif_else_chain() {
    let src = "if a; then\n  echo a\nelif b; then\n  echo b\nelse\n  echo c\nfi\n";
    let expected = "if (a) {\n  echo a\n} elif (b) {\n  echo b\n} else {\n  echo c\n}\n";
    assert_eq!(upgrade(src), expected);
}

#[test]
fn test_condition_noise_trimmed() {
    assert_eq!(
        upgrade("if \n  ; a == b ;\n then c; fi"),
        "if (a == b) { c; }"
    );
}

#[test]
fn test_condition_pipeline_kept_whole() {
    assert_eq!(
        upgrade("while cat f | grep x; do b; done"),
        "while (cat f | grep x) { b; }"
    );
}

#[test]
fn test_condition_inner_separators_kept() {
    assert_eq!(upgrade("if a; b; then c; fi"), "if (a; b) { c; }");
}

#[test]
fn test_while_with_else() {
    assert_eq!(
        upgrade("while a; do b; else c; done"),
        "while (a) { b; } else { c; }"
    );
}

#[test]
fn test_for_list_bracketed() {
    assert_eq!(
        upgrade("for x in a b c; do echo $x; done"),
        "for x [a b c] { echo $x; }"
    );
}

#[test]
fn test_for_list_spacing_normalized() {
    let src = "for x in a   b\n  c\ndo\n  echo $x\ndone\n";
    assert_eq!(upgrade(src), "for x [a b c] {\n  echo $x\n}\n");
}

#[test]
fn test_for_list_compound_items() {
    assert_eq!(
        upgrade("for f in *.go $dir/x'y'; do put $f; done"),
        "for f [*.go $dir/x'y'] { put $f; }"
    );
}

#[test]
fn test_for_empty_list() {
    assert_eq!(upgrade("for x in; do b; done"), "for x [] { b; }");
}

#[test]
fn test_try_full() {
    let src = "try\n  fail bad\nexcept e\n  echo $e\nelse\n  echo ok\nfinally\n  echo done\ntried\n";
    let expected =
        "try {\n  fail bad\n} except e {\n  echo $e\n} else {\n  echo ok\n} finally {\n  echo done\n}\n";
    assert_eq!(upgrade(src), expected);
}

#[test]
fn test_try_except_without_variable() {
    assert_eq!(
        upgrade("try a; except; b; tried"),
        "try { a; } except {\n b; }"
    );
}

#[test]
fn test_try_finally_only() {
    assert_eq!(
        upgrade("try a; finally b; tried"),
        "try { a; } finally { b; }"
    );
}

#[test]
fn test_nested_controls() {
    let src = "for x in a b; do\n  if $x; then\n    echo $x\n  fi\ndone\n";
    let expected = "for x [a b] {\n  if ($x) {\n    echo $x\n  }\n}\n";
    assert_eq!(upgrade(src), expected);
}

#[test]
fn test_control_inside_lambda() {
    assert_eq!(
        upgrade("each [x]{ if $x; then echo; fi } $l\n"),
        "each [x]{ if ($x) { echo; } } $l\n"
    );
}

#[test]
fn test_control_inside_capture() {
    assert_eq!(
        upgrade("put (if a; then put b; fi)"),
        "put (if (a) { put b; })"
    );
}

#[test]
fn test_control_in_pipeline() {
    assert_eq!(
        upgrade("for x in a b; do put $x; done | each $f"),
        "for x [a b] { put $x; } | each $f"
    );
}

// --- Assignments ---

#[test]
fn test_single_assignment() {
    assert_eq!(upgrade("a=foo\n"), "a = foo\n");
}

#[test]
fn test_multiple_assignments_joined() {
    assert_eq!(upgrade("a=1 b=2  c=3\n"), "a = 1; b = 2; c = 3\n");
}

#[test]
fn test_braced_target_flattened() {
    assert_eq!(upgrade("{a,b}=(put 1 2)\n"), "a b = (put 1 2)\n");
    assert_eq!(upgrade("{a b}=(put 1 2)\n"), "a b = (put 1 2)\n");
}

#[test]
fn test_indexed_target() {
    assert_eq!(upgrade("m[k]=v"), "m[k] = v");
}

#[test]
fn test_temporary_assignment_unchanged() {
    let src = "a=1 echo $a\n";
    assert_eq!(upgrade(src), src);
}

#[test]
fn test_assignment_inside_body() {
    assert_eq!(
        upgrade("if a; then x=1; fi"),
        "if (a) { x = 1; }"
    );
}

// --- Exception capture ---

#[test]
fn test_exception_capture_marker_dropped() {
    assert_eq!(upgrade("put ?(fail bad)\n"), "put (fail bad)\n");
    assert_eq!(upgrade("e=?(fail)"), "e = (fail)");
}

#[test]
fn test_wildcard_question_mark_kept() {
    let src = "ls a?c\n";
    assert_eq!(upgrade(src), src);
}

// --- Hand-built trees ---

fn sep(start: u32, end: u32) -> Node {
    Node::sep(Span::new(start, end))
}

#[test]
fn test_all_noise_condition_emits_empty_parens() {
    // if ;then x;fi
    let source = "if ;then x;fi";
    let condition = Node::new(NodeKind::Chunk, Span::new(2, 4), vec![sep(2, 3), sep(3, 4)])
        .with_role(Role::Condition);
    let body = Node::new(NodeKind::Chunk, Span::new(8, 11), vec![sep(8, 10), sep(10, 11)])
        .with_role(Role::Body);
    let root = Node::new(
        NodeKind::Control(ControlKind::If),
        Span::new(0, 13),
        vec![sep(0, 2), condition, sep(4, 8), body, sep(11, 13)],
    );
    let tree = SyntaxTree {
        name: "hand-built".to_string(),
        source: source.to_string(),
        root,
    };
    assert_eq!(rewrite(&tree), "if () { x;}");
}

#[test]
#[should_panic(expected = "iteration source")]
fn test_non_array_iteration_source_panics() {
    let source = "for x";
    let bogus = Node::leaf(NodeKind::Primary(PrimaryKind::Bareword), Span::new(4, 5))
        .with_role(Role::Array);
    let root = Node::new(
        NodeKind::Control(ControlKind::For),
        Span::new(0, 5),
        vec![sep(0, 3), sep(3, 4), bogus],
    );
    let tree = SyntaxTree {
        name: "hand-built".to_string(),
        source: source.to_string(),
        root,
    };
    rewrite(&tree);
}

#[test]
fn test_rewrite_does_not_mutate_tree() {
    let tree = parse("t", "for x in a b; do put $x; done").unwrap();
    let before = tree.root.clone();
    let first = rewrite(&tree);
    let second = rewrite(&tree);
    assert_eq!(tree.root, before);
    assert_eq!(first, second);
}
