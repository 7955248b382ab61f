pub mod parser;
pub mod span;
pub mod tree;

/// Whitespace as the old grammar sees it, newlines included.
pub fn is_space_or_newline(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}
