use crate::syntax::is_space_or_newline;
use crate::tree::Node;

/// The children of `chunk` with leading and trailing noise removed.
///
/// A child is noise when its text is nothing but whitespace, newlines and
/// semicolons. A chunk that is all noise yields an empty slice, so an empty
/// condition is emitted as `()`.
pub(crate) fn trim_chunk<'t>(chunk: &'t Node, source: &str) -> &'t [Node] {
    let children = &chunk.children;
    let mut kept = children
        .iter()
        .enumerate()
        .filter(|(_, child)| !is_noise(child.text(source)))
        .map(|(i, _)| i);
    match kept.next() {
        Some(first) => {
            let last = kept.last().unwrap_or(first);
            &children[first..=last]
        }
        None => &[],
    }
}

pub(crate) fn is_noise(text: &str) -> bool {
    text.chars().all(|c| is_space_or_newline(c) || c == ';')
}
