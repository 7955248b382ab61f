//! Upgrades Elvish scripts written in the pre-0.7 grammar to the 0.7
//! grammar.
//!
//! ```
//! let new = elvish_upgrade::upgrade_source("if a; then b; fi", "x.elv").unwrap();
//! assert_eq!(new, "if (a) { b; }");
//! ```

pub mod diagnostic;
pub mod driver;
pub mod error;
pub mod rewrite;
pub mod syntax;
pub mod tracing_config;

pub use syntax::parser;
pub use syntax::span;
pub use syntax::tree;

pub use error::FixError;
pub use rewrite::rewrite;

use diagnostic::Diagnostic;
use tree::SyntaxTree;

/// Parse old-grammar source into a lossless syntax tree.
pub fn parse_source(source: &str, name: &str) -> Result<SyntaxTree, Diagnostic> {
    parser::parse(name, source)
}

/// Parse and rewrite in one step.
pub fn upgrade_source(source: &str, name: &str) -> Result<String, Diagnostic> {
    let tree = parse_source(source, name)?;
    Ok(rewrite(&tree))
}
