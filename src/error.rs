use std::io;
use std::str::Utf8Error;

use thiserror::Error;

use crate::diagnostic::Diagnostic;

/// Why an input was skipped. The input itself is never modified when one
/// of these is returned.
#[derive(Error, Debug)]
pub enum FixError {
    #[error("cannot read {name}: {source}")]
    Read { name: String, source: io::Error },

    #[error("{name} is not valid UTF-8 (invalid byte at offset {offset})", offset = .source.valid_up_to())]
    Encoding { name: String, source: Utf8Error },

    #[error("cannot parse {name}: {diagnostic}")]
    Parse {
        name: String,
        /// The text that failed to parse, kept for rendering.
        text: String,
        diagnostic: Diagnostic,
    },

    #[error("cannot write {name}: {source}")]
    Write { name: String, source: io::Error },
}

impl FixError {
    /// Name of the input this error is about.
    pub fn name(&self) -> &str {
        match self {
            FixError::Read { name, .. }
            | FixError::Encoding { name, .. }
            | FixError::Parse { name, .. }
            | FixError::Write { name, .. } => name,
        }
    }

    /// Print the error to stderr: a source excerpt for parse errors, a
    /// single line otherwise.
    pub fn render(&self) {
        match self {
            FixError::Parse {
                name,
                text,
                diagnostic,
            } => diagnostic.render(name, text),
            other => eprintln!("error: {}", other),
        }
    }
}
