//! Turning inputs into upgraded text: decoding, parsing, rewriting, and
//! writing files back in place.
//!
//! Every input is handled on its own. A file that fails at any stage is
//! reported and left untouched, and never stops the others.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;

use crate::error::FixError;
use crate::parser::parse;
use crate::rewrite::rewrite;
use crate::tree::SyntaxTree;

/// What to do with a file whose upgraded text differs from its contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Replace the file's contents.
    Write,
    /// Only report that the file would change.
    Check,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileOutcome {
    /// The file was rewritten.
    Upgraded,
    /// Already in the new grammar; nothing written.
    Unchanged,
    /// `Check` mode found old-grammar constructs.
    WouldUpgrade,
}

/// Result for one file of a batch.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub result: Result<FileOutcome, FixError>,
}

/// Decode and parse one input.
pub fn parse_bytes(name: &str, bytes: &[u8]) -> Result<SyntaxTree, FixError> {
    let source = std::str::from_utf8(bytes).map_err(|source| FixError::Encoding {
        name: name.to_string(),
        source,
    })?;
    debug!(file = name, bytes = bytes.len(), "parsing");
    parse(name, source).map_err(|diagnostic| FixError::Parse {
        name: name.to_string(),
        text: source.to_string(),
        diagnostic,
    })
}

/// Upgrade one input held in memory.
pub fn fix(name: &str, bytes: &[u8]) -> Result<String, FixError> {
    let tree = parse_bytes(name, bytes)?;
    debug!(file = name, "rewriting");
    Ok(rewrite(&tree))
}

/// Read `reader` to the end, e.g. standard input.
pub fn read_all(name: &str, mut reader: impl Read) -> Result<Vec<u8>, FixError> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .map_err(|source| FixError::Read {
            name: name.to_string(),
            source,
        })?;
    Ok(bytes)
}

/// Upgrade everything `reader` yields.
pub fn fix_reader(name: &str, reader: impl Read) -> Result<String, FixError> {
    let bytes = read_all(name, reader)?;
    fix(name, &bytes)
}

fn read_file(path: &Path) -> Result<(String, Vec<u8>), FixError> {
    let name = path.display().to_string();
    match fs::read(path) {
        Ok(bytes) => Ok((name, bytes)),
        Err(source) => Err(FixError::Read { name, source }),
    }
}

/// Upgrade one file in place. Nothing is written unless the whole file
/// parsed and its text actually changed.
pub fn fix_file(path: &Path, mode: Mode) -> Result<FileOutcome, FixError> {
    let (name, bytes) = read_file(path)?;
    let upgraded = fix(&name, &bytes)?;

    if upgraded.as_bytes() == bytes.as_slice() {
        debug!(file = %name, "already up to date");
        return Ok(FileOutcome::Unchanged);
    }

    match mode {
        Mode::Check => Ok(FileOutcome::WouldUpgrade),
        Mode::Write => {
            fs::write(path, &upgraded).map_err(|source| FixError::Write {
                name: name.clone(),
                source,
            })?;
            debug!(file = %name, bytes = upgraded.len(), "written");
            Ok(FileOutcome::Upgraded)
        }
    }
}

/// Upgrade many files in parallel. Reports come back in the order of
/// `paths`.
pub fn fix_files(paths: &[PathBuf], mode: Mode) -> Vec<FileReport> {
    paths
        .par_iter()
        .map(|path| FileReport {
            path: path.clone(),
            result: fix_file(path, mode),
        })
        .collect()
}

/// The indented tree view of one file, for `--dump-tree`.
pub fn dump_file(path: &Path) -> Result<String, FixError> {
    let (name, bytes) = read_file(path)?;
    Ok(parse_bytes(&name, &bytes)?.dump())
}
