/// Error types for level loading.
///
/// A level file that cannot be read or parsed is a `LevelError`; the
/// campaign falls back to the built-in levels. A single malformed entity
/// entry is only a `LevelDiagnostic`: the entry is skipped and the rest of
/// the level loads.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum LevelError {
    Io { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, message: String },
    /// The levels directory holds no `.toml` files.
    Empty { dir: PathBuf },
}

impl fmt::Display for LevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelError::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            LevelError::Parse { path, message } => write!(f, "{}: {message}", path.display()),
            LevelError::Empty { dir } => write!(f, "no level files in {}", dir.display()),
        }
    }
}

impl std::error::Error for LevelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LevelError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// A malformed `"x,y"` / `"x,y;dir;d1,d2"` tuple.
#[derive(Clone, PartialEq, Debug)]
pub enum TupleError {
    Arity { expected: usize, found: usize },
    NotNumeric(String),
    BadFacing(String),
}

impl fmt::Display for TupleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TupleError::Arity { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
            TupleError::NotNumeric(s) => write!(f, "not a number: {s:?}"),
            TupleError::BadFacing(s) => write!(f, "facing must be left or right, got {s:?}"),
        }
    }
}

impl std::error::Error for TupleError {}

/// One skipped (or defaulted) entity entry.
#[derive(Clone, PartialEq, Debug)]
pub struct LevelDiagnostic {
    pub entity: &'static str,
    pub index: usize,
    pub raw: String,
    pub error: TupleError,
}

impl fmt::Display for LevelDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}] {:?}: {}", self.entity, self.index, self.raw, self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_names_the_entry() {
        let d = LevelDiagnostic {
            entity: "barrels",
            index: 2,
            raw: "12,abc".into(),
            error: TupleError::NotNumeric("abc".into()),
        };
        assert_eq!(d.to_string(), r#"barrels[2] "12,abc": not a number: "abc""#);
    }

    #[test]
    fn io_error_exposes_source() {
        use std::error::Error;
        let e = LevelError::Io {
            path: PathBuf::from("levels/level1.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(e.source().is_some());
        assert!(e.to_string().starts_with("cannot read levels/level1.toml"));
    }
}
