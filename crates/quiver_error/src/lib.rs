use std::fmt;

/// Classifies an error by who is expected to act on it.
///
/// `Sql` errors describe problems with the query or the data the user
/// supplied, and are surfaced as-is. `IllegalState` errors indicate a bug in
/// plan construction or execution and should be treated as fatal rather than
/// retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Semantic/user error: unknown column, unsupported SQL construct, bad
    /// alias, empty source.
    Sql,
    /// Internal-invariant violation: operand shape mismatches, unmapped
    /// dispatch arms.
    IllegalState,
    /// Valid request for behavior that isn't implemented.
    NotImplemented,
    /// Underlying IO failure.
    Io,
    /// Anything else.
    Other,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sql => write!(f, "SQL"),
            Self::IllegalState => write!(f, "Illegal state"),
            Self::NotImplemented => write!(f, "Not implemented"),
            Self::Io => write!(f, "IO"),
            Self::Other => write!(f, "Error"),
        }
    }
}

#[derive(Debug)]
pub struct QuiverError {
    kind: ErrorKind,
    msg: String,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl QuiverError {
    pub fn new(msg: impl Into<String>) -> Self {
        QuiverError {
            kind: ErrorKind::Other,
            msg: msg.into(),
            source: None,
        }
    }

    /// Create a semantic/user-facing error.
    pub fn sql(msg: impl Into<String>) -> Self {
        QuiverError {
            kind: ErrorKind::Sql,
            msg: msg.into(),
            source: None,
        }
    }

    /// Create an internal-invariant error.
    pub fn illegal_state(msg: impl Into<String>) -> Self {
        QuiverError {
            kind: ErrorKind::IllegalState,
            msg: msg.into(),
            source: None,
        }
    }

    pub fn not_implemented(msg: impl Into<String>) -> Self {
        QuiverError {
            kind: ErrorKind::NotImplemented,
            msg: msg.into(),
            source: None,
        }
    }

    pub fn with_source(
        msg: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        QuiverError {
            kind: ErrorKind::Other,
            msg: msg.into(),
            source: Some(source),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for QuiverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.msg)?;
        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}

impl std::error::Error for QuiverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as _)
    }
}

impl From<std::io::Error> for QuiverError {
    fn from(value: std::io::Error) -> Self {
        QuiverError {
            kind: ErrorKind::Io,
            msg: "IO error".to_string(),
            source: Some(Box::new(value)),
        }
    }
}

impl From<std::str::Utf8Error> for QuiverError {
    fn from(value: std::str::Utf8Error) -> Self {
        QuiverError::with_source("Invalid UTF-8", Box::new(value))
    }
}

pub type Result<T, E = QuiverError> = std::result::Result<T, E>;

pub trait ResultExt<T, E> {
    /// Wrap an error with additional context.
    fn context(self, msg: &'static str) -> Result<T>;

    /// Wrap an error with additional, lazily computed context.
    fn context_fn<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E> ResultExt<T, E> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context(self, msg: &'static str) -> Result<T> {
        self.map_err(|e| QuiverError::with_source(msg, Box::new(e)))
    }

    fn context_fn<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| QuiverError::with_source(f(), Box::new(e)))
    }
}

pub trait OptionExt<T> {
    /// Convert a missing value into an illegal-state error naming the field.
    fn required(self, field: &'static str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn required(self, field: &'static str) -> Result<T> {
        match self {
            Some(v) => Ok(v),
            None => Err(QuiverError::illegal_state(format!(
                "Missing required field: {field}"
            ))),
        }
    }
}

/// Return early with a not-implemented error.
#[macro_export]
macro_rules! not_implemented {
    ($($arg:tt)*) => {{
        let msg = format!($($arg)*);
        return Err($crate::QuiverError::not_implemented(msg));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_distinguishable() {
        assert_eq!(ErrorKind::Sql, QuiverError::sql("no column").kind());
        assert_eq!(
            ErrorKind::IllegalState,
            QuiverError::illegal_state("length mismatch").kind()
        );
    }

    #[test]
    fn display_includes_source() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = QuiverError::from(io);
        let s = err.to_string();
        assert!(s.contains("IO"), "{s}");
        assert!(s.contains("gone"), "{s}");
    }

    #[test]
    fn option_required_names_the_field() {
        let missing: Option<usize> = None;
        let err = missing.required("column index").unwrap_err();
        assert_eq!(ErrorKind::IllegalState, err.kind());
        assert!(err.message().contains("column index"), "{err}");

        assert_eq!(5, Some(5).required("column index").unwrap());
    }

    #[test]
    fn utf8_errors_convert() {
        let utf8_err = std::str::from_utf8(&[0xff, 0xfe]).unwrap_err();
        let err = QuiverError::from(utf8_err);
        assert!(err.to_string().contains("Invalid UTF-8"), "{err}");
    }

    #[test]
    fn not_implemented_macro() {
        fn check() -> Result<()> {
            not_implemented!("aggregate {}", "execution");
        }
        let err = check().unwrap_err();
        assert_eq!(ErrorKind::NotImplemented, err.kind());
        assert_eq!("aggregate execution", err.message());
    }
}
