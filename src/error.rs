//! Error taxonomy for the assembly engine.
//!
//! Every failure the core can raise falls into one of three kinds. The first
//! error aborts the whole invocation; nothing is retried internally.
use std::fmt;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Coarse failure category, stable for callers that branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    ResourceNotFound,
    ParseFailure,
    StructuralViolation,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ResourceNotFound => "resource_not_found",
            ErrorKind::ParseFailure => "parse_failure",
            ErrorKind::StructuralViolation => "structural_violation",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum AssembleError {
    /// A configuration or page-content resource is missing or unreadable.
    #[error("resource not found: {what} ({detail})")]
    ResourceNotFound { what: String, detail: String },

    /// A resource exists but its contents are malformed.
    #[error("parse failure in {what}: {detail}")]
    ParseFailure { what: String, detail: String },

    /// An element the engine relies on is absent from the input.
    #[error("structural violation: {0}")]
    StructuralViolation(String),
}

impl AssembleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AssembleError::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            AssembleError::ParseFailure { .. } => ErrorKind::ParseFailure,
            AssembleError::StructuralViolation(_) => ErrorKind::StructuralViolation,
        }
    }

    pub fn parse(what: impl Into<String>, detail: impl fmt::Display) -> Self {
        AssembleError::ParseFailure {
            what: what.into(),
            detail: detail.to_string(),
        }
    }

    pub fn structural(message: impl Into<String>) -> Self {
        AssembleError::StructuralViolation(message.into())
    }

    /// Wrap a failed read of `path`; any I/O failure counts as the resource
    /// being unavailable.
    pub fn read(path: &Path, err: io::Error) -> Self {
        AssembleError::ResourceNotFound {
            what: path.display().to_string(),
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_variants() {
        let missing = AssembleError::read(
            Path::new("/nope/rules.properties"),
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(missing.kind(), ErrorKind::ResourceNotFound);
        assert!(missing.to_string().contains("/nope/rules.properties"));

        let parse = AssembleError::parse("page.hocr", "unexpected end of stream");
        assert_eq!(parse.kind(), ErrorKind::ParseFailure);
        assert_eq!(
            parse.to_string(),
            "parse failure in page.hocr: unexpected end of stream"
        );

        let structural = AssembleError::structural("documents[0].type is missing");
        assert_eq!(structural.kind(), ErrorKind::StructuralViolation);
        assert_eq!(structural.kind().as_str(), "structural_violation");
    }
}
