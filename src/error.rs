//! Error types for loading.
//!
//! Classification never fails; every error here is raised during assembly or
//! building. Callers pick a propagation mode: `Accumulate` collects errors
//! next to a best-effort result, `FailFast` aborts on the first one.

use thiserror::Error;

/// Result type for loading operations.
pub type Result<T> = std::result::Result<T, LoadError>;

/// Error propagation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Collect every error and keep building a best-effort result.
    #[default]
    Accumulate,
    /// Abort the whole parse/build on the first error.
    FailFast,
}

/// A recoverable loading error with its offending line number.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A key entry with no resolvable name.
    #[error("key has no name on line {0}")]
    EmptyKeyName(usize),

    /// A document evidencing both mapping and sequence children.
    #[error("document {0} cannot be both a mapping and a sequence")]
    ContradictoryDocumentShape(usize),

    /// An alias to an anchor never defined in its document.
    #[error("undefined reference \"{name}\" on line {line}")]
    UndefinedReference { name: String, line: usize },

    /// Input ended while a multi-line construct was still open.
    #[error("unterminated multi-line construct starting on line {0}")]
    UnterminatedContinuation(usize),

    /// Inline `{}`/`[]` text that decodes under no recognized shape.
    #[error("malformed compact form on line {0}")]
    MalformedCompactForm(usize),
}

/// Explicit error accumulator threaded through assembly and building.
///
/// Under `Accumulate` every reported error lands in `errors`; under
/// `FailFast` the first report returns `Err` so callers can propagate with
/// `?` all the way out.
#[derive(Debug)]
pub struct ErrorSink {
    mode: ErrorMode,
    errors: Vec<LoadError>,
}

impl ErrorSink {
    /// Create a sink for the given mode.
    pub fn new(mode: ErrorMode) -> Self {
        Self {
            mode,
            errors: Vec::new(),
        }
    }

    /// Report an error according to the sink's mode.
    pub fn report(&mut self, error: LoadError) -> Result<()> {
        match self.mode {
            ErrorMode::Accumulate => {
                self.errors.push(error);
                Ok(())
            }
            ErrorMode::FailFast => Err(error),
        }
    }

    /// Consume the sink, returning the collected errors.
    pub fn into_errors(self) -> Vec<LoadError> {
        self.errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulate_collects() {
        let mut sink = ErrorSink::new(ErrorMode::Accumulate);
        sink.report(LoadError::EmptyKeyName(3)).unwrap();
        sink.report(LoadError::MalformedCompactForm(7)).unwrap();
        assert_eq!(sink.into_errors().len(), 2);
    }

    #[test]
    fn fail_fast_returns_first() {
        let mut sink = ErrorSink::new(ErrorMode::FailFast);
        let err = sink.report(LoadError::EmptyKeyName(3)).unwrap_err();
        assert_eq!(err, LoadError::EmptyKeyName(3));
    }
}
