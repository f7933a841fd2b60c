//! Error reporting from the layout core to its host.
//!
//! Layout never aborts a pass because one box failed. Failures are
//! classified, handed to an [`ErrorSink`], and the traversal continues.

use std::error::Error;
use std::fmt;

/// Classification of a failure reported by the layout core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The box tree broke an invariant the algorithm relies on, e.g. a box
    /// with no reachable containing block.
    InvariantViolation,
    /// The injected text or font measurement capability failed.
    Measurement,
    /// An external resource (image, font file) was unavailable.
    Resource,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvariantViolation => "invariant violation",
            Self::Measurement => "measurement",
            Self::Resource => "resource",
        };
        f.write_str(name)
    }
}

/// Non-throwing error sink.
///
/// Implementations must not panic: the caller continues laying out the
/// remaining boxes after reporting.
pub trait ErrorSink {
    /// Record a failure of the given kind.
    fn report_error(&mut self, kind: ErrorKind, message: &str, cause: Option<&(dyn Error + 'static)>);
}

/// An [`ErrorSink`] that forwards every report to `log::error!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl ErrorSink for LogSink {
    fn report_error(&mut self, kind: ErrorKind, message: &str, cause: Option<&(dyn Error + 'static)>) {
        match cause {
            Some(cause) => log::error!(target: "weft", "{kind} error: {message}: {cause}"),
            None => log::error!(target: "weft", "{kind} error: {message}"),
        }
    }
}

/// A single recorded error report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    /// The failure classification.
    pub kind: ErrorKind,
    /// Human readable context.
    pub message: String,
    /// The rendered cause, if one was attached.
    pub cause: Option<String>,
}

/// An [`ErrorSink`] that keeps every report in memory.
///
/// Useful for hosts that surface errors after the pass, and for tests.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    reports: Vec<ErrorReport>,
}

impl CollectingSink {
    /// Create an empty sink.
    #[must_use]
    pub const fn new() -> Self {
        Self { reports: Vec::new() }
    }

    /// All reports received so far, in order.
    #[must_use]
    pub fn reports(&self) -> &[ErrorReport] {
        &self.reports
    }

    /// Drop all recorded reports.
    pub fn clear(&mut self) {
        self.reports.clear();
    }
}

impl ErrorSink for CollectingSink {
    fn report_error(&mut self, kind: ErrorKind, message: &str, cause: Option<&(dyn Error + 'static)>) {
        self.reports.push(ErrorReport {
            kind,
            message: message.to_string(),
            cause: cause.map(ToString::to_string),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Boom;

    impl fmt::Display for Boom {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("boom")
        }
    }

    impl Error for Boom {}

    #[test]
    fn test_collecting_sink_keeps_order_and_cause() {
        let mut sink = CollectingSink::new();
        sink.report_error(ErrorKind::Measurement, "first", Some(&Boom));
        sink.report_error(ErrorKind::InvariantViolation, "second", None);

        assert_eq!(sink.reports().len(), 2);
        assert_eq!(sink.reports()[0].kind, ErrorKind::Measurement);
        assert_eq!(sink.reports()[0].cause.as_deref(), Some("boom"));
        assert_eq!(sink.reports()[1].message, "second");
        assert_eq!(sink.reports()[1].cause, None);
    }
}
