//! Diagnostic reporting for the exporter.
//!
//! The builder never talks to a global logger. It reports non-fatal findings
//! through a [`DiagnosticSink`] handed to it by the caller. [`LogSink`]
//! forwards to the `log` facade; [`CollectingSink`] keeps messages for
//! inspection.

use log::Level;

/// A single reported finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity.
    pub level: Level,
    /// Message text.
    pub message: String,
}

/// Receiver of exporter diagnostics.
pub trait DiagnosticSink {
    /// Record one message.
    fn emit(&mut self, level: Level, message: &str);

    /// Record a warning.
    fn warn(&mut self, message: &str) {
        self.emit(Level::Warn, message);
    }
}

impl<F: FnMut(Level, &str)> DiagnosticSink for F {
    fn emit(&mut self, level: Level, message: &str) {
        self(level, message)
    }
}

/// Forwards every message to the `log` facade under the `teton` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn emit(&mut self, level: Level, message: &str) {
        log::log!(target: "teton", level, "{}", message);
    }
}

/// Keeps every message in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    /// Messages in emission order.
    pub diagnostics: Vec<Diagnostic>,
}

impl CollectingSink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages at warning level.
    pub fn warnings(&self) -> impl Iterator<Item = &str> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == Level::Warn)
            .map(|d| d.message.as_str())
    }

    /// Check if any warning contains `needle`.
    pub fn has_warning(&self, needle: &str) -> bool {
        self.warnings().any(|w| w.contains(needle))
    }
}

impl DiagnosticSink for CollectingSink {
    fn emit(&mut self, level: Level, message: &str) {
        self.diagnostics.push(Diagnostic {
            level,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink() {
        let mut sink = CollectingSink::new();
        sink.warn("line width mismatch");
        sink.emit(Level::Info, "done");

        assert_eq!(sink.diagnostics.len(), 2);
        assert_eq!(sink.warnings().count(), 1);
        assert!(sink.has_warning("mismatch"));
        assert!(!sink.has_warning("done"));
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |level: Level, msg: &str| seen.push((level, msg.to_string()));
            sink.warn("x");
        }
        assert_eq!(seen, vec![(Level::Warn, "x".to_string())]);
    }

    #[test]
    fn test_log_sink_does_not_panic_without_logger() {
        LogSink.warn("no logger installed");
    }
}
