//! Non-fatal warnings produced while loading JSONL data.
//!
//! Resilient loading never fails the whole file for a single bad line.
//! Instead, problematic lines are skipped and reported through [`Warning`]
//! values so callers can log them or surface them to users.

/// A non-fatal problem encountered while loading a JSONL file.
///
/// Warnings indicate data quality issues (corruption, manual edits,
/// incomplete writes) that did not prevent the rest of the file from
/// loading. Applications should log or report them, since they usually
/// point at records that were silently dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A line could not be parsed as JSON and was skipped.
    MalformedJson {
        /// 1-based line number in the source file.
        line_number: usize,
        /// The parser's error message.
        error: String,
    },

    /// A line parsed as JSON but did not match the expected record shape.
    SkippedLine {
        /// 1-based line number in the source file.
        line_number: usize,
        /// Why the line was skipped.
        reason: String,
    },
}

impl Warning {
    /// Returns the 1-based line number this warning refers to.
    #[must_use]
    pub fn line_number(&self) -> usize {
        match self {
            Self::MalformedJson { line_number, .. } | Self::SkippedLine { line_number, .. } => {
                *line_number
            }
        }
    }

    /// Returns a human-readable description of the warning.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::MalformedJson { line_number, error } => {
                format!("line {line_number}: malformed JSON: {error}")
            }
            Self::SkippedLine {
                line_number,
                reason,
            } => format!("line {line_number}: skipped: {reason}"),
        }
    }

    /// Returns a short, stable kind string for logging and metrics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MalformedJson { .. } => "malformed_json",
            Self::SkippedLine { .. } => "skipped_line",
        }
    }
}

impl std::fmt::Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_json_reports_line_number() {
        let warning = Warning::MalformedJson {
            line_number: 7,
            error: "unexpected end of input".to_string(),
        };
        assert_eq!(warning.line_number(), 7);
        assert_eq!(warning.kind(), "malformed_json");
        assert!(warning.description().contains("line 7"));
    }

    #[test]
    fn skipped_line_reports_reason() {
        let warning = Warning::SkippedLine {
            line_number: 3,
            reason: "missing field `id`".to_string(),
        };
        assert_eq!(warning.line_number(), 3);
        assert_eq!(warning.kind(), "skipped_line");
        assert!(warning.to_string().contains("missing field `id`"));
    }
}
