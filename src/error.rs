//! Error type shared by properties and subjects.

use thiserror::Error;

/// Errors surfaced by the strict property API or carried through a subject's
/// error channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PropertyError {
    /// The property has been torn down and no longer accepts values.
    #[error("reactive property is closed")]
    Closed,
    /// An error raised by a producer and forwarded to observers as-is.
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl PropertyError {
    /// Wrap any displayable producer error for delivery through a subject.
    pub fn upstream(err: impl std::fmt::Display) -> Self {
        Self::Upstream(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(PropertyError::Closed.to_string(), "reactive property is closed");
        assert_eq!(
            PropertyError::upstream("sensor offline").to_string(),
            "upstream error: sensor offline"
        );
    }
}
