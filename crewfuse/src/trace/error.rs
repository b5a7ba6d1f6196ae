//! Trace delivery failures.

/// Result of a collector operation.
pub type TraceResult<T> = Result<T, TraceError>;

/// Why trace events could not be recorded or delivered.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum TraceError {
    /// Ingestion endpoint answered with a non-2xx status. Bad or placeholder
    /// keys show up here as 401.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// Batch accepted, but the endpoint refused some events in it.
    #[error("{rejected} of {total} trace events rejected: {}", messages.join("; "))]
    Rejected {
        /// Refused events.
        rejected: usize,
        /// Events sent.
        total: usize,
        /// One entry per refused event.
        messages: Vec<String>,
    },

    /// The endpoint could not be reached.
    #[error("{0}")]
    Network(String),

    /// [`TraceSession::record_output`](super::TraceSession::record_output)
    /// was called a second time.
    #[error("output already recorded for trace {0}")]
    OutputAlreadyRecorded(String),

    /// The collector could not be set up, or the endpoint's answer could not
    /// be read.
    #[error("{0}")]
    Internal(String),
}

impl TraceError {
    /// [`TraceError::HttpStatus`].
    #[must_use]
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// [`TraceError::Network`].
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// [`TraceError::Internal`].
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<reqwest::Error> for TraceError {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map_or_else(String::new, |u| format!(" ({u})"));
        let what = if err.is_timeout() {
            "ingestion request timed out"
        } else if err.is_connect() {
            "cannot reach ingestion endpoint"
        } else {
            "ingestion request failed"
        };
        Self::Network(format!("{what}{url}: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_lists_every_message() {
        let err = TraceError::Rejected {
            rejected: 2,
            total: 3,
            messages: vec!["bad id".into(), "too large".into()],
        };
        assert_eq!(
            err.to_string(),
            "2 of 3 trace events rejected: bad id; too large"
        );
    }

    #[test]
    fn double_output_names_the_trace() {
        assert_eq!(
            TraceError::OutputAlreadyRecorded("t-1".into()).to_string(),
            "output already recorded for trace t-1"
        );
    }
}
