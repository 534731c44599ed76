use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("Reddit API error: {0}")]
    Reddit(String),

    #[error("source '{0}' timed out")]
    Timeout(String),

    #[error("unexpected status {status} from {source_name}")]
    BadStatus {
        source_name: &'static str,
        status: reqwest::StatusCode,
    },
}

impl SourceError {
    /// Transient errors are worth one more attempt after back-off.
    ///
    /// Network-level failures and 5xx responses are transient; parse errors
    /// and timeouts are not (the per-source timeout already bounds a cycle's
    /// patience).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Http(e) => {
                e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
            }
            SourceError::BadStatus { status, .. } => status.is_server_error(),
            SourceError::Xml(_) | SourceError::Reddit(_) | SourceError::Timeout(_) => false,
        }
    }
}
