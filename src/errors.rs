use std::fmt;

/// Failures that can occur while talking to the CRM endpoint.
///
/// None of these escape `LeadSubmitter::submit`; they are folded into a
/// failed `SubmissionOutcome`. They do surface from construction and from
/// the lower-level `post_payload` boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The request did not complete within the configured timeout.
    Timeout(String),
    /// The connection could not be established (DNS, refused, reset).
    Connection(String),
    /// Any other transport-level failure.
    Transport(String),
    /// A 200 response whose body could not be interpreted.
    MalformedResponse(String),
    /// Invalid configuration or HTTP client setup.
    Config(String),
}

impl SubmitError {
    /// The human-readable description without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            SubmitError::Timeout(msg)
            | SubmitError::Connection(msg)
            | SubmitError::Transport(msg)
            | SubmitError::MalformedResponse(msg)
            | SubmitError::Config(msg) => msg,
        }
    }

    /// True for errors raised before or during the network exchange.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SubmitError::Timeout(_) | SubmitError::Connection(_) | SubmitError::Transport(_)
        )
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::Timeout(msg) => write!(f, "Request timed out: {}", msg),
            SubmitError::Connection(msg) => write!(f, "Connection error: {}", msg),
            SubmitError::Transport(msg) => write!(f, "Transport error: {}", msg),
            SubmitError::MalformedResponse(msg) => write!(f, "Malformed CRM response: {}", msg),
            SubmitError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for SubmitError {}

impl From<reqwest::Error> for SubmitError {
    /// Classifies a `reqwest::Error` by its cause.
    ///
    /// The message carries the whole source chain; reqwest's own message
    /// only names the URL.
    fn from(err: reqwest::Error) -> Self {
        let (timeout, connect, builder) = (err.is_timeout(), err.is_connect(), err.is_builder());
        let description = format!("{:#}", anyhow::Error::from(err));

        if timeout {
            SubmitError::Timeout(description)
        } else if connect {
            SubmitError::Connection(description)
        } else if builder {
            SubmitError::Config(description)
        } else {
            SubmitError::Transport(description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_strips_category() {
        let err = SubmitError::Timeout("operation timed out".to_string());
        assert_eq!(err.message(), "operation timed out");
        assert_eq!(err.to_string(), "Request timed out: operation timed out");
    }

    #[test]
    fn test_builder_error_keeps_cause() {
        let err = reqwest::Client::new()
            .post("not a url")
            .build()
            .unwrap_err();
        let converted = SubmitError::from(err);

        assert!(matches!(converted, SubmitError::Config(_)));
        assert!(converted.message().starts_with("builder error: "));
    }

    #[test]
    fn test_transport_classification() {
        assert!(SubmitError::Connection("refused".into()).is_transport());
        assert!(SubmitError::Transport("reset".into()).is_transport());
        assert!(!SubmitError::MalformedResponse("bad json".into()).is_transport());
        assert!(!SubmitError::Config("no url".into()).is_transport());
    }
}
