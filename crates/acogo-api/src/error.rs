use thiserror::Error;

/// Top-level error type for the `acogo-api` crate.
///
/// Every failure coming out of a request is reclassified into one of two
/// kinds before it leaves the client: [`Offline`](Error::Offline) when the
/// cloud reports the device unreachable (HTTP 408), and [`Api`](Error::Api)
/// for everything else, including transport failures and timeouts, which
/// carry no status. The remaining variants only occur while building a
/// client.
#[derive(Debug, Error)]
pub enum Error {
    // ── Request outcomes ────────────────────────────────────────────
    /// The device is not reachable from the cloud (HTTP 408).
    #[error("Device offline (408)")]
    Offline { message: String },

    /// Any other failed request: a non-408 status >= 400, or a wrapped
    /// transport/decoding failure (`status` is `None` then).
    #[error("{}", api_message(.status, .message))]
    Api {
        status: Option<u16>,
        kind: FailureKind,
        message: String,
    },

    // ── Construction ────────────────────────────────────────────────
    /// Base URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The token cannot be carried in an HTTP header.
    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    /// The underlying HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(String),
}

/// What went wrong in a failed request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The server answered with an error status.
    Status,
    /// No response: connection refused, DNS failure, reset.
    Transport,
    /// The per-request timeout elapsed.
    Timeout,
    /// The server answered but the body could not be decoded.
    Decode,
}

fn api_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("{code}: {message}"),
        None => message.to_owned(),
    }
}

impl Error {
    /// HTTP status associated with this error, if the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Offline { .. } => Some(408),
            Self::Api { status, .. } => *status,
            _ => None,
        }
    }

    /// Returns `true` if the device was reported offline.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Offline { .. })
    }

    /// Failure kind of an [`Api`](Error::Api) error.
    pub fn kind(&self) -> Option<FailureKind> {
        match self {
            Self::Api { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns `true` if the request never produced a response
    /// (connection refused, DNS failure, timeout).
    pub fn is_transport(&self) -> bool {
        matches!(
            self.kind(),
            Some(FailureKind::Transport | FailureKind::Timeout)
        )
    }

    /// Returns `true` if the per-request timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        self.kind() == Some(FailureKind::Timeout)
    }

    /// Wrap a transport-level failure.
    pub(crate) fn transport(err: &reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            FailureKind::Timeout
        } else if err.is_decode() {
            FailureKind::Decode
        } else {
            FailureKind::Transport
        };
        Self::Api {
            status: None,
            kind,
            message: err.to_string(),
        }
    }

    /// Wrap a body that could not be decoded.
    pub(crate) fn decode(message: String) -> Self {
        Self::Api {
            status: None,
            kind: FailureKind::Decode,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_includes_status() {
        let err = Error::Api {
            status: Some(500),
            kind: FailureKind::Status,
            message: "failure".into(),
        };
        assert_eq!(err.to_string(), "500: failure");
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_offline());
        assert!(!err.is_transport());
    }

    #[test]
    fn api_error_without_status_is_transport() {
        let err = Error::Api {
            status: None,
            kind: FailureKind::Transport,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "boom");
        assert!(err.is_transport());
        assert!(!err.is_timeout());
    }

    #[test]
    fn decode_failure_is_not_transport() {
        let err = Error::decode("invalid JSON body".into());
        assert_eq!(err.kind(), Some(FailureKind::Decode));
        assert!(!err.is_transport());
        assert_eq!(err.status(), None);
    }

    #[test]
    fn offline_reports_408() {
        let err = Error::Offline {
            message: "offline".into(),
        };
        assert_eq!(err.status(), Some(408));
        assert!(err.is_offline());
        assert_eq!(err.to_string(), "Device offline (408)");
    }
}
