//! Error types shared by the poller and its sources

use std::path::PathBuf;

/// Failure of a single status fetch.
///
/// Transport-tier failures (network, timeout, undecodable body) and
/// application-tier failures (the backend answered with an `error` field)
/// travel through the same type so each operation has one failure path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Transport(String),

    #[error("request timeout after {0} ms")]
    Timeout(u64),

    #[error("invalid JSON response: {0}")]
    Decode(String),

    #[error("backend error: {0}")]
    Backend(String),

    /// A newer request to the same endpoint was issued while this one was in flight
    #[error("stale response discarded (seq {issued}, latest {latest})")]
    Superseded { issued: u64, latest: u64 },
}

impl FetchError {
    /// Network, timeout or parse failure
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            FetchError::Transport(_) | FetchError::Timeout(_) | FetchError::Decode(_)
        )
    }

    /// The backend reported an error in its payload
    pub fn is_application(&self) -> bool {
        matches!(self, FetchError::Backend(_))
    }

    pub fn is_superseded(&self) -> bool {
        matches!(self, FetchError::Superseded { .. })
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_tiers() {
        assert!(FetchError::Transport("refused".into()).is_transport());
        assert!(FetchError::Timeout(500).is_transport());
        assert!(FetchError::Decode("eof".into()).is_transport());
        assert!(!FetchError::Decode("eof".into()).is_application());

        let backend = FetchError::Backend("db down".into());
        assert!(backend.is_application());
        assert!(!backend.is_transport());

        let stale = FetchError::Superseded { issued: 1, latest: 2 };
        assert!(stale.is_superseded());
        assert!(!stale.is_transport());
        assert!(!stale.is_application());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FetchError::Backend("db down".into()).to_string(),
            "backend error: db down"
        );
        assert_eq!(
            FetchError::Timeout(1500).to_string(),
            "request timeout after 1500 ms"
        );
    }
}
