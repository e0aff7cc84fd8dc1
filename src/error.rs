//! Error types for sing-geosite.

use thiserror::Error;

/// Error type for sing-geosite operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Release lookup failed (bad status, malformed response)
    #[error("release lookup failed: {0}")]
    Release(String),

    /// Required asset missing from the upstream release
    #[error("{asset} not found in upstream release {release}")]
    AssetNotFound { asset: String, release: String },

    /// Download error
    #[error("download error: {0}")]
    Download(#[from] reqwest::Error),

    /// Checksum mismatch
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    /// Dataset is not a valid GeoSiteList message
    #[error("failed to decode geosite data: {0}")]
    Decode(#[from] prost::DecodeError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Category code cannot be used as a path segment
    #[error("invalid category code: {0:?}")]
    InvalidCode(String),

    /// Invalid magic bytes in a rule-set file
    #[error("invalid magic bytes: expected SRS header")]
    InvalidMagic,

    /// Unsupported rule-set format version
    #[error("unsupported rule-set version: {0}")]
    UnsupportedVersion(u8),

    /// Malformed rule-set payload
    #[error("invalid rule-set data: {0}")]
    InvalidRuleSet(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

/// Broad failure classes, logged alongside the message when a run fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Release or asset lookup, network transport, bad configuration
    Fetch,
    /// Downloaded data does not match its published checksum
    Integrity,
    /// Dataset or rule-set bytes do not decode
    Parse,
    /// Output for a single category could not be produced
    Write,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Release(_)
            | Error::AssetNotFound { .. }
            | Error::Download(_)
            | Error::Config(_) => ErrorKind::Fetch,
            Error::ChecksumMismatch { .. } => ErrorKind::Integrity,
            Error::Decode(_)
            | Error::InvalidMagic
            | Error::UnsupportedVersion(_)
            | Error::InvalidRuleSet(_) => ErrorKind::Parse,
            Error::Io(_) | Error::Json(_) | Error::InvalidCode(_) => ErrorKind::Write,
        }
    }
}

/// Result type alias for sing-geosite operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = Error::AssetNotFound {
            asset: "dlc.dat".to_string(),
            release: "202401010000".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Fetch);

        let err = Error::ChecksumMismatch {
            expected: "aa".to_string(),
            actual: "bb".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Integrity);

        assert_eq!(Error::InvalidMagic.kind(), ErrorKind::Parse);

        let err = Error::InvalidCode("../etc".to_string());
        assert_eq!(err.kind(), ErrorKind::Write);
    }

    #[test]
    fn test_error_display() {
        let err = Error::AssetNotFound {
            asset: "dlc.dat.sha256sum".to_string(),
            release: "202401010000".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "dlc.dat.sha256sum not found in upstream release 202401010000"
        );
    }
}
