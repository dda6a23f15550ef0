//! Error handling for scoutlib.

use std::path::PathBuf;

use thiserror::Error;

/// The error taxonomy for a scout invocation.
///
/// Fatal variants terminate the run before further work; the two "reported"
/// variants (`CountProbeUnparseable`, `CompareFileMissing`) are printed and
/// execution continues with best-effort semantics.
#[derive(Debug, Error)]
pub enum Error {
    /// No leaf in the endpoint mapping matches the command path.
    #[error("API not found")]
    EndpointNotFound,

    /// `--body-file` was given but the file could not be read.
    #[error("can't read body file {}: {source}", path.display())]
    BodyFileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `--method` named a verb outside GET/POST/PUT/PATCH/DELETE.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Malformed flag tail.
    #[error(transparent)]
    FlagParse(#[from] clap::Error),

    /// The pagination count probe did not return an integer. Reported,
    /// non-fatal: the loop continues with a probed count of zero.
    #[error("Can't convert string to integer")]
    CountProbeUnparseable,

    /// The per-run snapshot could not be created or written.
    #[error("can't write snapshot {}: {source}", path.display())]
    SnapshotWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The `--compare` reference file is absent. Reported, non-fatal: the
    /// diff step is skipped and the run ends normally.
    #[error("Compare file does not exist!")]
    CompareFileMissing,

    /// The HTTP transport failed; aborts the current page loop or request.
    #[error("request failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::Transport(Box::new(err))
    }
}

/// A Result type alias for scoutlib operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_not_found_display() {
        assert_eq!(format!("{}", Error::EndpointNotFound), "API not found");
    }

    #[test]
    fn test_count_probe_display() {
        assert_eq!(
            format!("{}", Error::CountProbeUnparseable),
            "Can't convert string to integer"
        );
    }

    #[test]
    fn test_compare_file_missing_display() {
        assert_eq!(
            format!("{}", Error::CompareFileMissing),
            "Compare file does not exist!"
        );
    }

    #[test]
    fn test_body_file_unreadable_has_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = Error::BodyFileUnreadable {
            path: PathBuf::from("body.json"),
            source: io_err,
        };
        assert!(std::error::Error::source(&err).is_some());
        assert!(format!("{}", err).contains("body.json"));
    }

    #[test]
    fn test_unsupported_method_display() {
        let err = Error::UnsupportedMethod("FETCH".to_string());
        assert_eq!(format!("{}", err), "unsupported HTTP method: FETCH");
    }
}
