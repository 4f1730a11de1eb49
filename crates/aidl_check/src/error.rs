use std::io;
use std::path::PathBuf;

use aidl_ast::InternalError;

/// Why a unit failed to load. Details were already reported to the
/// diagnostics collector; this only classifies the failure.
#[derive(Debug, thiserror::Error)]
pub enum AidlError {
    #[error("bad preprocessed file")]
    BadPreprocessedFile,
    #[error("parse error")]
    ParseError,
    #[error("bad type")]
    BadType,
    #[error("refusing to generate code for unstructured parcelables")]
    FoundParcelable,
    #[error("bad package")]
    BadPackage,
    #[error("bad import")]
    BadImport,
    #[error("bad method id")]
    BadMethodId,
    #[error("bad constants")]
    BadConstants,
    #[error(transparent)]
    Internal(#[from] InternalError),
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl AidlError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        AidlError::Io { path: path.into(), source }
    }
}
