use feature_graph::ModelError;

/// Errors while reading a persisted model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("feature {referrer} references {id:?}, which is not in the document")]
    UnresolvedReference { id: String, referrer: String },

    #[error("I/O error: {0}")]
    Io(String),

    #[error("unknown file format: {0}")]
    UnknownFormat(String),

    #[error("file version {file_version} is newer than supported version {supported_version}")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },
}

impl LoadError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        LoadError::MalformedDocument(reason.into())
    }
}

impl From<ModelError> for LoadError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::UnresolvedReference { id, referrer } => {
                LoadError::UnresolvedReference { id, referrer }
            }
            other => LoadError::MalformedDocument(other.to_string()),
        }
    }
}

/// Errors while writing a model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SaveError {
    #[error("failed to write document: {0}")]
    Write(String),

    #[error("I/O error: {0}")]
    Io(String),
}
