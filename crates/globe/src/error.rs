use gpu::BackendError;

#[derive(Debug, Clone, PartialEq)]
pub enum GlobeError {
    /// The graphics backend failed while the base scene was being built.
    BackendUnavailable(BackendError),
}

impl std::fmt::Display for GlobeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GlobeError::BackendUnavailable(e) => write!(f, "graphics backend unavailable: {e}"),
        }
    }
}

impl std::error::Error for GlobeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GlobeError::BackendUnavailable(e) => Some(e),
        }
    }
}

impl From<BackendError> for GlobeError {
    fn from(e: BackendError) -> Self {
        GlobeError::BackendUnavailable(e)
    }
}
