use thiserror::Error;

/// Failure reported by the scene collaborator (raycaster, model access).
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("raycast failed: {0}")]
    Raycast(String),
    #[error("scene unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by a durable key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage write rejected for key `{key}`: {reason}")]
    Write { key: String, reason: String },
    #[error("stored value for `{key}` is malformed: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure while building a behavior configuration from external input.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown quick-test preset `{0}`")]
    UnknownPreset(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failure inside one behavior's per-frame update. The engine logs it and
/// keeps ticking the remaining behaviors.
#[derive(Debug, Error)]
pub enum BehaviorError {
    #[error(transparent)]
    Scene(#[from] SceneError),
}
