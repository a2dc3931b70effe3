use thiserror::Error;

/// Errors surfaced by emitter construction, preset loading and backend calls.
///
/// Runtime policies (spawning into a full pool, staging an empty window,
/// drawing while paused) are silent and never produce an error.
#[derive(Debug, Error)]
pub enum EmitterError {
    /// Rejected at construction time; the string names the offending field.
    #[error("invalid emitter configuration: {0}")]
    InvalidConfiguration(String),

    /// A preset failed validation.
    #[error("preset `{name}` is invalid")]
    Preset {
        name: String,
        #[source]
        source: Box<EmitterError>,
    },

    #[error("failed to parse emitter presets")]
    Json(#[from] serde_json::Error),

    #[error("failed to read emitter presets")]
    Io(#[from] std::io::Error),

    /// Resource allocation, mapping or binding failed inside the renderer.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

impl EmitterError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}
