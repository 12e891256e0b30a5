/// Convenience result type used across overlayer.
pub type OverlayerResult<T> = Result<T, OverlayerError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Each variant maps to an [`ErrorKind`]; the kind decides whether the pipeline aborts the
/// request or absorbs the failure and continues with a best-effort result.
#[derive(thiserror::Error, Debug)]
pub enum OverlayerError {
    /// Missing or invalid caller input (placement values, file references).
    #[error("input error: {0}")]
    Input(String),

    /// Unreadable or unsupported video or overlay bytes.
    #[error("decode error: {0}")]
    Decode(String),

    /// Per-frame geometry inconsistency during compositing.
    #[error("blend error: {0}")]
    Blend(String),

    /// Output container or codec failure.
    #[error("encode error: {0}")]
    Encode(String),

    /// Audio/video muxing failure.
    #[error("audio mux error: {0}")]
    AudioMux(String),

    /// Invalid engine configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Error kind reported to callers alongside the human-readable cause.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`OverlayerError::Input`].
    Input,
    /// See [`OverlayerError::Decode`].
    Decode,
    /// See [`OverlayerError::Blend`].
    Blend,
    /// See [`OverlayerError::Encode`].
    Encode,
    /// See [`OverlayerError::AudioMux`].
    AudioMux,
    /// See [`OverlayerError::Config`].
    Config,
    /// See [`OverlayerError::Other`].
    Internal,
}

impl ErrorKind {
    /// Return `true` for kinds the pipeline absorbs without failing the request.
    pub fn is_recoverable(self) -> bool {
        matches!(self, Self::Blend | Self::AudioMux)
    }
}

impl OverlayerError {
    /// Build an [`OverlayerError::Input`] value.
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Build an [`OverlayerError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build an [`OverlayerError::Blend`] value.
    pub fn blend(msg: impl Into<String>) -> Self {
        Self::Blend(msg.into())
    }

    /// Build an [`OverlayerError::Encode`] value.
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Build an [`OverlayerError::AudioMux`] value.
    pub fn audio_mux(msg: impl Into<String>) -> Self {
        Self::AudioMux(msg.into())
    }

    /// Build an [`OverlayerError::Config`] value.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Input(_) => ErrorKind::Input,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Blend(_) => ErrorKind::Blend,
            Self::Encode(_) => ErrorKind::Encode,
            Self::AudioMux(_) => ErrorKind::AudioMux,
            Self::Config(_) => ErrorKind::Config,
            Self::Other(_) => ErrorKind::Internal,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
