/// Convenience result type used across cardsmith.
pub type CardResult<T> = Result<T, CardError>;

/// Top-level error taxonomy used by engine APIs.
///
/// Only [`CardError::Configuration`] and [`CardError::Serde`] escape a render call. The other
/// variants are produced inside the pipeline and recorded as per-layer or background outcomes.
#[derive(thiserror::Error, Debug)]
pub enum CardError {
    /// Missing template or structurally invalid template data.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A background or static image file could not be found.
    #[error("asset missing: {0}")]
    AssetMissing(String),

    /// A single layer failed while being drawn.
    #[error("layer render error: {0}")]
    LayerRender(String),

    /// A layer carried a type tag outside the supported set.
    #[error("unsupported layer type: {0}")]
    UnsupportedLayerType(String),

    /// An asset existed but could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CardError {
    /// Build a [`CardError::Configuration`] value.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Build a [`CardError::AssetMissing`] value.
    pub fn asset_missing(msg: impl Into<String>) -> Self {
        Self::AssetMissing(msg.into())
    }

    /// Build a [`CardError::LayerRender`] value.
    pub fn layer_render(msg: impl Into<String>) -> Self {
        Self::LayerRender(msg.into())
    }

    /// Build a [`CardError::UnsupportedLayerType`] value.
    pub fn unsupported_layer_type(msg: impl Into<String>) -> Self {
        Self::UnsupportedLayerType(msg.into())
    }

    /// Build a [`CardError::Decode`] value.
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Build a [`CardError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Whether this error must abort a render instead of being recorded and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_) | Self::Serde(_))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
