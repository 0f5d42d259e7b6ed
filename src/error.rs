//! Error type shared by both renderer backends.

use std::fmt;

use thiserror::Error;

/// Shader pipeline stage, reported by [`RenderError::ShaderCompile`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ShaderStage {
    /// The vertex stage.
    Vertex,
    /// The fragment stage.
    Fragment,
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
        }
    }
}

/// Errors produced by the renderers and their resource collaborators.
///
/// The first three variants are fatal to renderer construction. Draw calls
/// only ever return [`RenderError::InvalidColor`]; missing resources are
/// logged and skipped instead of propagated.
#[derive(Error, Debug)]
pub enum RenderError {
    /// No graphics context was available.
    #[error("graphics context unavailable: the host does not support the required graphics API")]
    UnsupportedContext,
    /// A shader stage failed to compile.
    #[error("{stage} shader failed to compile: {log}")]
    ShaderCompile {
        /// Stage that failed.
        stage: ShaderStage,
        /// Driver info log.
        log: String,
    },
    /// The shader program failed to link.
    #[error("shader program failed to link: {log}")]
    ShaderLink {
        /// Driver info log.
        log: String,
    },
    /// A color string was not of the form `#RRGGBB`.
    #[error("invalid hexadecimal color: {0:?}")]
    InvalidColor(String),
    /// A well-formed request referenced a resource that is not available.
    #[error("resource not available: {0}")]
    MissingResource(String),
    /// The graphics context refused to create an object.
    #[error("failed to allocate graphics resource: {0}")]
    Allocation(String),
    /// Encoded image data could not be decoded.
    #[error("failed to decode image {id:?}: {source}")]
    ImageDecode {
        /// Image id the data was registered under.
        id: String,
        /// Decoder error.
        #[source]
        source: image::ImageError,
    },
    /// Font data could not be parsed.
    #[error("failed to load font {family:?}: {reason}")]
    FontLoad {
        /// Font family name.
        family: String,
        /// Parser message.
        reason: String,
    },
}
