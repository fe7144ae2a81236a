use std::path::PathBuf;

/// Everything that can abort a bake. Warnings (ambiguous skin weights,
/// non-PNG textures, dangling parents) are logged instead of returned.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("mesh '{mesh}': polygon {polygon} has {loops} loops, only triangles are supported")]
    NonTriangularFace {
        mesh: String,
        polygon: usize,
        loops: usize,
    },

    #[error("mesh '{mesh}' is malformed: {reason}")]
    MalformedMesh { mesh: String, reason: String },

    #[error("object name '{name}' is {len} bytes long, the limit is {max}")]
    NameTooLong { name: String, len: usize, max: usize },

    #[error("name '{0}' must be ASCII without NUL bytes")]
    InvalidName(String),

    #[error("light '{light}' has unsupported type '{kind}'")]
    UnsupportedLightType { light: String, kind: String },

    #[error("action '{action}': curve '{path}' does not target a bone rotation or the root location")]
    UnsupportedAnimationTarget { action: String, path: String },

    #[error("action '{action}': cannot resolve bone path '{path}'")]
    MalformedBonePath { action: String, path: String },

    #[error("armature '{armature}' is malformed: {reason}")]
    MalformedSkeleton { armature: String, reason: String },

    #[error("scene uses {count} lights, the engine supports at most {max}")]
    TooManyLights { count: usize, max: usize },

    #[error("material '{material}': {reason}")]
    MaterialExtractionError { material: String, reason: String },

    #[error("object '{object}' references missing {kind} '{name}'")]
    MissingData {
        object: String,
        kind: &'static str,
        name: String,
    },

    #[error("invalid export configuration: {0}")]
    Config(String),

    #[error("malformed BOGLE file: {0}")]
    Format(String),

    #[error("I/O error on '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
