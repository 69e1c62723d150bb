use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FertilError {
    #[error("invalid sample: {field} {reason}")]
    InvalidSample { field: String, reason: String },

    #[error("Ca:Mg ratio is undefined (Mg is zero)")]
    UndefinedRatio,

    #[error("unknown nutrient '{0}'. Known: Ca, Mg, K, P, S, B, Cu, Fe, Mn, Zn, Mo")]
    UnknownNutrient(String),

    #[error("failed to parse report: {0}")]
    ParseError(String),

    #[error("report is missing required parameter(s): {}", .0.join(", "))]
    MissingParameter(Vec<String>),

    #[error("failed to load reference tables from {path}: {reason}")]
    ReferenceLoad { path: PathBuf, reason: String },

    #[error("invalid reference tables: {0}")]
    ReferenceInvalid(String),

    #[error("failed to load crop profile from {path}: {reason}")]
    CropLoad { path: PathBuf, reason: String },

    #[error("invalid crop profile: {0}")]
    CropInvalid(String),

    #[error("unknown crop '{name}'. Available: {available}")]
    UnknownCrop { name: String, available: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FertilError {
    pub(crate) fn invalid_sample(field: &str, reason: impl Into<String>) -> Self {
        FertilError::InvalidSample {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}
