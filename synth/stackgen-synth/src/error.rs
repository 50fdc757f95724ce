use stackgen_models::ValidationError;

#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("Invalid deployment: {0}")]
    Validation(#[from] ValidationError),

    #[error("Duplicate logical id: {0}")]
    DuplicateLogicalId(String),

    #[error("Stack {stack}: {from} references unknown resource {target}")]
    DanglingReference {
        stack: String,
        from: String,
        target: String,
    },

    #[error("Stack {stack} imports {export}, which no upstream stack exports")]
    UnresolvedImport { stack: String, export: String },

    #[error("Secret parameter {name} (version {version}) cannot be resolved: {reason}")]
    UnresolvedParameter {
        name: String,
        version: u32,
        reason: String,
    },

    #[error("Image asset {path}: {reason}")]
    Asset { path: String, reason: String },

    #[error("Unknown stack: {0}")]
    UnknownStack(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
