//! CLI error type.

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Case error: {0}")]
    Project(#[from] wf_project::ProjectError),

    #[error("Calculation error: {0}")]
    Engine(#[from] wf_core::WfError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Case '{case}' defines no evaluation points")]
    NoPoints { case: String },
}

pub type CliResult<T> = Result<T, CliError>;
