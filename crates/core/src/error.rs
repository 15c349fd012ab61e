#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A preflight check matched; carries the rule's formatted message.
    #[error("Preflight check failed: {0}")]
    Preflight(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unrecognized job_type \"{0}\"")]
    UnknownJobType(String),

    #[error("This job has not been assigned an ID yet, so this operation is unavailable")]
    MissingJobId,
}
