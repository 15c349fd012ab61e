/// Server-assigned job identifiers are plain integers.
pub type JobId = i64;

/// Flat parameter mapping sent to the job-creation endpoint.
pub type ParamMap = serde_json::Map<String, serde_json::Value>;
