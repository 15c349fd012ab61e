//! Job control actions and the status strings the service expects.
//!
//! Most job controls are issued by posting a new `status` to
//! `/api/job/{id}`; retrying errored tasks has its own endpoint.

use serde::{Deserialize, Serialize};

/// A control action applied to an existing job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobControl {
    Cancel,
    Resume,
    Pause,
    Unpause,
    /// Requeue the whole job.
    Restart,
}

impl JobControl {
    /// Status value posted to the job endpoint for this action.
    pub fn status(&self) -> &'static str {
        match self {
            Self::Cancel => "canceled",
            Self::Resume => "resume",
            Self::Pause => "paused",
            Self::Unpause => "unpaused",
            Self::Restart => "queued",
        }
    }

    pub const ALL: &'static [JobControl] = &[
        Self::Cancel,
        Self::Resume,
        Self::Pause,
        Self::Unpause,
        Self::Restart,
    ];
}

impl std::fmt::Display for JobControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.status())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_strings_match_service_vocabulary() {
        let statuses: Vec<_> = JobControl::ALL.iter().map(JobControl::status).collect();
        assert_eq!(statuses, ["canceled", "resume", "paused", "unpaused", "queued"]);
    }
}
