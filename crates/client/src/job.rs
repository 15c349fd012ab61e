//! Handle for controlling a submitted job.

use serde_json::Value;

use zync_core::error::CoreError;
use zync_core::job::{JobControl, JobFamily};
use zync_core::types::JobId;

use crate::api::ZyncApi;
use crate::error::ZyncError;

/// A Zync job of one family, optionally bound to a server-side id.
///
/// Control operations require an id; calling them on an unsubmitted job
/// fails with [`CoreError::MissingJobId`] without touching the network.
pub struct Job<'a> {
    api: &'a ZyncApi,
    family: JobFamily,
    id: Option<JobId>,
}

impl<'a> Job<'a> {
    pub fn new(api: &'a ZyncApi, family: JobFamily) -> Self {
        Self {
            api,
            family,
            id: None,
        }
    }

    pub fn with_id(mut self, id: JobId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn id(&self) -> Option<JobId> {
        self.id
    }

    pub fn family(&self) -> JobFamily {
        self.family
    }

    fn require_id(&self) -> Result<JobId, ZyncError> {
        self.id.ok_or(ZyncError::Core(CoreError::MissingJobId))
    }

    pub async fn details(&self) -> Result<Value, ZyncError> {
        self.api.get_job_details(self.require_id()?).await
    }

    /// Post an arbitrary status. Prefer the named controls below.
    pub async fn set_status(&self, status: &str) -> Result<Value, ZyncError> {
        self.api.set_job_status(self.require_id()?, status).await
    }

    pub async fn control(&self, control: JobControl) -> Result<Value, ZyncError> {
        self.api.control_job(self.require_id()?, control).await
    }

    pub async fn cancel(&self) -> Result<Value, ZyncError> {
        self.control(JobControl::Cancel).await
    }

    pub async fn resume(&self) -> Result<Value, ZyncError> {
        self.control(JobControl::Resume).await
    }

    pub async fn pause(&self) -> Result<Value, ZyncError> {
        self.control(JobControl::Pause).await
    }

    pub async fn unpause(&self) -> Result<Value, ZyncError> {
        self.control(JobControl::Unpause).await
    }

    /// Requeue the whole job.
    pub async fn restart(&self) -> Result<Value, ZyncError> {
        self.control(JobControl::Restart).await
    }

    /// Retry only the errored tasks.
    pub async fn retry(&self) -> Result<Value, ZyncError> {
        self.api.retry_errors(self.require_id()?).await
    }
}

impl std::fmt::Debug for Job<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Job")
            .field("family", &self.family)
            .field("id", &self.id)
            .finish()
    }
}
