//! The two remote operations the submission flow depends on.
//!
//! [`ZyncApi`] is the production implementation; tests and alternative
//! transports can supply their own.

use std::future::Future;

use zync_core::preflight::CheckRule;
use zync_core::types::{JobId, ParamMap};

use crate::api::ZyncApi;
use crate::error::ZyncError;

/// Remote job service consumed by [`submit`](crate::submit::submit).
pub trait JobService: Send + Sync {
    /// Fetch the preflight checks configured for `job_type`. Called once per
    /// submission; results are never cached.
    fn fetch_preflight_rules(
        &self,
        job_type: &str,
    ) -> impl Future<Output = Result<Vec<CheckRule>, ZyncError>> + Send;

    /// Create a job from a fully assembled parameter mapping.
    fn create_job(&self, params: &ParamMap)
        -> impl Future<Output = Result<JobId, ZyncError>> + Send;
}

impl JobService for ZyncApi {
    async fn fetch_preflight_rules(&self, job_type: &str) -> Result<Vec<CheckRule>, ZyncError> {
        self.get_preflight_checks(job_type).await
    }

    async fn create_job(&self, params: &ParamMap) -> Result<JobId, ZyncError> {
        ZyncApi::create_job(self, params).await
    }
}
