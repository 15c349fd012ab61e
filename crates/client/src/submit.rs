//! Job submission: build parameters, run preflight, create the job.

use zync_core::job::{JobDefaults, JobSpec};
use zync_core::preflight::{run_preflight, SceneQuery};
use zync_core::types::JobId;

use crate::error::ZyncError;
use crate::service::JobService;

/// Submit `spec` through `service`.
///
/// 1. Assemble the parameter mapping (defaults, family fields, caller
///    overrides) and check the family's required parameters.
/// 2. Fetch the preflight checks for the job's family and evaluate them
///    against `scene`.
/// 3. Only if every check passes, create the job.
///
/// A matching check aborts with [`CoreError::Preflight`](zync_core::error::CoreError::Preflight)
/// before the job-creation request is sent. Service errors propagate
/// unchanged.
pub async fn submit<S, Q>(
    service: &S,
    spec: &JobSpec,
    defaults: &JobDefaults,
    scene: &Q,
) -> Result<JobId, ZyncError>
where
    S: JobService + ?Sized,
    Q: SceneQuery + ?Sized,
{
    let family = spec.family();
    let params = spec.build_params(defaults)?;

    let rules = service.fetch_preflight_rules(family.as_str()).await?;
    tracing::debug!(job_type = %family, rule_count = rules.len(), "Fetched preflight checks");

    run_preflight(family.as_str(), &rules, scene).into_result()?;

    let job_id = service.create_job(&params).await?;
    tracing::info!(job_id, job_type = %family, "Submitted job");
    Ok(job_id)
}
