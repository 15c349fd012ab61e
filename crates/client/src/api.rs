//! REST API client for the Zync HTTP endpoints.
//!
//! Wraps session negotiation (`/api/validate`), site configuration
//! lookups, and job endpoints using [`reqwest`]. Every request after
//! authentication carries the session cookie; a 200 response is decoded
//! as JSON when possible and returned as raw text otherwise.

use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::StatusCode;
use serde_json::Value;

use zync_core::job::{JobControl, JobFamily, JobSpec};
use zync_core::preflight::{decode_rules, CheckRule, SceneQuery};
use zync_core::types::{JobId, ParamMap};

use crate::config::ClientConfig;
use crate::error::ZyncError;
use crate::job::Job;
use crate::submit;

/// Number of jobs returned by [`ZyncApi::get_jobs`] when no limit is given.
pub const DEFAULT_JOB_LIMIT: u32 = 100;

/// A decoded 200 response body.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Json(Value),
    /// The body was not valid JSON.
    Text(String),
}

impl ApiResponse {
    /// JSON value of the body; raw text becomes a JSON string.
    pub fn into_json(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }

    /// Textual form of the body; a JSON string is unwrapped.
    pub fn into_text(self) -> String {
        match self {
            Self::Json(Value::String(s)) | Self::Text(s) => s,
            Self::Json(other) => other.to_string(),
        }
    }
}

/// Authenticated HTTP client for a single Zync site.
#[derive(Debug)]
pub struct ZyncApi {
    client: reqwest::Client,
    config: ClientConfig,
    cookie: Option<String>,
}

impl ZyncApi {
    /// Build a client without negotiating a session. Every authenticated
    /// call fails with [`ZyncError::Authentication`] until
    /// [`authenticate`](Self::authenticate) succeeds.
    pub fn new(config: ClientConfig) -> Result<Self, ZyncError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("zync-client/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            config,
            cookie: None,
        })
    }

    /// Check that the site is up and open a session with the configured
    /// script name and token.
    pub async fn connect(config: ClientConfig) -> Result<Self, ZyncError> {
        let mut api = Self::new(config)?;
        api.authenticate().await?;
        Ok(api)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn has_session(&self) -> bool {
        self.cookie.is_some()
    }

    /// Whether the site answers its base URL with a 2xx or 3xx status.
    pub async fn is_up(&self) -> bool {
        match self.client.get(&self.config.base_url).send().await {
            Ok(response) => {
                let status = response.status();
                status.is_success() || status.is_redirection()
            }
            Err(e) => {
                tracing::debug!(url = %self.config.base_url, error = %e, "Zync site unreachable");
                false
            }
        }
    }

    /// Open a session with token-level permissions.
    pub async fn authenticate(&mut self) -> Result<(), ZyncError> {
        self.ensure_up().await?;
        self.cookie = Some(self.validate(None).await?);
        tracing::info!(
            url = %self.config.base_url,
            script_name = %self.config.script_name,
            "Authenticated with Zync",
        );
        Ok(())
    }

    /// Elevate the session by also authenticating with a username and
    /// password. Job submission usually requires this.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ZyncError> {
        self.ensure_up().await?;
        self.cookie = Some(self.validate(Some((username, password))).await?);
        tracing::info!(url = %self.config.base_url, username, "Logged in to Zync");
        Ok(())
    }

    // ---- site information ----

    /// All site configuration settings.
    pub async fn get_config(&self) -> Result<Value, ZyncError> {
        Ok(self.get("/api/config", &[]).await?.into_json())
    }

    /// A single site configuration value, or `None` if the site does not
    /// define it.
    pub async fn get_config_var(&self, var: &str) -> Result<Option<Value>, ZyncError> {
        let result = self.get(&format!("/api/config/{var}"), &[]).await?.into_json();
        Ok(result.get(var).cloned())
    }

    pub async fn get_instance_types(&self) -> Result<Value, ZyncError> {
        Ok(self.get("/api/instance_types", &[]).await?.into_json())
    }

    pub async fn get_enabled_features(&self) -> Result<Value, ZyncError> {
        Ok(self.get("/api/features", &[]).await?.into_json())
    }

    /// Job subtypes available to the site (typically just `render`).
    pub async fn get_job_subtypes(&self) -> Result<Value, ZyncError> {
        Ok(self.get("/api/job_subtypes", &[]).await?.into_json())
    }

    pub async fn get_maya_renderers(&self) -> Result<Value, ZyncError> {
        Ok(self.get("/api/maya_renderers", &[]).await?.into_json())
    }

    pub async fn get_project_list(&self) -> Result<Value, ZyncError> {
        Ok(self.get("/api/projects", &[]).await?.into_json())
    }

    /// Default project name for a Maya or Nuke scene file.
    pub async fn get_project_name(&self, file_path: &str) -> Result<String, ZyncError> {
        let query = [("file", file_path.to_string())];
        Ok(self.get("/api/project_name", &query).await?.into_text())
    }

    pub async fn get_controller_status(&self) -> Result<Value, ZyncError> {
        Ok(self.get("/api/controller", &[]).await?.into_json())
    }

    // ---- jobs ----

    /// Most recent jobs, newest first. `None` sends no `max` and lets the
    /// site return every job; pass [`DEFAULT_JOB_LIMIT`] for the usual page.
    pub async fn get_jobs(&self, max: Option<u32>) -> Result<Value, ZyncError> {
        let query: Vec<(&str, String)> = max.map(|m| ("max", m.to_string())).into_iter().collect();
        Ok(self.get("/api/jobs", &query).await?.into_json())
    }

    pub async fn get_job_details(&self, job_id: JobId) -> Result<Value, ZyncError> {
        Ok(self.get(&format!("/api/job/{job_id}"), &[]).await?.into_json())
    }

    /// Post a new status for a job. Most job controls go through here.
    pub async fn set_job_status(&self, job_id: JobId, status: &str) -> Result<Value, ZyncError> {
        let form = [("status".to_string(), status.to_string())];
        let result = self.post(&format!("/api/job/{job_id}"), &form).await?;
        tracing::info!(job_id, status, "Updated job status");
        Ok(result.into_json())
    }

    pub async fn control_job(&self, job_id: JobId, control: JobControl) -> Result<Value, ZyncError> {
        self.set_job_status(job_id, control.status()).await
    }

    /// Retry the errored tasks of a job.
    pub async fn retry_errors(&self, job_id: JobId) -> Result<Value, ZyncError> {
        let result = self.post(&format!("/api/retry_errors/{job_id}"), &[]).await?;
        tracing::info!(job_id, "Retried errored tasks");
        Ok(result.into_json())
    }

    /// Preflight checks configured for `job_type`. Malformed rules are
    /// dropped with a warning; only a body that is not a list is an error.
    pub async fn get_preflight_checks(&self, job_type: &str) -> Result<Vec<CheckRule>, ZyncError> {
        let path = format!("/api/preflight/{job_type}");
        let body = self.get(&path, &[]).await?.into_json();
        match body {
            Value::Array(items) => Ok(decode_rules(items)),
            other => Err(ZyncError::UnexpectedResponse {
                url: self.config.url(&path),
                reason: format!("expected a preflight check list, got {other}"),
            }),
        }
    }

    /// Create a job from an already-assembled parameter mapping and return
    /// its id. No preflight checks run here; see [`submit_job`](Self::submit_job).
    pub async fn create_job(&self, params: &ParamMap) -> Result<JobId, ZyncError> {
        let response = self.post("/api/job", &form_fields(params)).await?;
        let job_id = parse_job_id(&response).ok_or_else(|| ZyncError::UnexpectedResponse {
            url: self.config.url("/api/job"),
            reason: format!("expected a job id, got {response:?}"),
        })?;
        let job_type = params.get("job_type").and_then(Value::as_str).unwrap_or_default();
        tracing::debug!(job_id, job_type, "Created job");
        Ok(job_id)
    }

    /// Run preflight checks for `spec` against `scene` and, when they
    /// pass, create the job.
    pub async fn submit_job<Q>(&self, spec: &JobSpec, scene: &Q) -> Result<Job<'_>, ZyncError>
    where
        Q: SceneQuery + ?Sized,
    {
        let defaults = self.config.job_defaults();
        let job_id = submit::submit(self, spec, &defaults, scene).await?;
        Ok(Job::new(self, spec.family()).with_id(job_id))
    }

    /// [`submit_job`](Self::submit_job) with the family picked by name.
    pub async fn submit_job_type<Q>(
        &self,
        job_type: &str,
        file_path: &str,
        params: ParamMap,
        scene: &Q,
    ) -> Result<Job<'_>, ZyncError>
    where
        Q: SceneQuery + ?Sized,
    {
        let spec = JobSpec::from_job_type(job_type, file_path, params)?;
        self.submit_job(&spec, scene).await
    }

    /// Handle for an existing job.
    pub fn job(&self, family: JobFamily, job_id: JobId) -> Job<'_> {
        Job::new(self, family).with_id(job_id)
    }

    // ---- private helpers ----

    async fn ensure_up(&self) -> Result<(), ZyncError> {
        if self.is_up().await {
            Ok(())
        } else {
            Err(ZyncError::Connection(self.config.base_url.clone()))
        }
    }

    /// POST `/api/validate` and return the session cookie.
    async fn validate(&self, credentials: Option<(&str, &str)>) -> Result<String, ZyncError> {
        let mut form = vec![
            ("script_name", self.config.script_name.as_str()),
            ("token", self.config.token.as_str()),
        ];
        if let Some((user, pass)) = credentials {
            form.push(("user", user));
            form.push(("pass", pass));
        }

        let response = self
            .client
            .post(self.config.url("/api/validate"))
            .form(&form)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(ZyncError::Authentication(body));
        }

        session_cookie(response.headers())
            .ok_or_else(|| ZyncError::Authentication("no session cookie returned".to_string()))
    }

    fn cookie(&self) -> Result<&str, ZyncError> {
        self.cookie
            .as_deref()
            .ok_or_else(|| ZyncError::Authentication("no session cookie".to_string()))
    }

    /// Authenticated GET with optional query parameters.
    pub async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ApiResponse, ZyncError> {
        let url = self.config.url(path);
        let mut request = self.client.get(&url).header(COOKIE, self.cookie()?);
        if !query.is_empty() {
            request = request.query(query);
        }
        let response = request.send().await?;
        Self::decode(&url, response).await
    }

    /// Authenticated form-encoded POST.
    pub async fn post(&self, path: &str, form: &[(String, String)]) -> Result<ApiResponse, ZyncError> {
        let url = self.config.url(path);
        let response = self
            .client
            .post(&url)
            .header(COOKIE, self.cookie()?)
            .form(form)
            .send()
            .await?;
        Self::decode(&url, response).await
    }

    /// Decode a 200 body as JSON, falling back to raw text. Any other
    /// status becomes [`ZyncError::Remote`].
    async fn decode(url: &str, response: reqwest::Response) -> Result<ApiResponse, ZyncError> {
        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            tracing::warn!(url, status = status.as_u16(), "Zync request failed");
            return Err(ZyncError::Remote {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(match serde_json::from_str(&body) {
            Ok(value) => ApiResponse::Json(value),
            Err(_) => ApiResponse::Text(body),
        })
    }
}

/// Flatten a parameter mapping into form fields. Strings are sent as-is,
/// booleans as `1`/`0`, null as an empty string, and arrays or objects as
/// JSON text.
pub fn form_fields(params: &ParamMap) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(key, value)| {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Bool(b) => if *b { "1" } else { "0" }.to_string(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (key.clone(), text)
        })
        .collect()
}

/// Collect the `name=value` pairs of every `Set-Cookie` header into a
/// single `Cookie` header value.
fn session_cookie(headers: &reqwest::header::HeaderMap) -> Option<String> {
    let pairs: Vec<&str> = headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .collect();
    if pairs.is_empty() {
        None
    } else {
        Some(pairs.join("; "))
    }
}

fn parse_job_id(response: &ApiResponse) -> Option<JobId> {
    match response {
        ApiResponse::Json(Value::Number(n)) => n.as_i64(),
        ApiResponse::Json(Value::String(s)) | ApiResponse::Text(s) => s.trim().parse().ok(),
        ApiResponse::Json(_) => None,
    }
}
