//! HTTP client for the Zync render service.
//!
//! [`ZyncApi`](api::ZyncApi) manages the authenticated session and wraps
//! every REST endpoint. [`submit`](submit::submit) runs the preflight
//! checks for a job and, when they pass, creates the job through any
//! [`JobService`](service::JobService). [`Job`](job::Job) controls a
//! submitted job.

pub mod api;
pub mod config;
pub mod error;
pub mod job;
pub mod service;
pub mod submit;

pub use api::ZyncApi;
pub use config::ClientConfig;
pub use error::ZyncError;
pub use job::Job;
