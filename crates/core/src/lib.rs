//! Domain logic for submitting render jobs to Zync.
//!
//! Holds the preflight check engine, the per-family job parameter
//! builders, and the shared error and id types. Nothing in this crate
//! performs network I/O; the HTTP client lives in `zync-client`.

pub mod error;
pub mod job;
pub mod preflight;
pub mod scene_path;
pub mod types;
