//! Job families and their parameter builders.
//!
//! Each family (Nuke, Maya, Arnold) contributes its own base fields and
//! required parameters; the shared routine in [`JobSpec::build_params`]
//! layers site defaults, family fields, and caller overrides in that order.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::params::{encode_scene_info, merge, JobDefaults, SCENE_INFO};
use crate::error::CoreError;
use crate::types::ParamMap;

// ---------------------------------------------------------------------------
// Family
// ---------------------------------------------------------------------------

/// Render-engine-specific submission variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobFamily {
    Nuke,
    Maya,
    Arnold,
}

impl JobFamily {
    pub const ALL: &'static [JobFamily] = &[Self::Nuke, Self::Maya, Self::Arnold];

    /// The `job_type` string used in URLs and job parameters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nuke => "nuke",
            Self::Maya => "maya",
            Self::Arnold => "arnold",
        }
    }

    /// Parameters that must be present after defaults and overrides have
    /// been merged.
    pub fn required_params(&self) -> &'static [&'static str] {
        match self {
            Self::Nuke => &["write_node", "frange", "chunk_size"],
            Self::Maya => &[
                "camera",
                "xres",
                "yres",
                "chunk_size",
                "renderer",
                "out_path",
                "project",
                "frange",
                SCENE_INFO,
            ],
            Self::Arnold => &["out_path", "camera", "xres", "yres", SCENE_INFO],
        }
    }
}

impl FromStr for JobFamily {
    type Err = CoreError;

    /// Case-insensitive lookup by `job_type`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|family| family.as_str() == lowered)
            .ok_or_else(|| CoreError::UnknownJobType(s.to_string()))
    }
}

impl std::fmt::Display for JobFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Spec
// ---------------------------------------------------------------------------

/// A job to submit: the family-specific inputs plus caller parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum JobSpec {
    Nuke {
        script_path: String,
        /// Write node to render; `All` renders every write node.
        write_node: String,
        params: ParamMap,
    },
    Maya {
        file_path: String,
        params: ParamMap,
    },
    /// `file_path` may contain a wildcard to render several `.ass` files
    /// as one job, e.g. `/path/to/scene.*.ass`.
    Arnold {
        file_path: String,
        params: ParamMap,
    },
}

impl JobSpec {
    pub fn nuke(script_path: impl Into<String>, write_node: impl Into<String>) -> Self {
        Self::Nuke {
            script_path: script_path.into(),
            write_node: write_node.into(),
            params: ParamMap::new(),
        }
    }

    pub fn maya(file_path: impl Into<String>) -> Self {
        Self::Maya {
            file_path: file_path.into(),
            params: ParamMap::new(),
        }
    }

    pub fn arnold(file_path: impl Into<String>) -> Self {
        Self::Arnold {
            file_path: file_path.into(),
            params: ParamMap::new(),
        }
    }

    /// Build a spec from a free-form `job_type`. For Nuke the write node is
    /// taken from `params["write_node"]`.
    pub fn from_job_type(
        job_type: &str,
        file_path: impl Into<String>,
        mut params: ParamMap,
    ) -> Result<Self, CoreError> {
        let file_path = file_path.into();
        let spec = match job_type.parse::<JobFamily>()? {
            JobFamily::Nuke => {
                let write_node = match params.remove("write_node") {
                    Some(Value::String(name)) => name,
                    _ => {
                        return Err(CoreError::Validation(
                            "Nuke jobs require a write_node string".to_string(),
                        ))
                    }
                };
                Self::Nuke {
                    script_path: file_path,
                    write_node,
                    params,
                }
            }
            JobFamily::Maya => Self::Maya { file_path, params },
            JobFamily::Arnold => Self::Arnold { file_path, params },
        };
        Ok(spec)
    }

    /// Replace the caller parameters.
    pub fn with_params(mut self, params: ParamMap) -> Self {
        *self.params_mut() = params;
        self
    }

    /// Set a single caller parameter.
    pub fn param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params_mut().insert(key.to_string(), value.into());
        self
    }

    pub fn family(&self) -> JobFamily {
        match self {
            Self::Nuke { .. } => JobFamily::Nuke,
            Self::Maya { .. } => JobFamily::Maya,
            Self::Arnold { .. } => JobFamily::Arnold,
        }
    }

    pub fn params(&self) -> &ParamMap {
        match self {
            Self::Nuke { params, .. } | Self::Maya { params, .. } | Self::Arnold { params, .. } => {
                params
            }
        }
    }

    fn params_mut(&mut self) -> &mut ParamMap {
        match self {
            Self::Nuke { params, .. } | Self::Maya { params, .. } | Self::Arnold { params, .. } => {
                params
            }
        }
    }

    /// Fields contributed by the family itself.
    fn family_fields(&self) -> ParamMap {
        let mut fields = ParamMap::new();
        fields.insert("job_type".into(), self.family().as_str().into());
        match self {
            Self::Nuke {
                script_path,
                write_node,
                ..
            } => {
                fields.insert("write_node".into(), write_node.clone().into());
                fields.insert("file_path".into(), script_path.clone().into());
            }
            Self::Maya { file_path, .. } | Self::Arnold { file_path, .. } => {
                fields.insert("file_path".into(), file_path.clone().into());
            }
        }
        fields
    }

    /// Assemble the parameter mapping sent to the job-creation endpoint:
    /// site defaults, then family fields, then caller parameters (last
    /// write wins), with `scene_info` encoded as JSON text.
    pub fn build_params(&self, defaults: &JobDefaults) -> Result<ParamMap, CoreError> {
        let mut params = defaults.base_params();
        merge(&mut params, self.family_fields());
        merge(&mut params, self.params().clone());

        let missing: Vec<&str> = self
            .family()
            .required_params()
            .iter()
            .copied()
            .filter(|key| params.get(*key).map_or(true, Value::is_null))
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "{} job is missing required parameters: {}",
                self.family(),
                missing.join(", ")
            )));
        }

        encode_scene_info(&mut params);
        Ok(params)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
