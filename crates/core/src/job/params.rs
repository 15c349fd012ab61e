//! Default job parameters and the shallow merge applied before submission.

use serde_json::Value;

use crate::types::ParamMap;

/// Instance type used when neither the site nor the caller picks one.
pub const DEFAULT_INSTANCE_TYPE: &str = "n1-standard-8";

/// Parameter holding structured scene metadata; sent as JSON text.
pub const SCENE_INFO: &str = "scene_info";

const NUMERIC_DEFAULTS: &[(&str, i64)] = &[
    ("upload_only", 0),
    ("start_new_slots", 1),
    ("chunk_size", 1),
    ("distributed", 0),
    ("num_instances", 1),
    ("skip_check", 0),
    ("notify_complete", 0),
];

/// Site-level defaults that feed into every job's parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobDefaults {
    pub instance_type: String,
}

impl Default for JobDefaults {
    fn default() -> Self {
        Self {
            instance_type: DEFAULT_INSTANCE_TYPE.to_string(),
        }
    }
}

impl JobDefaults {
    /// Baseline parameters every job starts from. Most of these are
    /// overridden by the submitting application.
    pub fn base_params(&self) -> ParamMap {
        let mut params = ParamMap::new();
        params.insert("instance_type".into(), self.instance_type.clone().into());
        for (key, value) in NUMERIC_DEFAULTS {
            params.insert((*key).into(), (*value).into());
        }
        params.insert("job_subtype".into(), "render".into());
        params
    }
}

/// Shallow merge: every key in `overrides` replaces the one in `base`.
pub fn merge(base: &mut ParamMap, overrides: ParamMap) {
    for (key, value) in overrides {
        base.insert(key, value);
    }
}

/// Replace a structured `scene_info` value with its JSON text. String and
/// null values are left untouched so already-encoded input is not encoded
/// twice.
pub fn encode_scene_info(params: &mut ParamMap) {
    if let Some(value) = params.get_mut(SCENE_INFO) {
        if value.is_object() || value.is_array() {
            *value = Value::String(value.to_string());
        }
    }
}
