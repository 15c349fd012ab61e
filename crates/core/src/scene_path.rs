//! Hash-embedded copies of scene files.
//!
//! Before upload the submitting application saves a copy of the scene
//! next to the original, under a `zync/` folder, with a short hash in the
//! file name so repeated submissions of the same scene never collide with
//! each other or with the artist's working file.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use sha2::{Digest, Sha256};

/// Folder created beside the original scene to hold submission copies.
pub const SCENE_DIR: &str = "zync";

/// Number of trailing hex digits of the digest kept in the file name.
const HASH_LEN: usize = 6;

/// Compute the submission path for `file_path` at time `at`.
///
/// `/shots/comp_v094.nk` becomes `/shots/zync/comp_v094_<hash>.nk`.
pub fn generate_scene_path(file_path: &Path, at: NaiveDateTime) -> PathBuf {
    let scene_dir = file_path.parent().unwrap_or_else(|| Path::new(""));
    let stem = file_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = file_path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let timecode = at.format("%m%d%Y%H%M%S");
    let digest = format!("{:x}", Sha256::digest(format!("{stem}_{timecode}").as_bytes()));
    let hash = &digest[digest.len() - HASH_LEN..];

    scene_dir.join(SCENE_DIR).join(format!("{stem}_{hash}{ext}"))
}

/// Ensure the `zync/` folder exists next to `file_path` and return a fresh
/// submission path stamped with the current local time.
pub fn prepare_scene_path(file_path: &Path) -> std::io::Result<PathBuf> {
    let path = generate_scene_path(file_path, Local::now().naive_local());
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn at(sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2014, 3, 7)
            .unwrap()
            .and_hms_opt(16, 5, sec)
            .unwrap()
    }

    #[test]
    fn keeps_stem_and_extension_under_scene_dir() {
        let path = generate_scene_path(Path::new("/shots/a/comp_v094.nk"), at(9));
        assert_eq!(path.parent().unwrap(), Path::new("/shots/a/zync"));

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("comp_v094_"), "unexpected name {name}");
        assert!(name.ends_with(".nk"), "unexpected name {name}");
        let hash = &name["comp_v094_".len()..name.len() - ".nk".len()];
        assert_eq!(hash.len(), HASH_LEN);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn hash_is_deterministic_for_same_time() {
        let file = Path::new("/shots/a/light.mb");
        assert_eq!(generate_scene_path(file, at(1)), generate_scene_path(file, at(1)));
    }

    #[test]
    fn hash_changes_with_time() {
        let file = Path::new("/shots/a/light.mb");
        assert_ne!(generate_scene_path(file, at(1)), generate_scene_path(file, at(2)));
    }

    #[test]
    fn file_without_extension() {
        let path = generate_scene_path(Path::new("/shots/a/scene"), at(0));
        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name.len(), "scene_".len() + HASH_LEN);
    }

    #[test]
    fn prepare_creates_scene_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let original = tmp.path().join("comp.nk");
        let path = prepare_scene_path(&original).unwrap();
        assert!(tmp.path().join(SCENE_DIR).is_dir());
        assert_eq!(path.parent().unwrap(), tmp.path().join(SCENE_DIR));
    }
}
