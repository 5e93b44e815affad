use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, RwLock},
};

use serde::{Serialize, de::DeserializeOwned};
use thiserror::Error;

use crate::models::{Plan, Profile};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("could not encode as TOML: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// Holder for the plan the user has accepted.
///
/// Created empty at start-up, replaced wholesale on approval, cleared on reset.
/// Clones share the same slot. Lives only as long as the process.
#[derive(Clone, Default)]
pub struct ActivePlan {
    slot: Arc<RwLock<Option<Plan>>>,
}

impl ActivePlan {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(plan: Plan) -> Self {
        let holder = Self::new();
        holder.set(plan);
        holder
    }

    pub fn set(&self, plan: Plan) {
        tracing::info!(plan = %plan.id, name = %plan.name, "active plan replaced");
        match self.slot.write() {
            Ok(mut slot) => *slot = Some(plan),
            Err(poisoned) => *poisoned.into_inner() = Some(plan),
        }
    }

    /// Snapshot of the current plan.
    pub fn get(&self) -> Option<Plan> {
        match self.slot.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn clear(&self) {
        tracing::info!("active plan cleared");
        match self.slot.write() {
            Ok(mut slot) => *slot = None,
            Err(poisoned) => *poisoned.into_inner() = None,
        }
    }

    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

fn read_toml<T: DeserializeOwned>(path: &Path) -> Result<T, StorageError> {
    let raw = fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_toml<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let raw = toml::to_string_pretty(value)?;
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| StorageError::Write {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, raw).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })
}

pub fn import_plan(path: &Path) -> Result<Plan, StorageError> {
    read_toml(path)
}

pub fn export_plan(path: &Path, plan: &Plan) -> Result<(), StorageError> {
    write_toml(path, plan)
}

pub fn load_profile(path: &Path) -> Result<Profile, StorageError> {
    read_toml(path)
}

pub fn save_profile(path: &Path, profile: &Profile) -> Result<(), StorageError> {
    write_toml(path, profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::fallback_plan;

    #[test]
    fn holder_clones_share_state() {
        let a = ActivePlan::new();
        let b = a.clone();
        assert!(!b.is_set());

        a.set(fallback_plan(&Profile::default()));
        assert!(b.is_set());

        b.clear();
        assert!(a.get().is_none());
    }

    #[test]
    fn plan_survives_export_and_import() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plans").join("mine.toml");
        let plan = fallback_plan(&Profile {
            name: "Ana".into(),
            primary_goal: "gain-muscle".into(),
            bench_press: "60".into(),
            ..Default::default()
        });

        export_plan(&path, &plan).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("restTime"));
        assert_eq!(import_plan(&path).unwrap(), plan);
    }

    #[test]
    fn profile_reads_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("me.toml");
        fs::write(
            &path,
            "name = \"Lee\"\nprimary_goal = \"lose-fat\"\npreferred_days = [\"Monday\"]\n\n[additional_specs]\ninjuries = \"shoulder\"\n",
        )
        .unwrap();

        let p = load_profile(&path).unwrap();
        assert_eq!(p.name, "Lee");
        assert_eq!(p.preferred_days, ["Monday"]);
        assert_eq!(p.additional_specs.unwrap().injuries.as_deref(), Some("shoulder"));
    }

    #[test]
    fn bad_toml_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        fs::write(&path, "name = ").unwrap();

        let err = import_plan(&path).unwrap_err();
        assert!(matches!(err, StorageError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }
}
