//! Config file location and persistence of a loaded model's labels.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories_next::ProjectDirs;
use plant_core::ClientConfig;

/// `--config` if given, else `config.toml` in the per-user config directory.
pub fn config_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    let dirs = ProjectDirs::from("org", "plantview", "plantview")
        .context("cannot determine a config directory for this user")?;
    Ok(dirs.config_dir().join("config.toml"))
}

/// Store the plant type and labels a model load produced, leaving the rest
/// of the stored file (backend URL, timeout) as it was on disk.
pub fn persist_model(path: &Path, stored: &ClientConfig, updated: &ClientConfig) -> Result<()> {
    let config = ClientConfig {
        plant_type: updated.plant_type.clone(),
        classes: updated.classes.clone(),
        ..stored.clone()
    };
    config
        .save(path)
        .with_context(|| format!("saving config to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use plant_core::ClassEntry;
    use tempfile::tempdir;

    #[test]
    fn explicit_path_wins() {
        let path = config_path(Some(Path::new("/tmp/plantview.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/plantview.toml"));
    }

    #[test]
    fn persist_keeps_stored_backend_url() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("config.toml");
        let stored = ClientConfig {
            backend_url: "https://plants.example".into(),
            ..ClientConfig::default()
        };
        let updated = ClientConfig {
            backend_url: "http://127.0.0.1:9999".into(),
            plant_type: "Tomate".into(),
            classes: vec![ClassEntry::new("Sana", None)],
            ..ClientConfig::default()
        };
        persist_model(&path, &stored, &updated)?;

        let saved = ClientConfig::load(&path)?;
        assert_eq!(saved.backend_url, "https://plants.example");
        assert_eq!(saved.plant_type, "Tomate");
        assert_eq!(saved.classes, vec![ClassEntry::new("Sana", None)]);
        Ok(())
    }
}
