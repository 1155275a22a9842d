//! Client configuration stored as TOML.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::ModelConfiguration;
use crate::palette::{ClassPalette, Color};
use crate::render::ResultRenderer;

/// One class label and, optionally, the color it is drawn in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassEntry {
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

impl ClassEntry {
    pub fn new(label: impl Into<String>, color: Option<Color>) -> Self {
        Self {
            label: label.into(),
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub backend_url: String,
    /// Per-request timeout handed to the HTTP transport.
    pub timeout_secs: u64,
    pub plant_type: String,
    /// Labels in the order of the model's output probabilities.
    pub classes: Vec<ClassEntry>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".to_string(),
            timeout_secs: 120,
            plant_type: "Plant".to_string(),
            classes: vec![
                ClassEntry::new("Saludable", Some(Color::green())),
                ClassEntry::new("Enferma", Some(Color::amber())),
                ClassEntry::new("Muerta", Some(Color::red())),
            ],
        }
    }
}

impl ClientConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let cfg: Self = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        self.validate()?;
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = toml::to_string(self)?;
        fs::write(path, raw).map_err(io_err)?;
        tracing::info!("saved config to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.backend_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "backend_url must start with http:// or https://, got `{url}`"
            )));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if let Some(blank) = self.classes.iter().find(|c| c.label.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "class labels must not be blank: {blank:?}"
            )));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn palette(&self) -> ClassPalette {
        ClassPalette::new(
            self.classes
                .iter()
                .map(|c| (c.label.clone(), c.color.clone())),
        )
    }

    pub fn renderer(&self) -> ResultRenderer {
        ResultRenderer::new(self.palette(), self.plant_type.clone())
    }

    /// Adopt the plant type and labels of a freshly loaded model, keeping
    /// colors already chosen for labels that survive.
    pub fn apply_model(&mut self, model: &ModelConfiguration) {
        let classes = model
            .classes
            .iter()
            .map(|label| {
                let color = self
                    .classes
                    .iter()
                    .find(|c| &c.label == label)
                    .and_then(|c| c.color.clone());
                ClassEntry::new(label.clone(), color)
            })
            .collect();
        self.classes = classes;
        self.plant_type = model.plant_type.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let cfg = ClientConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, ClientConfig::default());
    }

    #[test]
    fn save_then_load_preserves_classes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut cfg = ClientConfig::default();
        cfg.classes.push(ClassEntry::new("Seca", None));
        cfg.save(&path).unwrap();
        let loaded = ClientConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "backend_url = \"https://plants.example\"\n").unwrap();
        let cfg = ClientConfig::load(&path).unwrap();
        assert_eq!(cfg.backend_url, "https://plants.example");
        assert_eq!(cfg.timeout_secs, 120);
        assert_eq!(cfg.classes.len(), 3);
    }

    #[test]
    fn bad_color_is_a_parse_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[[classes]]\nlabel = \"Sana\"\ncolor = \"green\"\n").unwrap();
        assert!(matches!(ClientConfig::load(&path), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let cfg = ClientConfig {
            backend_url: "ftp://nope".into(),
            ..ClientConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn apply_model_keeps_surviving_colors() {
        let mut cfg = ClientConfig::default();
        cfg.apply_model(&ModelConfiguration {
            message: "ok".into(),
            plant_type: "Tomate".into(),
            classes: vec!["Muerta".into(), "Tizón".into()],
        });
        assert_eq!(cfg.plant_type, "Tomate");
        assert_eq!(cfg.classes[0], ClassEntry::new("Muerta", Some(Color::red())));
        assert_eq!(cfg.classes[1], ClassEntry::new("Tizón", None));
    }
}
